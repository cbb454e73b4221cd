//! 错误类型（库内统一使用，CLI 侧再由 anyhow 包装）
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 配置文件不可读 / 格式错误，或缺少必需参数
    #[error("config error: {0}")]
    Config(String),

    /// 敏感词文件读取失败（致命，不会触碰任何文件）
    #[error("failed to load sensitive words from {path}: {source}")]
    WordListLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 目录遍历失败（权限、I/O 等），中止整个扫描
    #[error("walk failed: {0}")]
    Traversal(#[from] walkdir::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 所有替换策略均失败；新内容保留在 `temp_kept` 中以便手动恢复
    #[error("failed to replace {path}: {}", describe_failures(.failures, .temp_kept))]
    Replace {
        path: PathBuf,
        failures: Vec<String>,
        temp_kept: Option<PathBuf>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn describe_failures(failures: &[String], temp_kept: &Option<PathBuf>) -> String {
    let mut msg = failures.join("; ");
    if let Some(tmp) = temp_kept {
        msg.push_str(&format!(" (new content kept at {})", tmp.display()));
    }
    msg
}
