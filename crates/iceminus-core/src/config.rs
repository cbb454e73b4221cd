//! 配置文件加载（TOML）
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::options::ScanOptions;

/// 配置文件结构（所有字段可选，命令行参数优先）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// 扫描根（目录或单个文件）
    pub path: Option<PathBuf>,
    /// 敏感词文件
    pub sensitive: Option<PathBuf>,
    /// 目录扫描处理的扩展名
    pub extensions: Option<Vec<String>>,
    pub dry_run: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let txt = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&txt).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(txt: &str) -> Result<Self> {
        toml::from_str(txt).map_err(|e| Error::Config(e.to_string()))
    }

    /// 根据配置生成扫描选项；`cli_dry_run` 与配置取或
    pub fn scan_options(&self, cli_dry_run: bool) -> ScanOptions {
        let mut opts = ScanOptions { dry_run: cli_dry_run || self.dry_run, ..Default::default() };
        if let Some(exts) = &self.extensions {
            opts.extensions = exts.clone();
        }
        opts
    }
}
