//! 扫描选项与统计信息（模块）
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::report::MatchRecord;

/// 目录扫描时默认处理的扩展名
pub const DEFAULT_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 只报告不改写
    pub dry_run: bool,
    /// 目录扫描时处理的扩展名（不含点，大小写不敏感）；单文件扫描不受限制
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScanOptions {
    /// 扩展名是否在处理范围内（忽略大小写与前导点）
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_with_matches: usize,
    pub total_matches: usize,
    /// 仅包含有命中的文件
    pub per_file: BTreeMap<PathBuf, usize>,
    /// 逐行命中记录（按扫描顺序），用于 JSON 报告
    pub records: Vec<MatchRecord>,
}

impl ScanStats {
    pub(crate) fn record_file(&mut self, path: &std::path::Path, matched_lines: usize) {
        self.files_scanned += 1;
        if matched_lines > 0 {
            self.files_with_matches += 1;
            self.total_matches += matched_lines;
            self.per_file.insert(path.to_path_buf(), matched_lines);
        }
    }
}
