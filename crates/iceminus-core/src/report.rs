//! 命中记录与 JSON 报告（对外暴露）
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::rewrite::LineMatch;

/// 单行命中记录（对应报告 JSON 数组中的单个元素）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub path: PathBuf,
    pub line: usize,
    pub words: Vec<String>,
}

impl MatchRecord {
    pub(crate) fn new(path: &Path, m: &LineMatch) -> Self {
        Self { path: path.to_path_buf(), line: m.line_number, words: m.words.clone() }
    }

    /// 控制台格式：`path:line -> w1, w2`
    pub fn console_line(&self) -> String {
        format!("{}:{} -> {}", self.path.display(), self.line, self.words.join(", "))
    }
}

/// 以 JSON 数组写出全部命中记录
pub fn write_json_report(records: &[MatchRecord], out: &mut dyn Write) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)
}
