//! 敏感词注释化核心库
//!
//! 设计要点：
//! - 逐行做字节级子串匹配，命中行在行首加 `# `，其余字节原样保留（含换行风格与末行是否有换行）。
//! - 已注释的行跳过，重复运行幂等；没有命中的文件完全不回写。
//! - 回写采用“同目录临时文件 + 多策略替换”，任一策略要么完整成功，要么不动原文件。
//! - 单线程顺序处理，遍历出错或替换失败立即中止。

mod config;
mod error;
mod options;
mod replace;
mod report;
mod rewrite;
mod scan;
mod words;

pub use config::Config;
pub use error::{Error, Result};
pub use options::{ScanOptions, ScanStats, DEFAULT_EXTENSIONS};
pub use replace::{replace_file, Strategy};
pub use report::{write_json_report, MatchRecord};
pub use rewrite::{rewrite, LineMatch, RewriteMode, RewriteOutcome};
pub use scan::scan_and_write;
pub use words::{WordSet, WordSource, DEFAULT_WORDS_NAME, EMBEDDED_WORDS};
