//! 逐行改写：命中敏感词的行在行首加注释符，其余字节原样保留
//!
//! 设计要点：
//! - 纯字节处理，不做 UTF-8 解码，因此不会因编码问题失败。
//! - 按物理行切分并保留各行原有的换行符（末行无换行时保持无换行）。
//! - 已以 `#` 开头的行直接跳过，保证重复运行幂等。

use crate::words::WordSet;

/// 注释符（判断“已注释”只看首字符）
pub const COMMENT_CHAR: u8 = b'#';
/// 改写时插入到行首的前缀
pub const COMMENT_PREFIX: &[u8] = b"# ";

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    /// 真正改写
    Apply,
    /// 只报告，不改动任何字节（dry-run）
    Preview,
}

/// 单行命中报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// 物理行号（从 1 开始）
    pub line_number: usize,
    pub words: Vec<String>,
}

/// 单文件改写结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// 改写后的完整内容；没有任何行被修改时为 None（调用方不应回写文件）
    pub content: Option<Vec<u8>>,
    pub matches: Vec<LineMatch>,
}

impl RewriteOutcome {
    pub fn matched_lines(&self) -> usize { self.matches.len() }
}

/// 按 `\n` 切分为物理行，每项包含其换行符（末行可能没有）
fn physical_lines(input: &[u8]) -> impl Iterator<Item = (&[u8], &[u8])> {
    input.split_inclusive(|b| *b == b'\n').map(|raw| match raw.split_last() {
        Some((&b'\n', content)) => (content, &raw[raw.len() - 1..]),
        _ => (raw, &raw[raw.len()..]),
    })
}

pub fn rewrite(input: &[u8], words: &WordSet, mode: RewriteMode) -> RewriteOutcome {
    let mut out: Vec<u8> = Vec::with_capacity(input.len());
    let mut matches = Vec::new();
    let mut modified = false;

    for (idx, (content, terminator)) in physical_lines(input).enumerate() {
        let hits = if content.first() == Some(&COMMENT_CHAR) { Vec::new() } else { words.matches(content) };

        if !hits.is_empty() {
            matches.push(LineMatch {
                line_number: idx + 1,
                words: hits.into_iter().map(str::to_string).collect(),
            });
            if mode == RewriteMode::Apply {
                out.extend_from_slice(COMMENT_PREFIX);
                modified = true;
            }
        }
        out.extend_from_slice(content);
        out.extend_from_slice(terminator);
    }

    RewriteOutcome { content: modified.then_some(out), matches }
}
