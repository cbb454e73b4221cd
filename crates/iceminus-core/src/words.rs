//! 敏感词表加载与匹配
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// 内置默认词表（编译期打包进二进制）
pub const EMBEDDED_WORDS: &str = include_str!("../assets/sensitive_words.txt");

/// 默认词表的名义文件名；`--sensitive` 等于它时使用内置词表
pub const DEFAULT_WORDS_NAME: &str = "sensitive_words.txt";

/// 词表来源：内置默认 或 外部文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordSource {
    Embedded,
    File(PathBuf),
}

impl WordSource {
    /// 根据命令行参数选择来源：空或等于默认名时走内置词表
    pub fn from_arg(path: &Path) -> Self {
        if path.as_os_str().is_empty() || path == Path::new(DEFAULT_WORDS_NAME) {
            WordSource::Embedded
        } else {
            WordSource::File(path.to_path_buf())
        }
    }
}

/// 有序词集合（允许重复，加载后只读）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    words: Vec<String>,
}

impl WordSet {
    pub fn load(source: &WordSource) -> Result<Self> {
        match source {
            WordSource::Embedded => Ok(Self::from_text(EMBEDDED_WORDS)),
            WordSource::File(path) => {
                let txt = std::fs::read_to_string(path)
                    .map_err(|source| Error::WordListLoad { path: path.clone(), source })?;
                Ok(Self::from_text(&txt))
            }
        }
    }

    /// 一行一个词：去掉首尾空白，丢弃空行，保持原顺序
    pub fn from_text(txt: &str) -> Self {
        let words = txt
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// 返回 `content` 中出现的全部词（按词表顺序）。
    /// 按字节做子串比较，不对注释符做特殊处理（由上层判断）。
    pub fn matches(&self, content: &[u8]) -> Vec<&str> {
        self.iter().filter(|w| contains(content, w.as_bytes())).collect()
    }
}

/// 朴素线性子串查找
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() { return true; }
    if needle.len() > haystack.len() { return false; }
    haystack.windows(needle.len()).any(|w| w == needle)
}
