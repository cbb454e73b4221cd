//! 扫描主流程：遍历 → 逐文件改写 → 原子替换 → 汇总统计
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::options::{ScanOptions, ScanStats};
use crate::replace::replace_file;
use crate::report::MatchRecord;
use crate::rewrite::{rewrite, RewriteMode};
use crate::words::WordSet;

/// 扫描 `root` 并把逐行命中报告写入 `out`
/// - `root` 为文件：不看扩展名，直接处理
/// - `root` 为目录：递归遍历（按文件名排序，不跟随符号链接），只处理扩展名匹配的普通文件
/// - 遍历出错立即中止；已改写的文件保持改写状态
/// - 报告行在文件改写之前写出；dry-run 时同样输出
pub fn scan_and_write(root: &Path, words: &WordSet, opts: &ScanOptions, out: &mut dyn Write) -> Result<ScanStats> {
    let mut stats = ScanStats::default();
    if words.is_empty() {
        info!("word list is empty, nothing to do");
        return Ok(stats);
    }

    info!(?root, words = words.len(), dry_run = opts.dry_run, "starting scan");
    let md = std::fs::metadata(root)?;

    if !md.is_dir() {
        process_file(root, words, opts, out, &mut stats)?;
    } else {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() { continue; }
            let selected = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| opts.accepts_extension(e));
            if !selected { continue; }
            process_file(entry.path(), words, opts, out, &mut stats)?;
        }
    }

    info!(
        files_scanned = stats.files_scanned,
        files_with_matches = stats.files_with_matches,
        total_matches = stats.total_matches,
        "scan finished"
    );
    Ok(stats)
}

/// 单文件流程：整读 → 改写 → 输出报告 → （非 dry-run 且有改动时）替换
fn process_file(path: &Path, words: &WordSet, opts: &ScanOptions, out: &mut dyn Write, stats: &mut ScanStats) -> Result<()> {
    // 读写阶段不重叠：先完整读入并关闭，再写临时文件
    let data = std::fs::read(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;

    let mode = if opts.dry_run { RewriteMode::Preview } else { RewriteMode::Apply };
    let outcome = rewrite(&data, words, mode);

    for m in &outcome.matches {
        let record = MatchRecord::new(path, m);
        writeln!(out, "{}", record.console_line())?;
        stats.records.push(record);
    }
    stats.record_file(path, outcome.matched_lines());

    match outcome.content {
        Some(content) => {
            let strategy = replace_file(path, &content)?;
            debug!(?path, matched = outcome.matches.len(), strategy = strategy.name(), "file rewritten");
        }
        None => debug!(?path, matched = outcome.matches.len(), "file left untouched"),
    }
    Ok(())
}
