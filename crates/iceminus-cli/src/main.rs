use anyhow::{Context, Result};
use clap::Parser;
use iceminus_core::{scan_and_write, write_json_report, Config, ScanStats, WordSet, WordSource, DEFAULT_WORDS_NAME};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const USAGE: &str = "usage: iceminus --path <path> [--dry-run] [--sensitive <file>]";

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "iceminus", version, about = "把 Rime 词库中含敏感词的行注释掉")]
struct Cli {
    /// 要扫描的目录或单个文件（目录下只处理 .yaml/.yml）
    #[arg(long)]
    path: Option<PathBuf>,

    /// 只打印将要修改的行，不改动文件
    #[arg(long)]
    dry_run: bool,

    /// 敏感词文件（一行一个）；省略或为 sensitive_words.txt 时使用内置词表
    #[arg(long)]
    sensitive: Option<PathBuf>,

    /// 配置文件（TOML），命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,

    /// 将命中记录以 JSON 数组写入该文件
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(p) => Config::load(p).context("load config")?,
        None => Config::default(),
    };

    let Some(root) = cli.path.clone().or_else(|| config.path.clone()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    // 命令行显式给出的词表优先，其次是配置文件，最后是内置词表
    let sensitive = cli
        .sensitive
        .clone()
        .or_else(|| config.sensitive.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORDS_NAME));
    let words = WordSet::load(&WordSource::from_arg(&sensitive)).context("failed to load sensitive words")?;
    if words.is_empty() {
        eprintln!("no sensitive words found; nothing to do");
    }

    let opts = config.scan_options(cli.dry_run);
    info!(?root, ?sensitive, dry_run = opts.dry_run, "starting");

    let stats = {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        scan_and_write(&root, &words, &opts, &mut out).context("scan failed")?
    };

    if let Some(report) = &cli.report {
        let mut out = BufWriter::new(File::create(report).context("create report file")?);
        write_json_report(&stats.records, &mut out).context("write report")?;
        out.flush().context("flush report")?;
    }

    print_summary(&scanned_folder(&root), &stats);
    if opts.dry_run && stats.total_matches > 0 {
        warn!("dry run: no files were modified");
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写 stderr，stdout 只留报告行与汇总
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 汇总中显示的目录：给的是文件时取其所在目录
fn scanned_folder(root: &Path) -> PathBuf {
    let abs = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    if abs.is_dir() {
        return abs;
    }
    abs.parent().map(Path::to_path_buf).unwrap_or(abs)
}

fn print_summary(folder: &Path, stats: &ScanStats) {
    println!();
    println!("Summary:");
    println!("  scanned folder: {}", folder.display());
    println!("  files scanned: {}", stats.files_scanned);
    println!("  files with matches: {}", stats.files_with_matches);
    println!("  total matched lines: {}", stats.total_matches);
    if !stats.per_file.is_empty() {
        println!("  per-file operations:");
        for (path, count) in &stats.per_file {
            println!("    {}: {}", path.display(), count);
        }
    }
}
