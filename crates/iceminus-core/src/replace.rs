//! 原子替换：先写同目录临时文件，再按策略顺序替换原文件
//!
//! 策略按顺序尝试，任一成功即返回：
//! 1. 直接 rename（同文件系统内原子）
//! 2. 原文件先挪到旁边，再 rename；失败则挪回
//! 3. 清除只读位后同 2
//! 4. 截断原文件并写入临时文件内容（最后手段，非原子）
//!
//! 全部失败时保留临时文件，错误中带上其路径，便于手动恢复。
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// 临时文件后缀
pub const TEMP_SUFFIX: &str = ".tmp_iceminus";
/// 原文件临时挪开时使用的后缀
pub const ASIDE_SUFFIX: &str = ".bak_iceminus";

/// 替换策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Rename,
    RemoveThenRename,
    ClearReadOnlyThenRename,
    Overwrite,
}

impl Strategy {
    /// 尝试顺序
    pub const ORDER: [Strategy; 4] = [
        Strategy::Rename,
        Strategy::RemoveThenRename,
        Strategy::ClearReadOnlyThenRename,
        Strategy::Overwrite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Rename => "rename",
            Strategy::RemoveThenRename => "remove+rename",
            Strategy::ClearReadOnlyThenRename => "clear-readonly+rename",
            Strategy::Overwrite => "overwrite",
        }
    }

    fn attempt(self, temp: &Path, target: &Path) -> io::Result<()> {
        match self {
            Strategy::Rename => fs::rename(temp, target),
            Strategy::RemoveThenRename => swap_with_aside(temp, target),
            Strategy::ClearReadOnlyThenRename => {
                // 没有只读位可清时与上一策略完全相同，直接跳过
                if !clear_readonly(target)? {
                    return Err(io::Error::new(io::ErrorKind::Other, "target is not read-only"));
                }
                swap_with_aside(temp, target)
            }
            Strategy::Overwrite => overwrite(temp, target),
        }
    }
}

/// 用 `data` 替换 `target` 的内容，返回最终生效的策略
pub fn replace_file(target: &Path, data: &[u8]) -> Result<Strategy> {
    let temp = write_temp(target, data).map_err(|e| Error::Replace {
        path: target.to_path_buf(),
        failures: vec![format!("write temp file: {e}")],
        temp_kept: None,
    })?;
    run_strategies(temp, target, &Strategy::ORDER, Strategy::attempt)
}

/// 按顺序尝试各策略；全部失败时保留临时文件并汇总每个策略的错误
fn run_strategies<F>(temp: TempPath, target: &Path, strategies: &[Strategy], mut attempt: F) -> Result<Strategy>
where
    F: FnMut(Strategy, &Path, &Path) -> io::Result<()>,
{
    let mut failures = Vec::new();
    for &strategy in strategies {
        match attempt(strategy, &*temp, target) {
            Ok(()) => {
                if strategy != Strategy::Rename {
                    warn!(path = ?target, strategy = strategy.name(), "replaced via fallback strategy");
                }
                // rename 类策略成功后临时路径已不存在，drop 时的删除会静默失败
                drop(temp);
                return Ok(strategy);
            }
            Err(e) => {
                debug!(path = ?target, strategy = strategy.name(), error = %e, "replace strategy failed");
                failures.push(format!("{}: {e}", strategy.name()));
            }
        }
    }

    let temp_kept = temp.keep().ok();
    Err(Error::Replace { path: target.to_path_buf(), failures, temp_kept })
}

/// 在目标同目录写临时文件（保证 rename 不跨文件系统），并同步到磁盘
fn write_temp(target: &Path, data: &[u8]) -> io::Result<TempPath> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    // 沿用原文件权限，否则替换后会变成临时文件的 0600
    if let Ok(meta) = fs::metadata(target) {
        if let Err(e) = fs::set_permissions(tmp.path(), meta.permissions()) {
            warn!(path = ?target, error = %e, "failed to copy permissions to temp file");
        }
    }
    Ok(tmp.into_temp_path())
}

fn aside_path(target: &Path) -> PathBuf {
    let mut s = target.as_os_str().to_owned();
    s.push(ASIDE_SUFFIX);
    PathBuf::from(s)
}

/// 原文件先挪开再 rename；rename 失败时把原文件挪回，保证原文件不丢
fn swap_with_aside(temp: &Path, target: &Path) -> io::Result<()> {
    let aside = aside_path(target);
    fs::rename(target, &aside)?;
    if let Err(e) = fs::rename(temp, target) {
        if let Err(restore) = fs::rename(&aside, target) {
            warn!(original = ?aside, error = %restore, "failed to restore set-aside original");
        }
        return Err(e);
    }
    // 挪开的原文件可能带只读位（Windows 上会导致删除失败）
    if let Err(e) = clear_readonly(&aside).and_then(|_| fs::remove_file(&aside)) {
        warn!(path = ?aside, error = %e, "failed to remove set-aside original");
    }
    Ok(())
}

/// 清除只读位（unix 上只补回属主写权限）；返回是否确实清除了
fn clear_readonly(path: &Path) -> io::Result<bool> {
    let mut perms = fs::metadata(path)?.permissions();
    if !perms.readonly() {
        return Ok(false);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() | 0o200);
    }
    #[cfg(not(unix))]
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    fs::set_permissions(path, perms)?;
    Ok(true)
}

/// 最后手段：截断原文件并写入临时文件内容
fn overwrite(temp: &Path, target: &Path) -> io::Result<()> {
    let data = fs::read(temp)?;
    let open = || OpenOptions::new().write(true).create(true).truncate(true).open(target);
    let mut file = match open() {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            clear_readonly(target)?;
            open()?
        }
        Err(e) => return Err(e),
    };
    file.write_all(&data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(TEMP_SUFFIX) || n.ends_with(ASIDE_SUFFIX))
            .collect()
    }

    #[test]
    fn test_replace_renames_atomically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.yaml");
        fs::write(&path, "old").unwrap();

        let strategy = replace_file(&path, b"new\ncontent").unwrap();
        assert_eq!(strategy, Strategy::Rename);
        assert_eq!(fs::read(&path).unwrap(), b"new\ncontent");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.yaml");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        replace_file(&path, b"new").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_replace_read_only_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.yaml");
        fs::write(&path, "old").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        replace_file(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_swap_with_aside() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.yaml");
        let temp = dir.path().join("a.yaml.tmp_iceminus");
        fs::write(&target, "old").unwrap();
        fs::write(&temp, "new").unwrap();

        swap_with_aside(&temp, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!temp.exists());
        assert!(!aside_path(&target).exists());
    }

    #[test]
    fn test_swap_with_aside_restores_original_on_failure() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.yaml");
        fs::write(&target, "old").unwrap();
        let missing_temp = dir.path().join("missing.tmp_iceminus");

        assert!(swap_with_aside(&missing_temp, &target).is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
        assert!(!aside_path(&target).exists());
    }

    #[test]
    fn test_overwrite_fallback() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.yaml");
        let temp = dir.path().join("a.yaml.tmp_iceminus");
        fs::write(&target, "a much longer old content").unwrap();
        fs::write(&temp, "short").unwrap();

        overwrite(&temp, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "short");
    }

    #[test]
    fn test_clear_readonly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "x").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        assert!(clear_readonly(&path).unwrap());
        assert!(!clear_readonly(&path).unwrap());
        assert!(!fs::metadata(&path).unwrap().permissions().readonly());
    }

    #[test]
    fn test_replace_fails_when_directory_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("a.yaml");

        let err = replace_file(&path, b"new").unwrap_err();
        match err {
            Error::Replace { failures, temp_kept, .. } => {
                assert_eq!(failures.len(), 1);
                assert!(temp_kept.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(windows)]
    #[test]
    fn test_swap_read_only_target_leaves_no_backup() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.yaml");
        let temp = dir.path().join("a.yaml.tmp_iceminus");
        fs::write(&target, "old").unwrap();
        fs::write(&temp, "new").unwrap();
        let mut perms = fs::metadata(&target).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&target, perms).unwrap();

        swap_with_aside(&temp, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_clear_readonly_strategy_skipped_when_writable() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.yaml");
        let temp = dir.path().join("a.yaml.tmp_iceminus");
        fs::write(&target, "old").unwrap();
        fs::write(&temp, "new").unwrap();

        let err = Strategy::ClearReadOnlyThenRename.attempt(&temp, &target).unwrap_err();
        assert!(err.to_string().contains("not read-only"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
        assert!(temp.exists());
    }

    #[test]
    fn test_all_strategies_failing_keeps_temp_and_original() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.yaml");
        fs::write(&target, "old").unwrap();
        let temp = write_temp(&target, b"new content").unwrap();

        let err = run_strategies(temp, &target, &Strategy::ORDER, |strategy, _, _| {
            Err(io::Error::new(io::ErrorKind::Other, format!("{} refused", strategy.name())))
        })
        .unwrap_err();

        let message = err.to_string();
        match err {
            Error::Replace { path, failures, temp_kept } => {
                assert_eq!(path, target);
                assert_eq!(failures.len(), 4);
                assert_eq!(failures[0], "rename: rename refused");
                assert_eq!(failures[3], "overwrite: overwrite refused");
                let kept = temp_kept.expect("temp file should be kept");
                assert_eq!(fs::read(&kept).unwrap(), b"new content");
                assert!(message.contains(&format!("new content kept at {}", kept.display())));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(message.starts_with(&format!("failed to replace {}: rename: rename refused; ", target.display())));
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
    }

    #[test]
    fn test_later_strategy_succeeds_after_failures() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.yaml");
        fs::write(&target, "old").unwrap();
        let temp = write_temp(&target, b"new").unwrap();

        let strategy = run_strategies(temp, &target, &Strategy::ORDER, |strategy, temp, target| match strategy {
            Strategy::Overwrite => overwrite(temp, target),
            _ => Err(io::Error::new(io::ErrorKind::Other, "refused")),
        })
        .unwrap();
        assert_eq!(strategy, Strategy::Overwrite);
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(leftovers(dir.path()).is_empty());
    }
}
