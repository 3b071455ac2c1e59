use std::path::Path;

use {anyhow::Context, pocharvest_common::timestamp};

/// Overwrite the summary document with the archive size and the current time.
///
/// Returns the number of entries counted in `output_dir`.
pub fn write_summary(path: &Path, title: &str, output_dir: &Path) -> anyhow::Result<usize> {
    let count = std::fs::read_dir(output_dir)
        .with_context(|| format!("failed to list {}", output_dir.display()))?
        .flatten()
        .count();
    let line = format!("## {title}: {count} files, updated {}\n", timestamp());
    std::fs::write(path, line).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_output_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("poc");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("a.py"), "").unwrap();
        std::fs::write(out.join("b.py"), "").unwrap();

        let readme = tmp.path().join("README.md");
        std::fs::write(&readme, "stale content\nmore stale content\n").unwrap();

        let count = write_summary(&readme, "pocsuite3 PoC collection", &out).unwrap();
        assert_eq!(count, 2);

        let text = std::fs::read_to_string(&readme).unwrap();
        assert!(text.starts_with("## pocsuite3 PoC collection: 2 files, updated "));
        assert_eq!(text.lines().count(), 1);
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_summary_missing_output_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = write_summary(&tmp.path().join("README.md"), "t", &tmp.path().join("nope"));
        assert!(result.is_err());
    }
}
