use crate::engine::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::WalkDir;

const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now)).await {
        Ok(0) => {}
        Ok(removed) => info!(removed, "Purged stale temp files"),
        Err(err) => error!(error = %err, "Temp file purge task failed"),
    }
}

fn remove_stale(root: &Path, now: SystemTime) -> usize {
    WalkDir::new(root)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER)))
        .filter(|entry| is_stale(entry.path(), now))
        .filter(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "Could not remove temp file");
                false
            }
        })
        .count()
}

fn is_stale(path: &Path, now: SystemTime) -> bool {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > STALE_AFTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_only_marked_files_past_the_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let orphan = tmp.path().join(format!("logo.png{TMP_MARKER}1.1"));
        let keeper = tmp.path().join("logo.png");
        std::fs::write(&orphan, b"x").unwrap();
        std::fs::write(&keeper, b"x").unwrap();

        let later = SystemTime::now() + STALE_AFTER + Duration::from_secs(1);
        assert_eq!(remove_stale(tmp.path(), later), 1);
        assert!(!orphan.exists());
        assert!(keeper.exists());

        std::fs::write(&orphan, b"x").unwrap();
        assert_eq!(remove_stale(tmp.path(), SystemTime::now()), 0);
        assert!(orphan.exists());
    }
}
