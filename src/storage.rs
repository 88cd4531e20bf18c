use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use tokio::fs;

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Temp file next to `path`, unique per write so concurrent writers never
/// share one.
fn temp_path_for(path: &Path) -> PathBuf {
    let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "last_radar.png".to_string());
    path.with_file_name(format!(".{file_name}.{}.{seq}.tmp", std::process::id()))
}

/// Writes the latest radar PNG via a temp file and rename so readers never
/// observe a partial image.
pub async fn persist_last_image(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, bytes)
        .await
        .with_context(|| format!("Failed writing {}", tmp_path.display()))?;
    if let Err(error) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(error).with_context(|| {
            format!(
                "Failed renaming {} -> {}",
                tmp_path.display(),
                path.display()
            )
        });
    }
    Ok(())
}

/// `Ok(None)` when nothing has been saved yet.
pub async fn load_last_image(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => {
            Err(error).with_context(|| format!("Failed to read {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    #[tokio::test]
    async fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_last_image(&dir.path().join("last_radar.png"))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn persisted_image_replaces_previous_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("last_radar.png");

        persist_last_image(&path, &png_bytes(1)).await.unwrap();
        persist_last_image(&path, &png_bytes(2)).await.unwrap();

        assert_eq!(load_last_image(&path).await.unwrap(), Some(png_bytes(2)));
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_each_use_their_own_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_radar.png");
        let bodies: Vec<Vec<u8>> = (0..8u8)
            .map(|tag| {
                let mut body = png_bytes(tag);
                body.resize(256 * 1024, tag);
                body
            })
            .collect();

        for _ in 0..25 {
            let writes = bodies.iter().map(|body| persist_last_image(&path, body));
            for result in futures::future::join_all(writes).await {
                result.unwrap();
            }

            let saved = load_last_image(&path).await.unwrap().unwrap();
            assert!(bodies.contains(&saved));
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != "last_radar.png")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }
}
