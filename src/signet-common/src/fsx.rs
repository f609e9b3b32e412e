//! Async file-system helpers for command handlers.
//!
//! Thin convenience wrappers over `tokio::fs`. There is no retry or
//! orchestration here; callers own error handling.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;

/// Write `contents` to `path`, creating parent directories as needed.
pub async fn write_file(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await
}

/// Read `path` as UTF-8 text.
pub async fn read_file(path: impl AsRef<Path>) -> io::Result<String> {
    fs::read_to_string(path).await
}

/// Create an empty file at `path` (and its parents) if it does not exist.
pub async fn ensure_file(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if fs::try_exists(path).await? {
        return Ok(());
    }
    write_file(path, b"").await
}

/// Create `path` and any missing parent directories.
pub async fn ensure_dir(path: impl AsRef<Path>) -> io::Result<()> {
    fs::create_dir_all(path).await
}

/// Whether `path` exists.
pub async fn path_exists(path: impl AsRef<Path>) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Remove a file, succeeding if it is already gone.
pub async fn remove_file(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Remove a directory and everything under it, succeeding if already gone.
pub async fn remove_dir(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_dir_all(path).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Copy a file or directory tree from `src` to `dest`.
pub async fn copy(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> io::Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    if fs::metadata(src).await?.is_dir() {
        copy_dir(src, dest).await
    } else {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(src, dest).await.map(|_| ())
    }
}

fn copy_dir<'a>(
    src: &'a Path,
    dest: &'a Path,
) -> std::pin::Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        fs::create_dir_all(dest).await?;
        let mut entries = fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = dest.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                copy_dir(&entry.path(), &target).await?;
            } else {
                fs::copy(entry.path(), target).await?;
            }
        }
        Ok(())
    })
}

/// Move a file or directory, falling back to copy-and-remove when a plain
/// rename fails (e.g. across filesystems).
pub async fn move_path(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> io::Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    match fs::rename(src, dest).await {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(error = %e, "rename failed, falling back to copy+remove");
            copy(src, dest).await?;
            if fs::metadata(src).await?.is_dir() {
                remove_dir(src).await
            } else {
                remove_file(src).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/file.txt");

        write_file(&path, "hello").await.unwrap();

        assert_eq!(read_file(&path).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_ensure_file_does_not_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");

        write_file(&path, "content").await.unwrap();
        ensure_file(&path).await.unwrap();

        assert_eq!(read_file(&path).await.unwrap(), "content");
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();

        remove_file(dir.path().join("absent")).await.unwrap();
        remove_dir(dir.path().join("absent-dir")).await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write_file(src.join("a.txt"), "a").await.unwrap();
        write_file(src.join("sub/b.txt"), "b").await.unwrap();

        let dest = dir.path().join("dest");
        copy(&src, &dest).await.unwrap();

        assert_eq!(read_file(dest.join("a.txt")).await.unwrap(), "a");
        assert_eq!(read_file(dest.join("sub/b.txt")).await.unwrap(), "b");
    }

    #[tokio::test]
    async fn test_move_path() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("from.txt");
        write_file(&src, "data").await.unwrap();

        let dest = dir.path().join("to.txt");
        move_path(&src, &dest).await.unwrap();

        assert!(!path_exists(&src).await);
        assert_eq!(read_file(&dest).await.unwrap(), "data");
    }
}
