use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// `path` と同じディレクトリに一時ファイルとして書き出す
///
/// 書き込み途中のファイルが `path` として見えることはない。
pub async fn stage(path: &Path, data: &[u8]) -> io::Result<PathBuf> {
    let staged = staging_path(path);
    let result = async {
        let mut file = fs::File::create(&staged).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
    .await;

    if let Err(err) = result {
        let _ = fs::remove_file(&staged).await;
        return Err(err);
    }
    Ok(staged)
}

/// 一時ファイルに書いてから rename で公開
pub async fn write_atomically(path: &Path, data: &[u8]) -> io::Result<()> {
    let staged = stage(path, data).await?;
    if let Err(err) = fs::rename(&staged, path).await {
        let _ = fs::remove_file(&staged).await;
        return Err(err);
    }
    Ok(())
}

/// 存在しなくても成功扱いの削除。実際に消したら `true`
pub async fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// 中断された書き込みが残した `path` 用の一時ファイルを削除。消した数を返す
pub async fn sweep_staged(path: &Path) -> io::Result<usize> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!(".{}.", file_name(path));

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix)
            && name.ends_with(".tmp")
            && remove_if_exists(&entry.path()).await?
        {
            removed += 1;
        }
    }
    Ok(removed)
}

fn staging_path(path: &Path) -> PathBuf {
    // 並行する書き手同士で一時ファイルが衝突しないように
    path.with_file_name(format!(".{}.{}.tmp", file_name(path), uuid::Uuid::new_v4()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_atomically_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        write_atomically(&path, b"first").await.unwrap();
        write_atomically(&path, b"second").await.unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_atomically_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        write_atomically(&path, b"payload").await.unwrap();

        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["data.json".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_if_exists_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.json");

        assert!(!remove_if_exists(&path).await.unwrap());
        write_atomically(&path, b"x").await.unwrap();
        assert!(remove_if_exists(&path).await.unwrap());
        assert!(!remove_if_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_staged_removes_only_matching_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        write_atomically(&path, b"kept").await.unwrap();

        let orphan = stage(&path, b"interrupted").await.unwrap();
        let unrelated = dir.path().join(".other.json.1234.tmp");
        fs::write(&unrelated, b"x").await.unwrap();

        assert_eq!(sweep_staged(&path).await.unwrap(), 1);
        assert!(!orphan.exists());
        assert!(unrelated.exists());
        assert_eq!(fs::read(&path).await.unwrap(), b"kept");
    }
}
