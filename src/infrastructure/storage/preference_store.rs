use std::io;
use std::path::PathBuf;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};

use super::atomic_file;
use crate::shared::AppError;

/// 小さなキー・バリュー設定ストア（JSONファイル1つ）
///
/// 読み取りは毎回ディスクから行うので、同じファイルを開いた別インスタンスの
/// 書き込みもすぐに見える。ミューテックスは書き手同士の直列化にだけ使う。
pub struct PreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|err| {
                AppError::Persistence(format!("Failed to create preferences dir: {err}"))
            })?;
        }

        if let Err(err) = atomic_file::sweep_staged(&path).await {
            tracing::debug!("Failed to sweep staged preferences: {}", err);
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let mut document = self.read_document().await?;
        match document.remove(key) {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|err| {
                AppError::Persistence(format!("Failed to decode preference {key}: {err}"))
            }),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value).map_err(|err| {
            AppError::Persistence(format!("Failed to encode preference {key}: {err}"))
        })?;

        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value);
        self.persist(&document).await
    }

    /// キーを削除。存在しなかった場合は何もしない
    pub async fn remove(&self, key: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&document).await?;
        Ok(true)
    }

    async fn read_document(&self) -> Result<Map<String, Value>, AppError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(AppError::Persistence(format!(
                    "Failed to read preferences: {err}"
                )));
            }
        };
        if bytes.is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Map<String, Value>>(&bytes) {
            Ok(document) => Ok(document),
            Err(err) => {
                tracing::warn!(
                    "Discarding unreadable preferences at {}: {}",
                    self.path.display(),
                    err
                );
                Ok(Map::new())
            }
        }
    }

    async fn persist(&self, document: &Map<String, Value>) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(document).map_err(|err| {
            AppError::Persistence(format!("Failed to serialize preferences: {err}"))
        })?;
        atomic_file::write_atomically(&self.path, &json)
            .await
            .map_err(|err| AppError::Persistence(format!("Failed to persist preferences: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_and_get_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let stamp = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();

        let store = PreferenceStore::open(path.clone()).await.unwrap();
        store.set("last_update", &stamp).await.unwrap();
        drop(store);

        let reopened = PreferenceStore::open(path).await.unwrap();
        let loaded: Option<DateTime<Utc>> = reopened.get("last_update").await.unwrap();
        assert_eq!(loaded, Some(stamp));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_noop() {
        let dir = tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("p.json")).await.unwrap();

        assert!(!store.remove("nothing").await.unwrap());
        store.set("k", &1u32).await.unwrap();
        assert!(store.remove("k").await.unwrap());
        let value: Option<u32> = store.get("k").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_treated_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, b"{not json").await.unwrap();

        let store = PreferenceStore::open(path).await.unwrap();
        let value: Option<String> = store.get("anything").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_get_with_wrong_type_is_persistence_error() {
        let dir = tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("p.json")).await.unwrap();
        store.set("k", &"not a date").await.unwrap();

        let result: Result<Option<DateTime<Utc>>, _> = store.get("k").await;
        assert!(matches!(result, Err(AppError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_writes_from_another_instance_are_visible() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let first = PreferenceStore::open(path.clone()).await.unwrap();
        let second = PreferenceStore::open(path).await.unwrap();

        let missing: Option<u32> = second.get("count").await.unwrap();
        assert!(missing.is_none());

        first.set("count", &1u32).await.unwrap();
        assert_eq!(second.get::<u32>("count").await.unwrap(), Some(1));

        second.set("count", &2u32).await.unwrap();
        assert_eq!(first.get::<u32>("count").await.unwrap(), Some(2));

        assert!(first.remove("count").await.unwrap());
        assert_eq!(second.get::<u32>("count").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_keeps_other_keys_written_elsewhere() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let first = PreferenceStore::open(path.clone()).await.unwrap();
        let second = PreferenceStore::open(path).await.unwrap();

        first.set("a", &"one").await.unwrap();
        second.set("b", &"two").await.unwrap();

        assert_eq!(first.get::<String>("a").await.unwrap().as_deref(), Some("one"));
        assert_eq!(first.get::<String>("b").await.unwrap().as_deref(), Some("two"));
    }
}
