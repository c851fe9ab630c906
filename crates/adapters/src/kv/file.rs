//! Directory-backed key-value engine: one file per key.
//!
//! File names are the md5 of the key; the key itself is stored inside the
//! file so prefix enumeration never depends on the hash. Writes go to a
//! temp file and are renamed into place under an exclusive `fs2` lock.

use super::{storage_error, task_error};
use fs2::FileExt;
use profile_store_ports::{BoxFuture, KeyValueStorePort};
use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::spawn_blocking;

const ENTRY_EXTENSION: &str = "entry";
const LOCK_FILE: &str = ".lock";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: String,
}

/// Durable engine storing each key in its own file under `root`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn run<T, F>(&self, operation: &'static str, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
    {
        let root = self.root.clone();
        spawn_blocking(move || task(&root))
            .await
            .map_err(|error| task_error(operation, error))?
    }
}

impl KeyValueStorePort for FileKeyValueStore {
    fn get(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<Option<String>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_file.get")?;
            self.run("kv_file.get", move |root| {
                let _lock = acquire_lock(root, LockMode::Shared)?;
                read_entry(&entry_path(root, &key))
                    .map(|entry| entry.map(|stored| stored.value))
            })
            .await
        })
    }

    fn put(
        &self,
        ctx: &RequestContext,
        key: Box<str>,
        value: String,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_file.put")?;
            self.run("kv_file.put", move |root| {
                let _lock = acquire_lock(root, LockMode::Exclusive)?;
                let entry = StoredEntry {
                    key: key.into_string(),
                    value,
                };
                write_entry_atomic(root, &entry)
            })
            .await
        })
    }

    fn delete(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_file.delete")?;
            self.run("kv_file.delete", move |root| {
                let _lock = acquire_lock(root, LockMode::Exclusive)?;
                match fs::remove_file(entry_path(root, &key)) {
                    Ok(()) => Ok(()),
                    Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
                    Err(error) => Err(storage_error("kv_file.delete", error)),
                }
            })
            .await
        })
    }

    fn list_keys(
        &self,
        ctx: &RequestContext,
        prefix: Box<str>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_file.list_keys")?;
            self.run("kv_file.list_keys", move |root| {
                let _lock = acquire_lock(root, LockMode::Shared)?;
                list_entries(root, &prefix)
            })
            .await
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Holds the directory lock until dropped.
struct DirLock(File);

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

fn acquire_lock(root: &Path, mode: LockMode) -> Result<DirLock> {
    fs::create_dir_all(root).map_err(|error| storage_error("kv_file.mkdir", error))?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(root.join(LOCK_FILE))
        .map_err(|error| storage_error("kv_file.lock_open", error))?;
    let locked = match mode {
        LockMode::Shared => FileExt::lock_shared(&file),
        LockMode::Exclusive => FileExt::lock_exclusive(&file),
    };
    locked.map_err(|error| storage_error("kv_file.lock", error))?;
    Ok(DirLock(file))
}

fn entry_path(root: &Path, key: &str) -> PathBuf {
    let digest = md5::compute(key.as_bytes());
    root.join(format!("{digest:x}.{ENTRY_EXTENSION}"))
}

fn read_entry(path: &Path) -> Result<Option<StoredEntry>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(storage_error("kv_file.read", error)),
    };
    serde_json::from_str(&contents).map(Some).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("kv", "corrupt_entry"),
            format!("stored entry is not readable: {error}"),
            ErrorClass::NonRetriable,
        )
        .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn write_entry_atomic(root: &Path, entry: &StoredEntry) -> Result<()> {
    let payload =
        serde_json::to_vec(entry).map_err(|error| storage_error("kv_file.encode", error))?;
    let target = entry_path(root, &entry.key);
    let temp = root.join(format!(
        ".tmp-{}-{}",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(error) = write_synced(&temp, &payload).and_then(|()| fs::rename(&temp, &target)) {
        let _ = fs::remove_file(&temp);
        return Err(storage_error("kv_file.write", error));
    }
    Ok(())
}

fn write_synced(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

fn list_entries(root: &Path, prefix: &str) -> Result<Vec<Box<str>>> {
    let mut keys = Vec::new();
    let dir = fs::read_dir(root).map_err(|error| storage_error("kv_file.read_dir", error))?;
    for item in dir {
        let item = item.map_err(|error| storage_error("kv_file.read_dir", error))?;
        let path = item.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
            continue;
        }
        // Unreadable entries are skipped here; `get` still reports them.
        let Ok(Some(entry)) = read_entry(&path) else {
            continue;
        };
        if entry.key.starts_with(prefix) {
            keys.push(entry.key.into_boxed_str());
        }
    }
    keys.sort();
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("pstore-kv-file-{label}-{nanos}"))
    }

    #[tokio::test]
    async fn values_survive_a_new_handle() -> Result<()> {
        let root = temp_root("reopen");
        let ctx = RequestContext::new_request();
        FileKeyValueStore::new(&root)
            .put(&ctx, "assistant_configs.index".into(), "[]".to_string())
            .await?;

        let reopened = FileKeyValueStore::new(&root);
        let value = reopened.get(&ctx, "assistant_configs.index".into()).await?;
        assert_eq!(value.as_deref(), Some("[]"));

        let _ = fs::remove_dir_all(root);
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_leaves_no_temp_files() -> Result<()> {
        let root = temp_root("delete");
        let ctx = RequestContext::new_request();
        let store = FileKeyValueStore::new(&root);
        store.put(&ctx, "a".into(), "1".to_string()).await?;
        store.delete(&ctx, "a".into()).await?;
        store.delete(&ctx, "a".into()).await?;

        assert_eq!(store.get(&ctx, "a".into()).await?, None);
        let leftovers = fs::read_dir(&root)
            .map_err(ErrorEnvelope::from)?
            .filter_map(std::result::Result::ok)
            .filter(|item| item.file_name().to_string_lossy().starts_with(".tmp-"))
            .count();
        assert_eq!(leftovers, 0);

        let _ = fs::remove_dir_all(root);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_entry_is_reported_on_get() -> Result<()> {
        let root = temp_root("corrupt");
        let ctx = RequestContext::new_request();
        let store = FileKeyValueStore::new(&root);
        store.put(&ctx, "k".into(), "v".to_string()).await?;
        fs::write(entry_path(&root, "k"), b"not json").map_err(ErrorEnvelope::from)?;

        let result = store.get(&ctx, "k".into()).await;
        assert!(matches!(
            result,
            Err(error) if error.code == ErrorCode::new("kv", "corrupt_entry")
        ));
        assert!(store.list_keys(&ctx, String::new().into()).await?.is_empty());

        let _ = fs::remove_dir_all(root);
        Ok(())
    }
}
