//! File-backed key/value store.
//!
//! One file per key under a root directory. File names are the hex encoding
//! of the key, so any key (including `:` and `/`) maps to a safe name and
//! can be recovered by [`KeyValueStore::keys`]. Keys whose hex form would
//! not fit a file name are stored under their SHA-256 digest instead, with
//! the key itself in a `.key` file beside the value. Writes go to a `.tmp`
//! file first and are renamed into place, so a crash never leaves a torn
//! value.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::traits::KeyValueStore;
use crate::{Result, WanderloreError};

const EXTENSION: &str = "json";
const KEY_EXTENSION: &str = "key";

/// Longest hex stem used as-is. File systems cap names at 255 bytes.
const MAX_HEX_STEM: usize = 200;

/// Marks a digest stem. Never produced by hex encoding.
const DIGEST_PREFIX: &str = "h-";

/// Default root: `<data dir>/wanderlore/local`.
pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("wanderlore")
        .join("local")
}

/// [`KeyValueStore`] persisting each key as a file.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Store files under `root`. The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under [`default_store_dir()`].
    pub fn open_default() -> Self {
        Self::new(default_store_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}.{EXTENSION}"))
    }

    fn key_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}.{KEY_EXTENSION}"))
    }

    /// Recover the key a stem was written for.
    async fn key_for_stem(&self, stem: &str) -> Result<Option<String>> {
        if is_digest_stem(stem) {
            read_optional(&self.key_path(stem)).await
        } else {
            Ok(decode_key(stem))
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        read_optional(&self.value_path(&file_stem(key))).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            WanderloreError::Storage(format!(
                "failed to create store dir {}: {e}",
                self.root.display()
            ))
        })?;

        let stem = file_stem(key);
        if is_digest_stem(&stem) {
            write_atomic(&self.key_path(&stem), key).await?;
        }
        write_atomic(&self.value_path(&stem), value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let stem = file_stem(key);
        remove_optional(&self.value_path(&stem)).await?;
        if is_digest_stem(&stem) {
            remove_optional(&self.key_path(&stem)).await?;
        }
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(WanderloreError::Storage(format!(
                    "failed to list {}: {e}",
                    self.root.display()
                )));
            }
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.key_for_stem(stem).await? {
                Some(key) if key.starts_with(prefix) => keys.push(key),
                Some(_) => {}
                None => warn!(path = %path.display(), "ignoring foreign file in local store"),
            }
        }
        Ok(keys)
    }
}

fn file_stem(key: &str) -> String {
    let encoded = encode_key(key);
    if encoded.len() <= MAX_HEX_STEM {
        encoded
    } else {
        format!("{DIGEST_PREFIX}{}", hex::encode(Sha256::digest(key.as_bytes())))
    }
}

fn is_digest_stem(stem: &str) -> bool {
    stem.starts_with(DIGEST_PREFIX)
}

fn encode_key(key: &str) -> String {
    hex::encode(key)
}

fn decode_key(encoded: &str) -> Option<String> {
    String::from_utf8(hex::decode(encoded).ok()?).ok()
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(WanderloreError::Storage(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);
    tokio::fs::write(&tmp_path, contents).await.map_err(|e| {
        WanderloreError::Storage(format!("failed to write {}: {e}", tmp_path.display()))
    })?;
    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        WanderloreError::Storage(format!(
            "failed to rename {} → {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })
}

async fn remove_optional(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WanderloreError::Storage(format!(
            "failed to remove {}: {e}",
            path.display()
        ))),
    }
}
