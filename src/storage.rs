use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{self, KdfCost};
use crate::models::AppData;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no data stored yet")]
    NotFound,
    #[error("store lock poisoned")]
    Poisoned,
}

/// Durable home of the data document. Every save replaces the whole document.
pub trait Store {
    fn exists(&self) -> Result<bool, StorageError>;
    fn load_all(&self) -> Result<AppData, StorageError>;
    fn save_all(&self, data: &AppData) -> Result<(), StorageError>;
    /// Delete all data permanently.
    fn wipe(&self) -> Result<(), StorageError>;
}

/// Passphrase-encrypted single file.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptedFileStore {
    #[zeroize(skip)]
    path: PathBuf,
    passphrase: String,
    #[zeroize(skip)]
    cost: KdfCost,
}

impl EncryptedFileStore {
    pub fn new(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            passphrase: passphrase.into(),
            cost: KdfCost::default(),
        }
    }

    pub fn with_kdf_cost(mut self, cost: KdfCost) -> Self {
        self.cost = cost;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for EncryptedFileStore {
    fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.path.exists())
    }

    fn load_all(&self) -> Result<AppData, StorageError> {
        let sealed = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound)
            }
            Err(e) => return Err(e.into()),
        };
        let json = crypto::open(&self.passphrase, &sealed)?;
        let data: AppData = serde_json::from_slice(&json)?;
        log::debug!(
            "event=store_load module=storage status=ok entries={} bytes={}",
            data.entries.len(),
            sealed.len()
        );
        Ok(data)
    }

    fn save_all(&self, data: &AppData) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = zeroize::Zeroizing::new(serde_json::to_vec(data)?);
        let sealed = crypto::seal(&self.passphrase, &json, self.cost)?;

        // write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &sealed)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!(
            "event=store_save module=storage status=ok entries={} bytes={}",
            data.entries.len(),
            sealed.len()
        );
        Ok(())
    }

    fn wipe(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        log::info!("event=store_wipe module=storage status=ok");
        Ok(())
    }
}

/// Keeps the serialized document in memory. Serializing on every save keeps
/// it honest about what survives a round trip.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.bytes.lock().map_err(|_| StorageError::Poisoned)?.is_some())
    }

    fn load_all(&self) -> Result<AppData, StorageError> {
        let bytes = self.bytes.lock().map_err(|_| StorageError::Poisoned)?;
        let bytes = bytes.as_ref().ok_or(StorageError::NotFound)?;
        Ok(serde_json::from_slice(bytes)?)
    }

    fn save_all(&self, data: &AppData) -> Result<(), StorageError> {
        let json = serde_json::to_vec(data)?;
        *self.bytes.lock().map_err(|_| StorageError::Poisoned)? = Some(json);
        Ok(())
    }

    fn wipe(&self) -> Result<(), StorageError> {
        *self.bytes.lock().map_err(|_| StorageError::Poisoned)? = None;
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn exists(&self) -> Result<bool, StorageError> {
        (**self).exists()
    }

    fn load_all(&self) -> Result<AppData, StorageError> {
        (**self).load_all()
    }

    fn save_all(&self, data: &AppData) -> Result<(), StorageError> {
        (**self).save_all(data)
    }

    fn wipe(&self) -> Result<(), StorageError> {
        (**self).wipe()
    }
}
