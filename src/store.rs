//! Blockage store implementations.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tempfile::Builder;
use tracing::debug;

use crate::blockage::Blockage;
use crate::error::StoreError;
use crate::traits::BlockageStore;

/// Process-local store. Iteration order is by id.
#[derive(Debug, Default)]
pub struct InMemoryBlockageStore {
    items: RwLock<BTreeMap<String, Blockage>>,
}

impl InMemoryBlockageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blockages(blockages: impl IntoIterator<Item = Blockage>) -> Self {
        let items = blockages
            .into_iter()
            .map(|blockage| (blockage.id.clone(), blockage))
            .collect();
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlockageStore for InMemoryBlockageStore {
    fn put(&self, blockage: Blockage) -> Result<(), StoreError> {
        blockage.validate()?;
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        items.insert(blockage.id.clone(), blockage);
        Ok(())
    }

    fn scan(&self) -> Result<Vec<Blockage>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items.values().cloned().collect())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        Ok(items.remove(id).is_some())
    }
}

/// Store persisted as a JSON array on disk.
///
/// Every mutation writes the new contents to a uniquely named temporary
/// sibling and renames it over the file, so readers never see a half-written
/// file. Writers are serialized, and memory is only updated once the file
/// write has succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryBlockageStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let blockages: Vec<Blockage> = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), count = blockages.len(), "opened blockage store");

        Ok(Self {
            path,
            inner: InMemoryBlockageStore::with_blockages(blockages),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file contents with `blockages`. Callers hold `write_lock`.
    fn persist(&self, blockages: &[Blockage]) -> Result<(), StoreError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let mut tmp = Builder::new().prefix(".blockages").suffix(".tmp").tempfile_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, blockages)?;
            writer.flush()?;
        }
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl BlockageStore for JsonFileStore {
    fn put(&self, blockage: Blockage) -> Result<(), StoreError> {
        blockage.validate()?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut candidate = self.inner.scan()?;
        candidate.retain(|existing| existing.id != blockage.id);
        candidate.push(blockage.clone());
        self.persist(&candidate)?;

        self.inner.put(blockage)
    }

    fn scan(&self) -> Result<Vec<Blockage>, StoreError> {
        self.inner.scan()
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut candidate = self.inner.scan()?;
        let before = candidate.len();
        candidate.retain(|existing| existing.id != id);
        if candidate.len() == before {
            return Ok(false);
        }
        self.persist(&candidate)?;

        self.inner.delete(id)
    }
}
