use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    calibration_offsets::{CalibrationOffsets, CalibrationOffsetsSerde, DeviceId},
    error::PersistenceError,
};

/// Keyed storage for per-device calibration offsets.
///
/// Implementations must be safe to use from several threads calibrating
/// different devices at once; saving one device never disturbs another.
pub trait OffsetStore {
    fn load_offsets(&self, id: DeviceId) -> Result<Option<CalibrationOffsets>, PersistenceError>;
    fn save_offsets(
        &self,
        id: DeviceId,
        offsets: &CalibrationOffsets,
    ) -> Result<(), PersistenceError>;
}

impl<T: OffsetStore + ?Sized> OffsetStore for &T {
    fn load_offsets(&self, id: DeviceId) -> Result<Option<CalibrationOffsets>, PersistenceError> {
        (**self).load_offsets(id)
    }

    fn save_offsets(
        &self,
        id: DeviceId,
        offsets: &CalibrationOffsets,
    ) -> Result<(), PersistenceError> {
        (**self).save_offsets(id, offsets)
    }
}

impl<T: OffsetStore + ?Sized> OffsetStore for Arc<T> {
    fn load_offsets(&self, id: DeviceId) -> Result<Option<CalibrationOffsets>, PersistenceError> {
        (**self).load_offsets(id)
    }

    fn save_offsets(
        &self,
        id: DeviceId,
        offsets: &CalibrationOffsets,
    ) -> Result<(), PersistenceError> {
        (**self).save_offsets(id, offsets)
    }
}

#[derive(Debug, Default)]
pub struct MemoryOffsetStore {
    entries: Mutex<HashMap<DeviceId, CalibrationOffsets>>,
}

impl MemoryOffsetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        // a panic mid-insert cannot leave the map half written
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OffsetStore for MemoryOffsetStore {
    fn load_offsets(&self, id: DeviceId) -> Result<Option<CalibrationOffsets>, PersistenceError> {
        let entries = self.entries.lock().map_err(|_| PersistenceError::Poisoned)?;
        Ok(entries.get(&id).copied())
    }

    fn save_offsets(
        &self,
        id: DeviceId,
        offsets: &CalibrationOffsets,
    ) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().map_err(|_| PersistenceError::Poisoned)?;
        entries.insert(id, *offsets);
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct OffsetFile {
    devices: BTreeMap<String, CalibrationOffsetsSerde>,
}

/// All devices' offsets in one JSON document.
///
/// Every load and save holds an advisory lock on `<path>.lock`, shared for
/// loads and exclusive for the whole read-modify-write of a save. That covers
/// several stores on one path, in this process or another. New contents land
/// in a uniquely named temp file next to the target which is then renamed
/// over it, so a crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonOffsetStore {
    path: PathBuf,
}

impl JsonOffsetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");
        PathBuf::from(lock_path)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn open_lock_file(&self) -> io::Result<fs::File> {
        fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
    }

    fn read_file(&self) -> Result<OffsetFile, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(OffsetFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, file: &OffsetFile) -> Result<(), PersistenceError> {
        let contents = serde_json::to_string_pretty(file)?;

        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl OffsetStore for JsonOffsetStore {
    fn load_offsets(&self, id: DeviceId) -> Result<Option<CalibrationOffsets>, PersistenceError> {
        let lock_file = match self.open_lock_file() {
            Ok(lock_file) => lock_file,
            // no directory yet means nothing was ever saved
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let lock = RwLock::new(lock_file);
        let _guard = lock.read()?;

        let mut file = self.read_file()?;
        Ok(file.devices.remove(&id.to_string()).map(Into::into))
    }

    fn save_offsets(
        &self,
        id: DeviceId,
        offsets: &CalibrationOffsets,
    ) -> Result<(), PersistenceError> {
        fs::create_dir_all(self.parent_dir())?;
        let mut lock = RwLock::new(self.open_lock_file()?);
        let _guard = lock.write()?;

        let mut file = self.read_file()?;
        file.devices.insert(id.to_string(), offsets.into());
        self.write_file(&file)?;
        log::debug!("offsets for device {} written to {:?}", id, self.path);
        Ok(())
    }
}
