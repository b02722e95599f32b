use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    error::{Result, StorageError},
    film::RollId,
    frame::PHOTO_EXTENSION,
};

/// Lazily produced photo filenames of one storage unit
pub type PhotoNames<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// The durable container holding one roll's photos
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageUnit {
    roll_id: RollId,
    path: PathBuf,
}

impl StorageUnit {
    pub fn new(roll_id: RollId, path: PathBuf) -> Self {
        Self { roll_id, path }
    }

    pub fn roll_id(&self) -> &RollId {
        &self.roll_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Per-roll photo persistence
pub trait PhotoStore: Send {
    /// Create a fresh, empty unit for `roll_id`
    fn allocate(&self, roll_id: &RollId) -> Result<StorageUnit>;

    /// Look up the existing unit of `roll_id`
    fn resolve(&self, roll_id: &RollId) -> Result<StorageUnit>;

    /// Persist `bytes` as `filename` inside `unit`; an existing file of the same name is replaced
    fn write(&self, unit: &StorageUnit, filename: &str, bytes: &[u8]) -> Result<PathBuf>;

    /// Stored photo filenames; every call starts a fresh scan
    fn list<'a>(&'a self, unit: &StorageUnit) -> Result<PhotoNames<'a>>;

    /// Discard the unit; an absent unit is not an error
    fn remove(&self, unit: &StorageUnit) -> Result<()>;

    /// Number of stored photos in `unit`
    fn count(&self, unit: &StorageUnit) -> Result<usize> {
        Ok(self.list(unit)?.count())
    }
}

/// Directory-backed store: `<root>/<roll id>/<photo>.jpg`
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a roll's directory, `None` if the id could escape the root
    fn unit_path(&self, roll_id: &RollId) -> Option<PathBuf> {
        is_plain_name(roll_id.as_str()).then(|| self.root.join(roll_id.as_str()))
    }
}

/// A single path component: not empty, no separators, not `.` or `..`
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(PHOTO_EXTENSION))
        .unwrap_or(false)
}

impl PhotoStore for DirectoryStore {
    fn allocate(&self, roll_id: &RollId) -> Result<StorageUnit> {
        let path = self.unit_path(roll_id).ok_or_else(|| StorageError::StorageUnavailable {
            path: self.root.clone(),
            reason: format!("'{}' is not a valid roll name", roll_id),
        })?;

        fs::create_dir_all(&self.root).map_err(|e| StorageError::StorageUnavailable {
            path: self.root.clone(),
            reason: e.to_string(),
        })?;

        // create_dir (not _all) so an existing unit is never silently reused
        fs::create_dir(&path).map_err(|e| StorageError::StorageUnavailable {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!("Allocated storage unit {:?}", path);
        Ok(StorageUnit::new(roll_id.clone(), path))
    }

    fn resolve(&self, roll_id: &RollId) -> Result<StorageUnit> {
        match self.unit_path(roll_id) {
            Some(path) if path.is_dir() => Ok(StorageUnit::new(roll_id.clone(), path)),
            _ => Err(StorageError::UnknownRoll { roll_id: roll_id.to_string() }.into()),
        }
    }

    fn write(&self, unit: &StorageUnit, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = unit.path.join(filename);
        if !is_plain_name(filename) {
            return Err(StorageError::io(
                target,
                io::Error::new(io::ErrorKind::InvalidInput, "filename must be a single path component"),
            ).into());
        }

        // Write aside and rename so a crash never leaves a truncated photo behind
        let staging = unit.path.join(format!(".{}.partial", filename));
        let written = fs::File::create(&staging)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&staging, &target));

        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            warn!("Failed to write {:?}: {}", target, e);
            return Err(StorageError::io(target, e).into());
        }

        debug!("Wrote {} bytes to {:?}", bytes.len(), target);
        Ok(target)
    }

    fn list<'a>(&'a self, unit: &StorageUnit) -> Result<PhotoNames<'a>> {
        let entries = fs::read_dir(&unit.path).map_err(|e| StorageError::io(&unit.path, e))?;

        Ok(Box::new(entries.filter_map(|entry| {
            let entry = entry.ok()?;
            if !entry.file_type().ok()?.is_file() {
                return None;
            }
            let path = entry.path();
            if !is_photo(&path) {
                return None;
            }
            entry.file_name().into_string().ok()
        })))
    }

    fn remove(&self, unit: &StorageUnit) -> Result<()> {
        match fs::remove_dir_all(&unit.path) {
            Ok(()) => {
                info!("Removed storage unit {:?}", unit.path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Storage unit {:?} already gone", unit.path);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to remove storage unit {:?}: {}", unit.path, e);
                Err(StorageError::io(&unit.path, e).into())
            }
        }
    }
}
