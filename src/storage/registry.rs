use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, StorageError};

/// One registered roll as shown to listing collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub roll_name: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

impl RegistryEntry {
    /// `"<roll name>,<created at millis>"`
    fn encode(&self) -> String {
        format!("{},{}", self.roll_name, self.created_at)
    }

    fn parse(raw: &str) -> Option<Self> {
        let (name, created_at) = raw.rsplit_once(',')?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            roll_name: name.to_string(),
            created_at: created_at.trim().parse().ok()?,
        })
    }
}

/// On-disk shape: a flat set of comma-joined strings
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    folders: Vec<String>,
}

/// Durable record of every roll ever created, keyed by roll name
#[derive(Debug, Default)]
pub struct RollRegistry {
    path: Option<PathBuf>,
    entries: BTreeMap<String, i64>,
}

impl RollRegistry {
    /// Open the registry file at `path`; a missing file is an empty registry
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&path, &content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No roll registry at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(e) => return Err(StorageError::io(path, e).into()),
        };

        info!("Loaded {} rolls from {:?}", entries.len(), path);
        Ok(Self { path: Some(path), entries })
    }

    /// A registry that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn parse(path: &Path, content: &str) -> Result<BTreeMap<String, i64>> {
        let file: RegistryFile = toml::from_str(content).map_err(|e| StorageError::RegistryCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut entries = BTreeMap::new();
        for raw in &file.folders {
            match RegistryEntry::parse(raw) {
                Some(entry) => {
                    entries.insert(entry.roll_name, entry.created_at);
                }
                None => warn!("Skipping malformed registry entry {:?}", raw),
            }
        }
        Ok(entries)
    }

    /// Record a roll; persisted before returning
    ///
    /// On a persistence failure the in-memory state is rolled back, so the
    /// registry never reports a roll that is not on disk.
    pub fn insert(&mut self, roll_name: &str, created_at: i64) -> Result<()> {
        let previous = self.entries.insert(roll_name.to_string(), created_at);

        if let Err(e) = self.persist() {
            match previous {
                Some(old) => self.entries.insert(roll_name.to_string(), old),
                None => self.entries.remove(roll_name),
            };
            return Err(e);
        }

        debug!("Registered roll {} ({})", roll_name, created_at);
        Ok(())
    }

    /// Forget a roll; returns whether it was registered. Absent names are a no-op.
    pub fn remove(&mut self, roll_name: &str) -> Result<bool> {
        let Some(created_at) = self.entries.remove(roll_name) else {
            debug!("Roll {} not registered, nothing to remove", roll_name);
            return Ok(false);
        };

        if let Err(e) = self.persist() {
            self.entries.insert(roll_name.to_string(), created_at);
            return Err(e);
        }

        info!("Unregistered roll {}", roll_name);
        Ok(true)
    }

    pub fn get(&self, roll_name: &str) -> Option<i64> {
        self.entries.get(roll_name).copied()
    }

    pub fn contains(&self, roll_name: &str) -> bool {
        self.entries.contains_key(roll_name)
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> = self
            .entries
            .iter()
            .map(|(name, &created_at)| RegistryEntry { roll_name: name.clone(), created_at })
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.roll_name.cmp(&b.roll_name)));
        entries
    }

    /// Most recently created roll
    pub fn latest(&self) -> Option<RegistryEntry> {
        self.entries().pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = RegistryFile {
            folders: self
                .entries
                .iter()
                .map(|(name, &created_at)| RegistryEntry { roll_name: name.clone(), created_at }.encode())
                .collect(),
        };
        let content = toml::to_string_pretty(&file).map_err(|e| StorageError::RegistryCorrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let staging = path.with_extension("partial");
        fs::write(&staging, content)
            .and_then(|_| fs::rename(&staging, path))
            .map_err(|e| {
                let _ = fs::remove_file(&staging);
                StorageError::io(path.clone(), e)
            })?;
        Ok(())
    }
}
