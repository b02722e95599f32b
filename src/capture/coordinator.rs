use std::path::{Path, PathBuf};

use rand::{rngs::SmallRng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, StampSequence, SystemClock},
    config::Config,
    effects::RetroPipeline,
    error::{CaptureError, Result, StorageError},
    film::{FilmRollMachine, FilmState, Roll, RollId},
    frame::{Frame, PHOTO_EXTENSION},
    storage::{DirectoryStore, PhotoStore, RegistryEntry, RollRegistry},
};

/// One camera session: film, storage, registry and the retro pipeline
///
/// Every capture follows the same order:
/// 1. Film check - refuse early if no roll is loaded or it is used up
/// 2. Retro effect - run the photo through the pipeline
/// 3. Persist - encode and write into the current roll's storage unit
/// 4. Expose - consume one exposure, only after the write succeeded
///
/// A failed write therefore never costs an exposure.
pub struct CaptureCoordinator {
    config: Config,
    store: Box<dyn PhotoStore>,
    registry: RollRegistry,
    machine: FilmRollMachine,
    pipeline: RetroPipeline,
    clock: Box<dyn Clock>,
    rng: SmallRng,
    stamps: StampSequence,
}

impl CaptureCoordinator {
    /// Open a session on the directories named in `config`, using the system clock
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let store = DirectoryStore::new(&config.storage.root);
        let registry = RollRegistry::open(config.storage.registry_path())?;
        Self::with_parts(config, Box::new(store), registry, Box::new(SystemClock))
    }

    /// Assemble a session from explicit collaborators
    pub fn with_parts(
        config: Config,
        store: Box<dyn PhotoStore>,
        registry: RollRegistry,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let pipeline = RetroPipeline::from_config(&config.effect)?;
        let rng = match config.effect.grain_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        info!("Camera session ready ({} rolls registered)", registry.len());
        Ok(Self {
            config,
            store,
            registry,
            machine: FilmRollMachine::new(),
            pipeline,
            clock,
            rng,
            stamps: StampSequence::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> FilmState {
        self.machine.state()
    }

    pub fn current_roll(&self) -> Option<&Roll> {
        self.machine.current()
    }

    /// Change the film: a new roll with a full counter
    pub fn reset_film(&mut self) -> Result<&Roll> {
        self.machine.reset(self.store.as_ref(), &mut self.registry, self.clock.as_ref())
    }

    /// Pick up the most recently registered roll where it was left
    ///
    /// Remaining exposures are derived from the photos already stored. Returns
    /// `None` when nothing is registered or the latest roll's storage is gone.
    pub fn resume_latest(&mut self) -> Result<Option<&Roll>> {
        let Some(entry) = self.registry.latest() else {
            debug!("No registered roll to resume");
            return Ok(None);
        };

        let id = RollId::from(entry.roll_name.as_str());
        let unit = match self.store.resolve(&id) {
            Ok(unit) => unit,
            Err(CaptureError::Storage(StorageError::UnknownRoll { .. })) => {
                warn!("Latest roll {} has no storage unit, not resuming", id);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let names: Vec<String> = self.store.list(&unit)?.collect();
        if let Some(last) = names.iter().filter_map(|name| self.photo_stamp(name)).max() {
            // Photos of an earlier session must never be overwritten
            self.stamps.observe(last);
        }

        let taken = names.len();
        self.machine.resume(Roll::resumed(id, entry.created_at, unit, taken));
        Ok(self.machine.current())
    }

    /// Stamp encoded in a stored photo's filename, if it follows the configured pattern
    fn photo_stamp(&self, filename: &str) -> Option<i64> {
        let (stem, _) = filename.rsplit_once('.')?;
        stem.strip_prefix(self.config.output.file_prefix.as_str())?.parse().ok()
    }

    /// Process and store one captured photo; returns where it was written
    pub fn on_image_captured(&mut self, frame: &Frame) -> Result<PathBuf> {
        let roll = self.machine.check_ready()?;
        let unit = roll.storage().clone();
        debug!("Capturing {}x{} photo onto roll {}", frame.width(), frame.height(), roll.id());

        let stamp = self.stamps.next(self.clock.as_ref());
        let filename = format!("{}{}.{}", self.config.output.file_prefix, stamp, PHOTO_EXTENSION);

        let processed = self.pipeline.apply_with(frame, &mut self.rng, self.clock.today());
        let bytes = processed.encode_jpeg(self.config.output.jpeg_quality)?;
        let path = self.store.write(&unit, &filename, &bytes)?;

        let remaining = self.machine.capture()?;
        info!("Stored {:?}, {} exposures left", path, remaining);
        Ok(path)
    }

    /// Like [`on_image_captured`](Self::on_image_captured) for a photo handed over as a file
    pub fn on_image_file_captured<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf> {
        // Refuse before decoding anything
        self.machine.check_ready()?;
        let frame = Frame::open(path)?;
        self.on_image_captured(&frame)
    }

    /// Delete a roll: discard its photos unless configured to keep them, then unregister it
    ///
    /// Only registered rolls or the loaded roll are touched; any other name is a
    /// no-op, whatever lives on disk under it. Photos go first, so a failed
    /// removal leaves the roll registered and the delete can be retried.
    /// Deleting the loaded roll unloads it.
    pub fn delete_roll(&mut self, roll_name: &str) -> Result<()> {
        let id = RollId::from(roll_name);
        let loaded = self.machine.current().filter(|roll| roll.id() == &id).map(|roll| roll.storage().clone());

        if !self.registry.contains(roll_name) && loaded.is_none() {
            debug!("Roll {} is not registered, nothing to delete", id);
            return Ok(());
        }

        if !self.config.storage.retain_photos_on_delete {
            let unit = match loaded {
                Some(unit) => Some(unit),
                None => match self.store.resolve(&id) {
                    Ok(unit) => Some(unit),
                    Err(CaptureError::Storage(StorageError::UnknownRoll { .. })) => None,
                    Err(e) => return Err(e),
                },
            };
            if let Some(unit) = unit {
                self.store.remove(&unit)?;
            }
        }

        self.registry.remove(roll_name)?;

        if self.machine.current().is_some_and(|roll| roll.id() == &id) {
            info!("Deleted the loaded roll {}, no film loaded now", id);
            self.machine.clear();
        } else {
            info!("Deleted roll {}", id);
        }
        Ok(())
    }

    /// All registered rolls, oldest first
    pub fn rolls(&self) -> Vec<RegistryEntry> {
        self.registry.entries()
    }

    /// Paths of the photos stored on a roll, sorted by name
    pub fn photos(&self, roll_name: &str) -> Result<Vec<PathBuf>> {
        let unit = self.store.resolve(&RollId::from(roll_name))?;
        let mut names: Vec<String> = self.store.list(&unit)?.collect();
        names.sort();
        Ok(names.into_iter().map(|name| unit.path().join(name)).collect())
    }
}
