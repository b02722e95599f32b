use tracing::{info, warn};

use crate::{
    clock::{Clock, StampSequence},
    error::{FilmError, Result},
    film::{Roll, RollId, ROLL_CAPACITY},
    storage::{PhotoStore, RollRegistry},
};

/// Observable state of the camera's film
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmState {
    /// Nothing loaded yet (or the loaded roll was deleted)
    NoRoll,
    /// A roll with `remaining` exposures left, `1..=ROLL_CAPACITY`
    RollActive { remaining: u32 },
    /// Every exposure of the current roll is used
    RollExhausted,
}

/// Owns the current roll and its exposure counter
///
/// Starts in [`FilmState::NoRoll`]; the first roll comes from [`reset`](Self::reset)
/// or [`resume`](Self::resume).
#[derive(Debug, Default)]
pub struct FilmRollMachine {
    current: Option<Roll>,
    stamps: StampSequence,
}

impl FilmRollMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FilmState {
        match &self.current {
            None => FilmState::NoRoll,
            Some(roll) if roll.is_exhausted() => FilmState::RollExhausted,
            Some(roll) => FilmState::RollActive { remaining: roll.remaining() },
        }
    }

    pub fn current(&self) -> Option<&Roll> {
        self.current.as_ref()
    }

    /// The roll a capture would go to, without consuming anything
    pub fn check_ready(&self) -> std::result::Result<&Roll, FilmError> {
        match &self.current {
            None => Err(FilmError::NoActiveRoll),
            Some(roll) if roll.is_exhausted() => Err(FilmError::FilmExhausted {
                roll_id: roll.id().to_string(),
            }),
            Some(roll) => Ok(roll),
        }
    }

    /// Consume one exposure and return how many are left
    ///
    /// Fails without touching state when there is no roll or it is used up.
    pub fn capture(&mut self) -> std::result::Result<u32, FilmError> {
        self.check_ready()?;

        let Some(roll) = self.current.as_mut() else {
            return Err(FilmError::NoActiveRoll);
        };
        roll.expose();

        if roll.is_exhausted() {
            info!("Roll {} finished", roll.id());
        }
        Ok(roll.remaining())
    }

    /// Load a new roll: allocate its storage unit, register it, reset the counter
    ///
    /// Either all three happen or none does. A storage failure leaves the
    /// registry alone; a registry failure releases the freshly allocated unit.
    pub fn reset(
        &mut self,
        store: &dyn PhotoStore,
        registry: &mut RollRegistry,
        clock: &dyn Clock,
    ) -> Result<&Roll> {
        if let Some(latest) = registry.latest() {
            self.stamps.observe(latest.created_at);
        }
        let created_at = self.stamps.next(clock);
        let id = RollId::from_timestamp(created_at);

        let unit = store.allocate(&id)?;

        if let Err(e) = registry.insert(id.as_str(), created_at) {
            warn!("Registering roll {} failed, releasing its storage: {}", id, e);
            if let Err(cleanup) = store.remove(&unit) {
                warn!("Could not release storage of roll {}: {}", id, cleanup);
            }
            return Err(e);
        }

        info!("Loaded new roll {} with {} exposures", id, ROLL_CAPACITY);
        let roll = Roll::fresh(id, created_at, unit);
        Ok(&*self.current.insert(roll))
    }

    /// Continue a previously registered roll
    pub fn resume(&mut self, roll: Roll) {
        info!("Resumed roll {} with {} exposures left", roll.id(), roll.remaining());
        self.stamps.observe(roll.created_at());
        self.current = Some(roll);
    }

    /// Unload the current roll, back to [`FilmState::NoRoll`]
    pub fn clear(&mut self) -> Option<Roll> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        error::{CaptureError, StorageError},
        storage::{DirectoryStore, PhotoNames, StorageUnit},
    };
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// A medium that refuses to create anything
    struct FullDisk;

    impl PhotoStore for FullDisk {
        fn allocate(&self, _roll_id: &RollId) -> Result<StorageUnit> {
            Err(StorageError::StorageUnavailable {
                path: PathBuf::from("/full"),
                reason: "no space left on device".to_string(),
            }.into())
        }

        fn resolve(&self, roll_id: &RollId) -> Result<StorageUnit> {
            Err(StorageError::UnknownRoll { roll_id: roll_id.to_string() }.into())
        }

        fn write(&self, unit: &StorageUnit, _filename: &str, _bytes: &[u8]) -> Result<PathBuf> {
            Ok(unit.path().to_path_buf())
        }

        fn list<'a>(&'a self, _unit: &StorageUnit) -> Result<PhotoNames<'a>> {
            Ok(Box::new(std::iter::empty()))
        }

        fn remove(&self, _unit: &StorageUnit) -> Result<()> {
            Ok(())
        }
    }

    fn loaded_machine(store: &DirectoryStore) -> (FilmRollMachine, RollRegistry) {
        let mut machine = FilmRollMachine::new();
        let mut registry = RollRegistry::in_memory();
        machine.reset(store, &mut registry, &FixedClock::new(1_000)).unwrap();
        (machine, registry)
    }

    #[test]
    fn test_starts_without_roll() {
        let mut machine = FilmRollMachine::new();
        assert_eq!(machine.state(), FilmState::NoRoll);
        assert_eq!(machine.capture(), Err(FilmError::NoActiveRoll));
        assert_eq!(machine.state(), FilmState::NoRoll);
    }

    #[test]
    fn test_counts_down_to_exhaustion() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let (mut machine, _) = loaded_machine(&store);
        assert_eq!(machine.state(), FilmState::RollActive { remaining: ROLL_CAPACITY });

        for n in 1..=ROLL_CAPACITY {
            assert_eq!(machine.capture(), Ok(ROLL_CAPACITY - n));
            if n < ROLL_CAPACITY {
                assert_eq!(machine.state(), FilmState::RollActive { remaining: ROLL_CAPACITY - n });
            }
        }
        assert_eq!(machine.state(), FilmState::RollExhausted);
    }

    #[test]
    fn test_capture_on_exhausted_roll_does_not_mutate() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let (mut machine, _) = loaded_machine(&store);
        for _ in 0..ROLL_CAPACITY {
            machine.capture().unwrap();
        }
        let before = machine.current().cloned();

        for _ in 0..3 {
            assert!(matches!(machine.capture(), Err(FilmError::FilmExhausted { .. })));
        }
        assert_eq!(machine.current().cloned(), before);
        assert_eq!(machine.state(), FilmState::RollExhausted);
    }

    #[test]
    fn test_reset_always_makes_a_new_roll() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let mut registry = RollRegistry::in_memory();
        let mut machine = FilmRollMachine::new();
        // frozen clock: every reset lands in the same millisecond
        let clock = FixedClock::new(5_000);

        let mut seen = Vec::new();
        for _ in 0..5 {
            let roll = machine.reset(&store, &mut registry, &clock).unwrap();
            assert_eq!(roll.remaining(), ROLL_CAPACITY);
            seen.push(roll.storage().clone());
            machine.capture().unwrap();
        }

        seen.sort_by(|a, b| a.path().cmp(b.path()));
        seen.dedup();
        assert_eq!(seen.len(), 5);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_reset_after_reopen_does_not_collide() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let mut registry = RollRegistry::in_memory();
        let clock = FixedClock::new(5_000);

        let first = FilmRollMachine::new().reset(&store, &mut registry, &clock).unwrap().clone();
        // a new session with the same clock reading
        let second = FilmRollMachine::new().reset(&store, &mut registry, &clock).unwrap().clone();
        assert_ne!(first.id(), second.id());
        assert!(second.created_at() > first.created_at());
    }

    #[test]
    fn test_failed_allocation_changes_nothing() {
        let mut machine = FilmRollMachine::new();
        let mut registry = RollRegistry::in_memory();

        let err = machine.reset(&FullDisk, &mut registry, &FixedClock::new(1)).unwrap_err();
        assert!(matches!(err, CaptureError::Storage(StorageError::StorageUnavailable { .. })));
        assert_eq!(machine.state(), FilmState::NoRoll);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_registration_releases_storage() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("photos"));
        let meta = dir.path().join("meta");
        let mut registry = RollRegistry::open(meta.join("rolls.toml")).unwrap();
        std::fs::write(&meta, b"not a directory").unwrap();

        let (mut machine, _) = loaded_machine(&store);
        let previous = machine.current().cloned();

        assert!(machine.reset(&store, &mut registry, &FixedClock::new(9_000)).is_err());
        assert_eq!(machine.current().cloned(), previous);
        assert!(registry.is_empty());
        // only the roll from the earlier successful reset is on disk
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 1);
    }

    #[test]
    fn test_clear_returns_to_no_roll() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let (mut machine, _) = loaded_machine(&store);

        assert!(machine.clear().is_some());
        assert_eq!(machine.state(), FilmState::NoRoll);
    }
}
