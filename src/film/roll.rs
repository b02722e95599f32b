use std::fmt;

use crate::storage::StorageUnit;

/// Exposures on a fresh roll
pub const ROLL_CAPACITY: u32 = 27;

/// Prefix of generated roll ids
pub const ROLL_PREFIX: &str = "PhotoFolder_";

/// Opaque roll identifier, also the name of its storage unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RollId(String);

impl RollId {
    /// Id derived from the roll's creation stamp
    pub fn from_timestamp(millis: i64) -> Self {
        Self(format!("{}{}", ROLL_PREFIX, millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RollId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RollId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One loaded film cartridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roll {
    id: RollId,
    created_at: i64,
    storage: StorageUnit,
    remaining: u32,
}

impl Roll {
    /// A fresh roll with every exposure available
    pub(crate) fn fresh(id: RollId, created_at: i64, storage: StorageUnit) -> Self {
        Self { id, created_at, storage, remaining: ROLL_CAPACITY }
    }

    /// A roll picked up again with `taken` photos already on it
    pub fn resumed(id: RollId, created_at: i64, storage: StorageUnit, taken: usize) -> Self {
        let taken = taken.min(ROLL_CAPACITY as usize) as u32;
        Self { id, created_at, storage, remaining: ROLL_CAPACITY - taken }
    }

    pub fn id(&self) -> &RollId {
        &self.id
    }

    /// Milliseconds since the Unix epoch
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn storage(&self) -> &StorageUnit {
        &self.storage
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn taken(&self) -> u32 {
        ROLL_CAPACITY - self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Consume one exposure. Callers check `is_exhausted` first.
    pub(crate) fn expose(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unit(name: &str) -> StorageUnit {
        StorageUnit::new(RollId::from(name), PathBuf::from(name))
    }

    #[test]
    fn test_id_from_timestamp() {
        assert_eq!(RollId::from_timestamp(1700000000000).as_str(), "PhotoFolder_1700000000000");
    }

    #[test]
    fn test_resumed_roll_caps_taken() {
        let roll = Roll::resumed(RollId::from("r"), 1, unit("r"), 5);
        assert_eq!(roll.remaining(), 22);
        assert_eq!(roll.taken(), 5);

        let full = Roll::resumed(RollId::from("r"), 1, unit("r"), 40);
        assert!(full.is_exhausted());
    }

    #[test]
    fn test_expose_stops_at_zero() {
        let mut roll = Roll::resumed(RollId::from("r"), 1, unit("r"), 26);
        roll.expose();
        roll.expose();
        assert_eq!(roll.remaining(), 0);
    }
}
