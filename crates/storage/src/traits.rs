use tracker_core::{TrackerType, TypedUids, Uid};

/// Existence oracle consulted while validating and filtering a bundle.
///
/// Implementations answer from data loaded before validation starts, so a
/// lookup never fails and never blocks.
pub trait Preheat {
    fn exists(&self, tracker_type: TrackerType, uid: &Uid) -> bool;
}

impl<P: Preheat + ?Sized> Preheat for &P {
    fn exists(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        (**self).exists(tracker_type, uid)
    }
}

/// Snapshot of existing records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreheat {
    existing: TypedUids,
}

impl MemoryPreheat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_uids(existing: TypedUids) -> Self {
        Self { existing }
    }

    pub fn with(mut self, tracker_type: TrackerType, uid: impl Into<Uid>) -> Self {
        self.insert(tracker_type, uid);
        self
    }

    pub fn insert(&mut self, tracker_type: TrackerType, uid: impl Into<Uid>) {
        self.existing.insert(tracker_type, uid.into());
    }

    pub fn existing(&self) -> &TypedUids {
        &self.existing
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }
}

impl Preheat for MemoryPreheat {
    fn exists(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.existing.contains(tracker_type, uid)
    }
}
