//! Sequential crop driver
//!
//! Walks the user through the initial crop of every new upload, one slot at
//! a time, in position order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data::SlotId;
use super::store::PairedStore;

/// Where the driver looks for the next slot after a confirmation
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Only slots after the confirmed one. Earlier uncropped slots are left
    /// for the user to pick up with a new upload.
    #[default]
    ForwardOnly,
    /// Forward first, then wrap to the first uncropped slot before it
    Wraparound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CropState {
    #[default]
    Idle,
    Cropping(SlotId),
}

#[derive(Debug, Default)]
pub struct CropDriver {
    state: CropState,
    policy: ScanPolicy,
}

impl CropDriver {
    pub fn new(policy: ScanPolicy) -> Self {
        Self {
            state: CropState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    pub fn active(&self) -> Option<SlotId> {
        match self.state {
            CropState::Idle => None,
            CropState::Cropping(id) => Some(id),
        }
    }

    /// A batch landed; start on its first slot unless a crop is in progress
    pub fn on_batch_appended(&mut self, new_slots: &[SlotId]) {
        if let (CropState::Idle, Some(&first)) = (self.state, new_slots.first()) {
            debug!("Crop driver: starting at slot {}", first);
            self.state = CropState::Cropping(first);
        }
    }

    /// The slot at `position` was just cropped; move to the next one
    pub fn on_confirmed(&mut self, store: &PairedStore, position: usize) -> Option<SlotId> {
        let next = self.scan(store, position + 1, position);
        self.set(next)
    }

    /// A slot was removed from `position`. Only matters if it was the active one.
    pub fn on_removed(&mut self, store: &PairedStore, removed: SlotId, position: usize) {
        if self.active() == Some(removed) {
            let next = self.scan(store, position, position);
            self.set(next);
        }
    }

    /// Search from `from`, wrapping to the slots before `wrap_end` if allowed
    fn scan(&self, store: &PairedStore, from: usize, wrap_end: usize) -> Option<SlotId> {
        let forward = store.first_unfinalized_from(from);
        match self.policy {
            ScanPolicy::ForwardOnly => forward,
            ScanPolicy::Wraparound => forward.or_else(|| {
                store
                    .first_unfinalized_from(0)
                    .filter(|&id| store.position(id).is_some_and(|p| p < wrap_end))
            }),
        }
    }

    fn set(&mut self, next: Option<SlotId>) -> Option<SlotId> {
        self.state = match next {
            Some(id) => CropState::Cropping(id),
            None => CropState::Idle,
        };
        debug!("Crop driver: now {:?}", self.state);
        next
    }
}
