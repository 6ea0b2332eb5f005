//! Paired image store
//!
//! Keeps the original and finalized sequences index-aligned by storing each
//! pair in a single slot record. Positions are derived from the slot order;
//! identities are stable `SlotId`s.

use super::data::{EncodedImage, ImageSlot, SlotId};

#[derive(Debug, Default)]
pub struct PairedStore {
    slots: Vec<ImageSlot>,
    next_id: u64,
}

impl PairedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded batch in order, each slot with an empty finalized entry
    ///
    /// Returns the ids of the new slots (same order as `originals`).
    pub fn append_batch(&mut self, originals: Vec<EncodedImage>) -> Vec<SlotId> {
        let mut ids = Vec::with_capacity(originals.len());
        self.slots.reserve(originals.len());

        for original in originals {
            let id = SlotId::from_raw(self.next_id);
            self.next_id += 1;
            self.slots.push(ImageSlot {
                id,
                original,
                finalized: None,
            });
            ids.push(id);
        }

        ids
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in position order
    pub fn slots(&self) -> &[ImageSlot] {
        &self.slots
    }

    /// Current position of a slot
    pub fn position(&self, id: SlotId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    pub fn get(&self, id: SlotId) -> Option<&ImageSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn get_at(&self, position: usize) -> Option<&ImageSlot> {
        self.slots.get(position)
    }

    /// Overwrite a slot's finalized image. Returns false if the slot is gone.
    pub fn set_finalized(&mut self, id: SlotId, image: EncodedImage) -> bool {
        match self.slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) => {
                slot.finalized = Some(image);
                true
            }
            None => false,
        }
    }

    /// Remove a slot; every later slot moves down one position
    pub fn remove(&mut self, id: SlotId) -> Option<(usize, ImageSlot)> {
        let position = self.position(id)?;
        Some((position, self.slots.remove(position)))
    }

    /// Original images in position order
    pub fn originals(&self) -> impl Iterator<Item = &EncodedImage> + '_ {
        self.slots.iter().map(|slot| &slot.original)
    }

    /// Finalized entries in position order, including empty ones
    pub fn finalized(&self) -> impl Iterator<Item = Option<&EncodedImage>> + '_ {
        self.slots.iter().map(|slot| slot.finalized.as_ref())
    }

    /// The consumer view: non-empty finalized images in position order
    pub fn finalized_images(&self) -> Vec<EncodedImage> {
        self.slots
            .iter()
            .filter_map(|slot| slot.finalized.clone())
            .collect()
    }

    pub fn finalized_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_finalized()).count()
    }

    /// First slot at or after `position` that still needs its initial crop
    pub fn first_unfinalized_from(&self, position: usize) -> Option<SlotId> {
        self.slots
            .iter()
            .skip(position)
            .find(|slot| !slot.is_finalized())
            .map(|slot| slot.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tagged;

    fn store_with(names: &[&str]) -> (PairedStore, Vec<SlotId>) {
        let mut store = PairedStore::new();
        let ids = store.append_batch(names.iter().map(|name| tagged(name)).collect());
        (store, ids)
    }

    #[test]
    fn test_append_creates_empty_slots() {
        let (store, ids) = store_with(&["a", "b"]);

        assert_eq!(store.len(), 2);
        assert_eq!(ids.len(), 2);
        assert_eq!(store.originals().count(), store.finalized().count());
        assert!(store.finalized().all(|entry| entry.is_none()));
        assert_eq!(store.finalized_count(), 0);
        assert!(store.finalized_images().is_empty());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (mut store, ids) = store_with(&["a", "b"]);
        store.remove(ids[1]);
        let more = store.append_batch(vec![tagged("c")]);

        assert_ne!(more[0], ids[1]);
        assert!(more[0] > ids[1]);
    }

    #[test]
    fn test_finalized_images_skip_empty_and_keep_order() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        store.set_finalized(ids[2], tagged("c'"));
        store.set_finalized(ids[0], tagged("a'"));

        assert_eq!(store.finalized_images(), vec![tagged("a'"), tagged("c'")]);
        assert_eq!(store.finalized_count(), 2);
    }

    #[test]
    fn test_remove_shifts_later_positions() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);

        let (position, removed) = store.remove(ids[1]).unwrap();

        assert_eq!(position, 1);
        assert_eq!(removed.original, tagged("b"));
        assert_eq!(store.position(ids[2]), Some(1));
        assert_eq!(store.get_at(1).unwrap().original, tagged("c"));
        assert!(store.remove(ids[1]).is_none());
    }

    #[test]
    fn test_set_finalized_on_removed_slot() {
        let (mut store, ids) = store_with(&["a"]);
        store.remove(ids[0]);

        assert!(!store.set_finalized(ids[0], tagged("x")));
    }

    #[test]
    fn test_first_unfinalized_from() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        store.set_finalized(ids[1], tagged("b'"));

        assert_eq!(store.first_unfinalized_from(0), Some(ids[0]));
        assert_eq!(store.first_unfinalized_from(1), Some(ids[2]));
        assert_eq!(store.first_unfinalized_from(3), None);
        assert_eq!(store.first_unfinalized_from(10), None);
    }
}
