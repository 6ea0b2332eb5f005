//! The intake session
//!
//! One `Session` owns everything a multi-image upload needs: the paired
//! store, the crop driver, the capacity and the consumer. Every operation
//! takes `&mut self`, so there is exactly one writer. After each mutation
//! the consumer receives the finalized images read from the store as it is
//! *after* the change.

use std::future::Future;

use tracing::{debug, info, warn};

use super::crop::{CropDriver, CropState, ScanPolicy};
use super::data::{EncodedImage, ImageSlot, SlotId};
use super::store::PairedStore;
use crate::config::PipelineConfig;
use crate::error::{IntakeError, SessionError};
use crate::imaging::{CropCapability, CropRegion, CropSpec, EditCapability};
use crate::intake::{
    decode_batch, validate_selection, DecodePolicy, DecodedBatch, IntakeLimits, IntakeOutcome,
    IntakeWarning, SelectedFile,
};
use crate::notify::ImagesConsumer;

/// Summary of one intake, filled in by validation and then by the append
#[derive(Debug, Clone, Default)]
pub struct IntakeReport {
    /// Slots created by this batch, in order
    pub appended: Vec<SlotId>,
    /// Oversized-file notice to show the user
    pub warning: Option<IntakeWarning>,
    /// Files cut by the slot budget (at validation or append time)
    pub over_capacity: usize,
    pub wrong_type: usize,
    pub oversized: usize,
    /// Files dropped because they could not be decoded
    pub decode_failures: Vec<IntakeError>,
}

/// A validated selection waiting to be decoded
///
/// Produced by `Session::begin_intake`; the decode runs without borrowing
/// the session and its result goes back through `Session::finish_intake`.
#[derive(Debug)]
pub struct PendingIntake {
    files: Vec<SelectedFile>,
    policy: DecodePolicy,
    size_limit: u64,
    report: IntakeReport,
}

impl PendingIntake {
    /// Files that passed validation
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Validation results so far
    pub fn report(&self) -> &IntakeReport {
        &self.report
    }

    /// Split into the decode to run and the report to finish with
    pub fn into_parts(
        self,
    ) -> (
        impl Future<Output = Result<DecodedBatch, IntakeError>> + Send + 'static,
        IntakeReport,
    ) {
        let decode = decode_batch(self.files, self.policy, self.size_limit);
        (decode, self.report)
    }
}

pub struct Session {
    store: PairedStore,
    driver: CropDriver,
    limits: IntakeLimits,
    crop_spec: CropSpec,
    decode_policy: DecodePolicy,
    consumer: Box<dyn ImagesConsumer>,
}

impl Session {
    /// Start an empty session
    pub fn new(config: &PipelineConfig, consumer: impl ImagesConsumer + 'static) -> Self {
        Self::with_parts(
            config.limits(),
            config.crop_spec(),
            config.scan_policy,
            config.decode_policy,
            consumer,
        )
    }

    pub fn with_parts(
        limits: IntakeLimits,
        crop_spec: CropSpec,
        scan_policy: ScanPolicy,
        decode_policy: DecodePolicy,
        consumer: impl ImagesConsumer + 'static,
    ) -> Self {
        Self {
            store: PairedStore::new(),
            driver: CropDriver::new(scan_policy),
            limits,
            crop_spec,
            decode_policy,
            consumer: Box::new(consumer),
        }
    }

    // ========== Queries ==========

    pub fn capacity(&self) -> usize {
        self.limits.capacity
    }

    /// Number of slots (cropped or not)
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn slots(&self) -> &[ImageSlot] {
        self.store.slots()
    }

    pub fn slot(&self, id: SlotId) -> Option<&ImageSlot> {
        self.store.get(id)
    }

    pub fn position(&self, id: SlotId) -> Option<usize> {
        self.store.position(id)
    }

    pub fn finalized_count(&self) -> usize {
        self.store.finalized_count()
    }

    /// The list the consumer sees
    pub fn finalized_images(&self) -> Vec<EncodedImage> {
        self.store.finalized_images()
    }

    /// "N images remaining" on the upload control
    pub fn remaining_slots(&self) -> usize {
        self.capacity().saturating_sub(self.finalized_count())
    }

    pub fn crop_state(&self) -> CropState {
        self.driver.state()
    }

    /// Slot currently waiting for its initial crop
    pub fn active_crop(&self) -> Option<SlotId> {
        self.driver.active()
    }

    /// The active slot itself, for the crop view
    pub fn active_slot(&self) -> Option<&ImageSlot> {
        self.active_crop().and_then(|id| self.store.get(id))
    }

    /// "Image i of n" for the crop view (1-based)
    pub fn crop_progress(&self) -> Option<(usize, usize)> {
        let position = self.active_crop().and_then(|id| self.store.position(id))?;
        Some((position + 1, self.store.len()))
    }

    /// Does the order have all the images it needs?
    pub fn is_complete(&self) -> bool {
        self.finalized_count() == self.capacity()
    }

    // ========== Intake ==========

    /// Validate a raw selection against the current budget
    pub fn validate(&self, selection: Vec<SelectedFile>) -> IntakeOutcome {
        validate_selection(selection, self.finalized_count(), &self.limits)
    }

    /// First half of intake: validate and prepare the decode
    pub fn begin_intake(&self, selection: Vec<SelectedFile>) -> PendingIntake {
        let outcome = self.validate(selection);
        PendingIntake {
            report: IntakeReport {
                warning: outcome.warning,
                over_capacity: outcome.over_capacity,
                wrong_type: outcome.wrong_type,
                oversized: outcome.oversized.len(),
                ..IntakeReport::default()
            },
            files: outcome.accepted,
            policy: self.decode_policy,
            size_limit: self.limits.size_limit_bytes,
        }
    }

    /// Second half of intake: append the decoded batch and complete the report
    ///
    /// Images cut by the capacity re-check count as over capacity.
    pub fn finish_intake(
        &mut self,
        mut report: IntakeReport,
        batch: DecodedBatch,
    ) -> IntakeReport {
        let decoded = batch.images.len();
        report.appended = self.append_batch(batch.images);
        report.over_capacity += decoded - report.appended.len();
        report.decode_failures = batch.failures;
        report
    }

    /// Full intake: validate, decode the batch concurrently, append it
    ///
    /// The session stays borrowed across the decode, so batches cannot
    /// interleave.
    pub async fn intake(
        &mut self,
        selection: Vec<SelectedFile>,
    ) -> Result<IntakeReport, IntakeError> {
        let (decode, report) = self.begin_intake(selection).into_parts();
        let batch = decode.await?;
        Ok(self.finish_intake(report, batch))
    }

    /// Append a decoded batch as new slots with empty finalized entries
    ///
    /// The batch is cut to the free slots so the session never exceeds its
    /// capacity, even if two selections were validated against the same
    /// state. An empty batch changes nothing and notifies nobody.
    pub fn append_batch(&mut self, mut images: Vec<EncodedImage>) -> Vec<SlotId> {
        let free = self.capacity().saturating_sub(self.store.len());
        if images.len() > free {
            debug!(
                "Batch of {} cut to {} free slot(s)",
                images.len(),
                free
            );
            images.truncate(free);
        }
        if images.is_empty() {
            return Vec::new();
        }

        let ids = self.store.append_batch(images);
        self.driver.on_batch_appended(&ids);
        info!(
            "🖼️  Added {} image(s), {} slot(s) in session",
            ids.len(),
            self.store.len()
        );

        self.notify();
        ids
    }

    // ========== Crop ==========

    /// Confirm the initial crop of the active slot
    ///
    /// Runs the crop capability on the slot's original with the session's
    /// geometry, stores the result and moves to the next uncropped slot.
    /// Returns the new active slot, if any. On error nothing changes.
    pub fn confirm_crop<C>(
        &mut self,
        cropper: &C,
        region: Option<CropRegion>,
    ) -> Result<Option<SlotId>, SessionError>
    where
        C: CropCapability + ?Sized,
    {
        let id = self.active_crop().ok_or(SessionError::NotCropping)?;
        let (position, original) = self
            .store
            .position(id)
            .and_then(|position| {
                self.store
                    .get_at(position)
                    .map(|slot| (position, slot.original.clone()))
            })
            .ok_or(SessionError::UnknownSlot(id))?;

        let cropped = cropper.crop(&original, &self.crop_spec, region)?;
        self.store.set_finalized(id, cropped);

        let next = self.driver.on_confirmed(&self.store, position);
        info!(
            "✅ Cropped image {} of {}",
            position + 1,
            self.store.len()
        );

        self.notify();
        Ok(next)
    }

    // ========== Edit relay ==========

    /// Overwrite a finalized image with an edited one
    pub fn apply_edit(&mut self, id: SlotId, image: EncodedImage) -> Result<(), SessionError> {
        let slot = self.store.get(id).ok_or(SessionError::UnknownSlot(id))?;
        if !slot.is_finalized() {
            return Err(SessionError::NotFinalized(id));
        }

        self.store.set_finalized(id, image);
        debug!("Edit applied to slot {}", id);

        self.notify();
        Ok(())
    }

    /// `apply_edit` addressed by position
    pub fn apply_edit_at(
        &mut self,
        position: usize,
        image: EncodedImage,
    ) -> Result<(), SessionError> {
        let id = self.id_at(position)?;
        self.apply_edit(id, image)
    }

    /// Run an edit capability on a slot and relay its result
    pub fn edit_with<E>(&mut self, id: SlotId, editor: &E) -> Result<(), SessionError>
    where
        E: EditCapability + ?Sized,
    {
        let slot = self.store.get(id).ok_or(SessionError::UnknownSlot(id))?;
        let current = slot
            .finalized
            .as_ref()
            .ok_or(SessionError::NotFinalized(id))?;

        let edited = editor.edit(current, &slot.original)?;
        self.apply_edit(id, edited)
    }

    // ========== Removal ==========

    /// Remove a logical image; later slots move down one position
    pub fn remove(&mut self, id: SlotId) -> Result<ImageSlot, SessionError> {
        let (position, slot) = self.store.remove(id).ok_or(SessionError::UnknownSlot(id))?;
        self.driver.on_removed(&self.store, id, position);
        info!(
            "🗑️  Removed image at position {}, {} left",
            position + 1,
            self.store.len()
        );

        self.notify();
        Ok(slot)
    }

    /// `remove` addressed by position
    pub fn remove_at(&mut self, position: usize) -> Result<ImageSlot, SessionError> {
        let id = self.id_at(position)?;
        self.remove(id)
    }

    // ========== Handoff ==========

    /// The finalized images for the order, once all of them are ready
    pub fn handoff(&self) -> Result<Vec<EncodedImage>, SessionError> {
        let images = self.store.finalized_images();
        if images.len() != self.capacity() {
            warn!(
                "Handoff refused: {} of {} images ready",
                images.len(),
                self.capacity()
            );
            return Err(SessionError::Incomplete {
                required: self.capacity(),
                finalized: images.len(),
            });
        }
        Ok(images)
    }

    fn id_at(&self, position: usize) -> Result<SlotId, SessionError> {
        self.store
            .get_at(position)
            .map(|slot| slot.id)
            .ok_or(SessionError::PositionOutOfRange {
                position,
                len: self.store.len(),
            })
    }

    /// Emit the post-mutation view
    fn notify(&mut self) {
        let images = self.store.finalized_images();
        debug!("Notifying consumer with {} image(s)", images.len());
        self.consumer.on_images_update(&images);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("slots", &self.store.len())
            .field("finalized", &self.store.finalized_count())
            .field("crop", &self.driver.state())
            .field("limits", &self.limits)
            .finish()
    }
}
