//! Session state
//!
//! This module holds everything one intake session owns:
//! - Shared data structures (data.rs)
//! - The paired original/finalized store (store.rs)
//! - The sequential crop driver (crop.rs)
//! - Adjustment parameters for edits (edit.rs)
//! - The session that ties them together and notifies the consumer (session.rs)

pub mod crop;
pub mod data;
pub mod edit;
pub mod session;
pub mod store;

pub use crop::{CropState, ScanPolicy};
pub use data::{EncodedImage, ImageSlot, SlotId};
pub use edit::EditParams;
pub use session::{IntakeReport, PendingIntake, Session};
