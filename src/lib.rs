//! Multi-image intake, crop and edit pipeline
//!
//! Turns a batch of uploaded photos into an ordered set of cropped images for
//! an order: files are validated and decoded concurrently, each new image is
//! cropped in turn, finished crops can be edited or removed, and a consumer
//! is told about the current finalized set after every change.
//!
//! The desktop front-end lives in `main.rs`; this library is the pipeline.

pub mod config;
pub mod error;
pub mod imaging;
pub mod intake;
pub mod notify;
pub mod state;

#[cfg(test)]
mod test_support;

pub use config::PipelineConfig;
pub use error::{ConfigError, CropError, EditError, IntakeError, SessionError};
pub use notify::ImagesConsumer;
pub use state::{EncodedImage, ImageSlot, Session, SlotId};
