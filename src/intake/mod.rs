//! File intake
//!
//! - `source.rs` - raw selections from paths, folders or memory
//! - `validator.rs` - slot budget, media type and size filtering
//! - `decoder.rs` - concurrent decoding of an accepted batch

pub mod decoder;
pub mod source;
pub mod validator;

pub use decoder::{decode_batch, DecodePolicy, DecodedBatch};
pub use source::{selection_from_folder, selection_from_paths, FileSource, SelectedFile};
pub use validator::{validate_selection, IntakeLimits, IntakeOutcome, IntakeWarning, DEFAULT_SIZE_LIMIT};
