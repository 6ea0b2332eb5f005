//! File intake validator
//!
//! Cuts a raw selection down to what the session can take: at most the
//! remaining slot budget, images only, nothing over the size ceiling. None of
//! this is an error; dropped files are counted, and oversized ones raise one
//! aggregate warning for the user.

use std::fmt;

use tracing::{debug, warn};

use super::source::SelectedFile;

/// Per-file size ceiling (10 MiB)
pub const DEFAULT_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

/// Budget the validator enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    /// Maximum number of images in the session
    pub capacity: usize,
    /// Largest accepted file in bytes
    pub size_limit_bytes: u64,
}

/// User-facing notice produced by intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeWarning {
    /// At least one file was over the size ceiling
    Oversized { count: usize, limit_bytes: u64 },
}

impl fmt::Display for IntakeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversized { limit_bytes, .. } => write!(
                f,
                "Some files are too large. Please upload files smaller than {}MB.",
                limit_bytes / (1024 * 1024)
            ),
        }
    }
}

/// What survived validation, and what did not
#[derive(Debug, Clone, Default)]
pub struct IntakeOutcome {
    /// Files to decode, in selection order
    pub accepted: Vec<SelectedFile>,
    /// Files beyond the remaining slot budget
    pub over_capacity: usize,
    /// Files whose declared type is not an image
    pub wrong_type: usize,
    /// Names of files over the size ceiling
    pub oversized: Vec<String>,
    /// Set when `oversized` is not empty
    pub warning: Option<IntakeWarning>,
}

/// Filter a selection against the remaining budget
///
/// `remaining = capacity - finalized_count`; the selection is cut to that many
/// entries first, then non-images and oversized files are dropped from what
/// is left. Order is preserved.
pub fn validate_selection(
    selection: Vec<SelectedFile>,
    finalized_count: usize,
    limits: &IntakeLimits,
) -> IntakeOutcome {
    let remaining = limits.capacity.saturating_sub(finalized_count);
    let total = selection.len();
    let mut outcome = IntakeOutcome {
        over_capacity: total.saturating_sub(remaining),
        ..IntakeOutcome::default()
    };

    for file in selection.into_iter().take(remaining) {
        if !file.is_image() {
            debug!("Skipping {}: declared type {}", file.name, file.media_type);
            outcome.wrong_type += 1;
        } else if file.size > limits.size_limit_bytes {
            debug!("Skipping {}: {} bytes", file.name, file.size);
            outcome.oversized.push(file.name);
        } else {
            outcome.accepted.push(file);
        }
    }

    if !outcome.oversized.is_empty() {
        let warning = IntakeWarning::Oversized {
            count: outcome.oversized.len(),
            limit_bytes: limits.size_limit_bytes,
        };
        warn!("⚠️  {} ({} file(s))", warning, outcome.oversized.len());
        outcome.warning = Some(warning);
    }

    debug!(
        "Intake: {} selected, {} accepted, {} over capacity, {} wrong type, {} oversized",
        total,
        outcome.accepted.len(),
        outcome.over_capacity,
        outcome.wrong_type,
        outcome.oversized.len()
    );

    outcome
}
