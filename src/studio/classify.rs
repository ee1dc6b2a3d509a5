//! Transient vs terminal classification of pipeline failures.
//!
//! The vendor reports overload through message wording, so classification is
//! substring matching. Every marker lives in [`TRANSIENT_MARKERS`]; change the
//! list there when the upstream wording changes.

use crate::error::{Result, StudioError};

/// Substrings that mark an error message as worth retrying.
pub const TRANSIENT_MARKERS: &[&str] = &["503", "overloaded", "UNAVAILABLE", "Resource exhausted"];

/// What a single backend attempt amounted to. Failures keep the original error.
#[derive(Debug)]
pub enum InvocationOutcome {
    Success(String),
    TransientFailure(StudioError),
    TerminalFailure(StudioError),
}

pub fn is_transient_message(message: &str) -> bool {
    TRANSIENT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

pub fn is_transient(err: &StudioError) -> bool {
    match err {
        StudioError::NoImageInResponse => true,
        StudioError::Api { status: 503, .. } => true,
        StudioError::Configuration(_)
        | StudioError::MalformedImageData(_)
        | StudioError::TerminalGenerationFailure(_) => false,
        other => is_transient_message(&other.to_string()),
    }
}

pub fn classify(result: Result<String>) -> InvocationOutcome {
    match result {
        Ok(data_url) => InvocationOutcome::Success(data_url),
        Err(err) if is_transient(&err) => InvocationOutcome::TransientFailure(err),
        Err(err) => InvocationOutcome::TerminalFailure(err),
    }
}
