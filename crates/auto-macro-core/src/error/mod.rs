use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Record/replay engine errors with source location tracking.
#[derive(Error, Debug)]
pub enum MacroError {
    /// A session (capture, playback or a periodic tool) is already running.
    #[error("Cannot start: already {active} {location}")]
    AlreadyActive {
        /// What was running when the start was attempted.
        active: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback was requested on a log without records.
    #[error("Action log is empty {location}")]
    EmptyLog {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback speed multiplier was zero, negative or not finite.
    #[error("Invalid playback speed: {speed} {location}")]
    InvalidSpeed {
        /// The rejected multiplier.
        speed: f64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A periodic interval was zero, negative or not finite.
    #[error("Invalid interval: {reason} {location}")]
    InvalidInterval {
        /// Description of the rejected interval.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persisted log data failed structural validation.
    #[error("Malformed action log: {reason} {location}")]
    MalformedLog {
        /// Description of the structural problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A key could not be mapped to anything the synthesis backend supports.
    #[error("Unrecognized key: {key} {location}")]
    UnrecognizedKey {
        /// The key text as recorded.
        key: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The global input subscription could not be acquired.
    #[error("Input listener unavailable: {reason} {location}")]
    ListenerUnavailable {
        /// Description of the failure (often a missing OS permission).
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The synthesis backend failed to emit an input event.
    #[error("Input synthesis failed: {reason} {location}")]
    SynthesisFailed {
        /// Description of the backend failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A session worker thread panicked before reporting its result.
    #[error("Worker thread '{worker}' panicked {location}")]
    WorkerPanicked {
        /// Name of the worker thread.
        worker: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations or thread spawning.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for MacroError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        MacroError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`MacroError`].
pub type Result<T> = std::result::Result<T, MacroError>;
