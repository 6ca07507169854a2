//! Error types shared across the core crate.

/// Why an action could not be resolved into a runnable command.
///
/// Both variants are recorded verbatim into the job's `error` field;
/// neither ever results in a subprocess being spawned.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The job's `action` text is not in the known action set.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The action is known but its external script is not installed,
    /// so the job must fail with a clear message rather than a
    /// generic launch error.
    #[error("Action unavailable: {0}")]
    ActionUnavailable(String),
}
