//! Pure domain logic for the canopy campaign worker.
//!
//! Everything here is independent of the database: the closed action
//! enumeration, the typed per-action payloads, the action-to-command
//! registry, and the subprocess executor. The `canopy-worker` binary
//! wires these together against the job store in `canopy-db`.

pub mod action;
pub mod error;
pub mod exec;
pub mod payload;
pub mod registry;
pub mod types;
