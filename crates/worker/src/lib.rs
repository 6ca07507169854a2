//! Long-running campaign job worker.
//!
//! Polls the shared `jobs` table, claims at most one job at a time,
//! exports the opt-out/consent snapshots the campaign scripts read,
//! dispatches the matching script as a bounded subprocess, records the
//! outcome, and publishes the rebuilt SMS list after a successful
//! `build_sms_list` run.

pub mod config;
pub mod exporter;
pub mod poll;
pub mod publisher;
