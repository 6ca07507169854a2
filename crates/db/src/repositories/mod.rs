//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod contact_repo;
pub mod job_repo;
pub mod list_repo;

pub use contact_repo::{OptOutRepo, WarmLeadRepo};
pub use job_repo::JobRepo;
pub use list_repo::ListRepo;
