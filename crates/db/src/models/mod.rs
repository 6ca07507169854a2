//! Database entity models.

pub mod contact;
pub mod job;
pub mod list;

pub use contact::{OptOut, WarmLead};
pub use job::{Job, JobStatus};
pub use list::{ListMetadata, ListPreview, NewSmsListRow};
