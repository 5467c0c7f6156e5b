//! Jobscout core: pure state machine, domain types and view-model helpers.
mod batch;
mod effect;
mod listing;
mod msg;
mod profile;
mod state;
mod types;
mod update;
mod validation;
mod view_model;

pub use batch::{apply_statuses, evaluate_batch, BatchVerdict};
pub use effect::Effect;
pub use listing::{merge_buckets, sort_listing};
pub use msg::{Msg, UploadReport};
pub use profile::{apply_edit, ListField, ProfileEdit, ProfileField, ScalarField};
pub use state::{AppState, Remote, SearchPhase};
pub use types::{
    AtsResult, BatchId, JobListing, JobSource, Profile, ResumeRecord, ScrapeTask, SessionUser,
    SignInMode, Suggestion, TaskId, TaskStatus,
};
pub use update::update;
pub use validation::{validate_id_token, validate_job_description, SearchQuery, ValidationError};
pub use view_model::{AppViewModel, JobRowView, SearchView, Severity, StatusLine, TaskRowView};
