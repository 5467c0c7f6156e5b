use std::path::PathBuf;

use crate::{
    AtsResult, BatchId, JobListing, Profile, ProfileEdit, ResumeRecord, ScrapeTask, SessionUser,
    SignInMode, Suggestion,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the job role input.
    RoleChanged(String),
    /// User edited the location input.
    LocationChanged(String),
    /// User asked for a fresh scrape with the current inputs.
    SearchSubmitted,
    /// Engine created a scrape batch.
    BatchStarted { batch: BatchId, tasks: Vec<ScrapeTask> },
    /// Engine could not create a scrape batch.
    BatchRejected { message: String },
    /// One poll cycle completed and the batch is still running.
    BatchProgress { batch: BatchId, tasks: Vec<ScrapeTask> },
    /// Every task of the batch finished; a listing refresh follows.
    BatchFinished { batch: BatchId },
    /// The batch was abandoned.
    BatchFailed { batch: BatchId, message: String },
    /// User asked to reload the job listing.
    ListingRequested,
    /// Listing fetch outcome. An empty list means "no jobs found".
    ListingLoaded(Result<Vec<JobListing>, String>),
    /// Load the stored ATS score and suggestions.
    AtsRequested,
    JobDescriptionChanged(String),
    ScoreRequested,
    /// `Ok(None)` means the backend has no score yet.
    ScoreLoaded(Result<Option<AtsResult>, String>),
    SuggestRequested,
    SuggestionsLoaded(Result<Option<Vec<Suggestion>>, String>),
    ProfileRequested,
    ProfileLoaded(Result<Profile, String>),
    ProfileEdited(ProfileEdit),
    ProfileSaveRequested,
    ProfileSaved(Result<Profile, String>),
    ResumesRequested,
    ResumesLoaded(Result<Vec<ResumeRecord>, String>),
    ResumeUploadRequested { path: PathBuf },
    ResumeUploaded(Result<UploadReport, String>),
    SignInRequested { id_token: String, mode: SignInMode },
    SignInCompleted(Result<SessionUser, String>),
    /// Session read from disk at startup.
    SessionRestored(Option<SessionUser>),
    SignOutRequested,
    SignedOut,
    /// The hosting view is going away; nothing may change state afterwards.
    Teardown,
    /// UI/render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadReport {
    /// Uploaded, parsed, and turned into a profile.
    Uploaded { profile: Option<Profile> },
    /// Same file as the last successful upload; nothing was sent.
    Duplicate,
}
