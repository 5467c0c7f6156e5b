use std::fmt;

use scout_core::{
    AtsResult, BatchId, JobListing, Profile, ResumeRecord, ScrapeTask, SessionUser, Suggestion,
    TaskId, ValidationError,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    BatchStarted {
        batch: BatchId,
        tasks: Vec<ScrapeTask>,
    },
    BatchCreationFailed {
        error: OrchestratorError,
    },
    BatchProgress {
        batch: BatchId,
        tasks: Vec<ScrapeTask>,
    },
    BatchFinished {
        batch: BatchId,
    },
    BatchFailed {
        batch: BatchId,
        error: OrchestratorError,
    },
    ListingFetched(Result<FetchedListing, OrchestratorError>),
    AtsScoreLoaded(Result<Option<AtsResult>, ApiError>),
    SuggestionsLoaded(Result<Option<Vec<Suggestion>>, ApiError>),
    ProfileLoaded(Result<Profile, ApiError>),
    ProfileSaved(Result<Profile, ApiError>),
    ResumesLoaded(Result<Vec<ResumeRecord>, ApiError>),
    ResumeUploaded(Result<UploadOutcome, ResumeError>),
    SignedIn(Result<AuthGrant, ApiError>),
    /// Local sign-out always happens; `remote` carries the logout call result.
    SignedOut {
        remote: Result<(), ApiError>,
    },
    /// Ctrl-C was pressed.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedListing {
    Jobs(Vec<JobListing>),
    /// The backend has no jobs for this user. Not a failure.
    Empty,
}

impl FetchedListing {
    pub fn into_jobs(self) -> Vec<JobListing> {
        match self {
            FetchedListing::Jobs(jobs) => jobs,
            FetchedListing::Empty => Vec::new(),
        }
    }
}

/// Signed-in user plus the cookie the backend set for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub user: SessionUser,
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedResume {
    pub id: Option<String>,
    pub file_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Uploaded {
        profile: Option<Profile>,
        fingerprint: String,
    },
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body did not have the expected shape.
    Decode,
    /// 2xx response whose envelope says `success: false`.
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::Rejected => write!(f, "rejected by backend"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("scrape task creation failed: {0}")]
    TaskCreation(String),
    #[error("{} scrape task(s) failed or vanished", .tasks.len())]
    TaskFailed { tasks: Vec<TaskId> },
    #[error("status check failed: {0}")]
    Poll(ApiError),
    #[error("job listing fetch failed: {0}")]
    Fetch(ApiError),
}

impl OrchestratorError {
    /// Status line shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            OrchestratorError::Validation(err) => err.to_string(),
            OrchestratorError::TaskCreation(_) => "Failed to start scrape task.".to_string(),
            OrchestratorError::TaskFailed { .. } => "Some scrape tasks failed.".to_string(),
            OrchestratorError::Poll(_) => "Failed to check scrape status.".to_string(),
            OrchestratorError::Fetch(_) => "Failed to fetch jobs.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResumeError {
    #[error("could not read {path}: {message}")]
    Read { path: String, message: String },
    #[error("upload failed: {0}")]
    Upload(ApiError),
    #[error("parsing failed: {0}")]
    Parse(ApiError),
    #[error("profile creation failed: {0}")]
    Profile(ApiError),
}
