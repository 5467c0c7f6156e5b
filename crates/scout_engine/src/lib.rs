//! Scout engine: backend IO, scrape polling and local session storage.
mod api;
mod engine;
mod listing;
mod orchestrator;
mod persist;
mod resume;
mod session;
mod types;
mod wire;

pub use api::{ApiSettings, JobApi, ReqwestJobApi, DEFAULT_BACKEND_URL};
pub use engine::{EngineCommand, EngineError, EngineHandle, EngineSettings};
pub use listing::ListingAggregator;
pub use orchestrator::{
    ChannelEventSink, EventSink, PollSettings, ScrapeOrchestrator, DEFAULT_POLL_INTERVAL,
};
pub use persist::{ensure_config_dir, AtomicFileWriter, PersistError};
pub use resume::{fingerprint, ResumeUploader};
pub use session::{Session, SessionError, SessionEvent, SessionStore, SESSION_FILENAME};
pub use types::{
    ApiError, AuthGrant, EngineEvent, FailureKind, FetchedListing, OrchestratorError,
    ResumeError, UploadOutcome, UploadedResume,
};
