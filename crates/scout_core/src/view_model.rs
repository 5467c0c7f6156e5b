use crate::state::Remote;
use crate::{
    AtsResult, BatchId, JobListing, Profile, ResumeRecord, ScrapeTask, SessionUser, Suggestion,
    TaskStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// The single user-facing status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub session: Option<SessionUser>,
    pub search: SearchView,
    pub jobs: Vec<JobRowView>,
    pub listing_loading: bool,
    pub ats_score: Remote<AtsResult>,
    pub suggestions: Remote<Vec<Suggestion>>,
    pub profile: Option<Profile>,
    pub profile_loading: bool,
    pub resumes: Remote<Vec<ResumeRecord>>,
    pub status: Option<StatusLine>,
    pub busy: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchView {
    pub role: String,
    pub location: String,
    pub submitting: bool,
    pub batch: Option<BatchId>,
    pub tasks: Vec<TaskRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub short_id: String,
    pub spider: String,
    pub status: TaskStatus,
}

impl TaskRowView {
    pub(crate) fn from_task(task: &ScrapeTask) -> Self {
        Self {
            short_id: task.id.short().to_string(),
            spider: task.spider.clone(),
            status: task.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    /// e.g. `March 4, 2025`.
    pub published: Option<String>,
    pub url: String,
}

impl JobRowView {
    pub(crate) fn from_listing(job: &JobListing) -> Self {
        Self {
            id: job.id.clone(),
            source: job.source.label().to_string(),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            published: job
                .published
                .map(|published| published.format("%B %-d, %Y").to_string()),
            url: job.url.clone(),
        }
    }
}
