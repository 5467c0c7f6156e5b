use crate::listing::sort_listing;
use crate::view_model::{AppViewModel, JobRowView, SearchView, StatusLine, TaskRowView};
use crate::{
    AtsResult, BatchId, JobListing, Profile, ResumeRecord, ScrapeTask, SessionUser, Severity,
    Suggestion,
};

/// A value fetched from the backend, with the UI state around it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Remote<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    /// The backend answered but has nothing stored yet.
    Missing,
    Failed(String),
}

impl<T> Remote<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    /// Waiting for the backend to create the batch.
    Submitting,
    Polling {
        batch: BatchId,
        tasks: Vec<ScrapeTask>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    role_input: String,
    location_input: String,
    search: SearchPhase,
    last_batch: Option<BatchId>,
    jobs: Vec<JobListing>,
    listing_loading: bool,
    job_description: String,
    ats_score: Remote<AtsResult>,
    suggestions: Remote<Vec<Suggestion>>,
    profile: Remote<Profile>,
    draft: Option<Profile>,
    /// The last edit to the draft was rejected; saving is refused until a
    /// later edit succeeds or the profile is reloaded.
    edit_rejected: bool,
    profile_saving: bool,
    resumes: Remote<Vec<ResumeRecord>>,
    resume_uploading: bool,
    session_user: Option<SessionUser>,
    auth_pending: bool,
    status: Option<StatusLine>,
    torn_down: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let (batch, tasks) = match &self.search {
            SearchPhase::Polling { batch, tasks } => (
                Some(*batch),
                tasks.iter().map(TaskRowView::from_task).collect(),
            ),
            _ => (None, Vec::new()),
        };
        AppViewModel {
            session: self.session_user.clone(),
            search: SearchView {
                role: self.role_input.clone(),
                location: self.location_input.clone(),
                submitting: self.search == SearchPhase::Submitting,
                batch,
                tasks,
            },
            jobs: self.jobs.iter().map(JobRowView::from_listing).collect(),
            listing_loading: self.listing_loading,
            ats_score: self.ats_score.clone(),
            suggestions: self.suggestions.clone(),
            profile: self.draft.clone(),
            profile_loading: self.profile.is_loading(),
            resumes: self.resumes.clone(),
            status: self.status.clone(),
            busy: self.is_busy(),
            dirty: self.dirty,
        }
    }

    /// True while any request this state is waiting on is outstanding.
    pub fn is_busy(&self) -> bool {
        if self.torn_down {
            return false;
        }
        self.search != SearchPhase::Idle
            || self.listing_loading
            || self.ats_score.is_loading()
            || self.suggestions.is_loading()
            || self.profile.is_loading()
            || self.profile_saving
            || self.resumes.is_loading()
            || self.resume_uploading
            || self.auth_pending
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn search_phase(&self) -> &SearchPhase {
        &self.search
    }

    pub fn role_input(&self) -> &str {
        &self.role_input
    }

    pub fn location_input(&self) -> &str {
        &self.location_input
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn draft(&self) -> Option<&Profile> {
        self.draft.as_ref()
    }

    pub(crate) fn tear_down(&mut self) {
        self.torn_down = true;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, severity: Severity, text: impl Into<String>) {
        self.status = Some(StatusLine {
            severity,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn set_role(&mut self, role: String) {
        self.role_input = role;
        self.dirty = true;
    }

    pub(crate) fn set_location(&mut self, location: String) {
        self.location_input = location;
        self.dirty = true;
    }

    pub(crate) fn set_job_description(&mut self, text: String) {
        self.job_description = text;
        self.dirty = true;
    }

    pub(crate) fn begin_submit(&mut self) {
        self.search = SearchPhase::Submitting;
        self.dirty = true;
    }

    /// Accepts a batch only while a submit is outstanding, and only if it is
    /// newer than anything seen before. A batch created after its search was
    /// cancelled is dropped.
    pub(crate) fn start_batch(&mut self, batch: BatchId, tasks: Vec<ScrapeTask>) -> bool {
        if self.search != SearchPhase::Submitting {
            return false;
        }
        if self.last_batch.is_some_and(|last| batch <= last) {
            return false;
        }
        self.last_batch = Some(batch);
        self.search = SearchPhase::Polling { batch, tasks };
        self.dirty = true;
        true
    }

    pub(crate) fn reject_submit(&mut self) -> bool {
        if self.search != SearchPhase::Submitting {
            return false;
        }
        self.search = SearchPhase::Idle;
        self.dirty = true;
        true
    }

    pub(crate) fn is_current_batch(&self, batch: BatchId) -> bool {
        matches!(&self.search, SearchPhase::Polling { batch: current, .. } if *current == batch)
    }

    pub(crate) fn replace_tasks(&mut self, batch: BatchId, updated: Vec<ScrapeTask>) -> bool {
        match &mut self.search {
            SearchPhase::Polling { batch: current, tasks } if *current == batch => {
                *tasks = updated;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear_batch(&mut self) {
        self.search = SearchPhase::Idle;
        self.dirty = true;
    }

    pub(crate) fn is_listing_loading(&self) -> bool {
        self.listing_loading
    }

    pub(crate) fn set_listing_loading(&mut self, loading: bool) {
        self.listing_loading = loading;
        self.dirty = true;
    }

    pub(crate) fn replace_jobs(&mut self, mut jobs: Vec<JobListing>) {
        sort_listing(&mut jobs);
        self.jobs = jobs;
        self.listing_loading = false;
        self.dirty = true;
    }

    pub(crate) fn jobs_len(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) fn is_scoring(&self) -> bool {
        self.ats_score.is_loading()
    }

    pub(crate) fn is_suggesting(&self) -> bool {
        self.suggestions.is_loading()
    }

    pub(crate) fn ats_score_mut(&mut self) -> &mut Remote<AtsResult> {
        self.dirty = true;
        &mut self.ats_score
    }

    pub(crate) fn suggestions_mut(&mut self) -> &mut Remote<Vec<Suggestion>> {
        self.dirty = true;
        &mut self.suggestions
    }

    pub(crate) fn resumes_mut(&mut self) -> &mut Remote<Vec<ResumeRecord>> {
        self.dirty = true;
        &mut self.resumes
    }

    pub(crate) fn profile_mut(&mut self) -> &mut Remote<Profile> {
        self.dirty = true;
        &mut self.profile
    }

    pub(crate) fn draft_mut(&mut self) -> Option<&mut Profile> {
        self.dirty = true;
        self.draft.as_mut()
    }

    pub(crate) fn is_edit_rejected(&self) -> bool {
        self.edit_rejected
    }

    pub(crate) fn set_edit_rejected(&mut self, rejected: bool) {
        self.edit_rejected = rejected;
    }

    /// Stored profile and draft both become `profile`.
    pub(crate) fn accept_profile(&mut self, profile: Profile) {
        self.edit_rejected = false;
        self.draft = Some(profile.clone());
        self.profile = Remote::Ready(profile);
        self.profile_saving = false;
        self.dirty = true;
    }

    pub(crate) fn is_profile_saving(&self) -> bool {
        self.profile_saving
    }

    pub(crate) fn set_profile_saving(&mut self, saving: bool) {
        self.profile_saving = saving;
        self.dirty = true;
    }

    pub(crate) fn is_resume_uploading(&self) -> bool {
        self.resume_uploading
    }

    pub(crate) fn set_resume_uploading(&mut self, uploading: bool) {
        self.resume_uploading = uploading;
        self.dirty = true;
    }

    pub(crate) fn is_auth_pending(&self) -> bool {
        self.auth_pending
    }

    pub(crate) fn set_auth_pending(&mut self, pending: bool) {
        self.auth_pending = pending;
        self.dirty = true;
    }

    pub(crate) fn set_session_user(&mut self, user: Option<SessionUser>) {
        self.session_user = user;
        self.dirty = true;
    }

    /// Drops everything that belongs to the signed-in user.
    pub(crate) fn clear_user_data(&mut self) {
        self.session_user = None;
        self.profile = Remote::Idle;
        self.draft = None;
        self.edit_rejected = false;
        self.resumes = Remote::Idle;
        self.ats_score = Remote::Idle;
        self.suggestions = Remote::Idle;
        self.jobs.clear();
        self.dirty = true;
    }
}
