use crate::profile::apply_edit;
use crate::state::{Remote, SearchPhase};
use crate::validation::{validate_id_token, validate_job_description};
use crate::{AppState, Effect, Msg, SearchQuery, Severity, UploadReport};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    // Nothing reaches the state after teardown, including late engine results.
    if state.is_torn_down() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::RoleChanged(role) => {
            state.set_role(role);
            Vec::new()
        }
        Msg::LocationChanged(location) => {
            state.set_location(location);
            Vec::new()
        }
        Msg::SearchSubmitted => {
            if state.search_phase() != &SearchPhase::Idle {
                state.set_status(Severity::Info, "A search is already running.");
                return (state, Vec::new());
            }
            match SearchQuery::new(state.role_input(), state.location_input()) {
                Ok(query) => {
                    state.begin_submit();
                    state.set_status(Severity::Info, "Starting scrape...");
                    vec![Effect::StartScrape { query }]
                }
                Err(err) => {
                    state.set_status(Severity::Error, err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::BatchStarted { batch, tasks } => {
            let count = tasks.len();
            if state.start_batch(batch, tasks) {
                state.set_status(
                    Severity::Info,
                    format!("Scraping in progress ({count} tasks)..."),
                );
            }
            Vec::new()
        }
        Msg::BatchRejected { message } => {
            if state.reject_submit() {
                state.set_status(Severity::Error, message);
            }
            Vec::new()
        }
        Msg::BatchProgress { batch, tasks } => {
            state.replace_tasks(batch, tasks);
            Vec::new()
        }
        Msg::BatchFinished { batch } => {
            if state.is_current_batch(batch) {
                state.clear_batch();
                // The engine refreshes the listing on its own after a finished batch.
                state.set_listing_loading(true);
                state.set_status(Severity::Info, "Scrape finished. Loading jobs...");
            }
            Vec::new()
        }
        Msg::BatchFailed { batch, message } => {
            if state.is_current_batch(batch) {
                state.clear_batch();
                state.set_status(Severity::Error, message);
            }
            Vec::new()
        }
        Msg::ListingRequested => {
            if state.is_listing_loading() {
                Vec::new()
            } else {
                state.set_listing_loading(true);
                vec![Effect::FetchListing]
            }
        }
        Msg::ListingLoaded(Ok(jobs)) => {
            state.replace_jobs(jobs);
            match state.jobs_len() {
                0 => state.set_status(Severity::Info, "No jobs found."),
                count => state.set_status(Severity::Info, format!("{count} jobs loaded.")),
            }
            Vec::new()
        }
        Msg::ListingLoaded(Err(message)) => {
            // Keep the last good listing on screen.
            state.set_listing_loading(false);
            state.set_status(Severity::Error, message);
            Vec::new()
        }
        Msg::AtsRequested => {
            *state.ats_score_mut() = Remote::Loading;
            *state.suggestions_mut() = Remote::Loading;
            vec![Effect::FetchAtsScore, Effect::FetchSuggestions]
        }
        Msg::JobDescriptionChanged(text) => {
            state.set_job_description(text);
            Vec::new()
        }
        Msg::ScoreRequested => match validate_job_description(state.job_description()) {
            Ok(job_description) => {
                if state.is_scoring() {
                    Vec::new()
                } else {
                    *state.ats_score_mut() = Remote::Loading;
                    vec![Effect::ScoreResume { job_description }]
                }
            }
            Err(err) => {
                state.set_status(Severity::Error, err.to_string());
                Vec::new()
            }
        },
        Msg::ScoreLoaded(result) => {
            let next = match result {
                Ok(Some(score)) => Remote::Ready(score),
                Ok(None) => Remote::Missing,
                Err(message) => {
                    state.set_status(Severity::Error, message.clone());
                    Remote::Failed(message)
                }
            };
            *state.ats_score_mut() = next;
            Vec::new()
        }
        Msg::SuggestRequested => {
            if state.is_suggesting() {
                Vec::new()
            } else {
                *state.suggestions_mut() = Remote::Loading;
                vec![Effect::GenerateSuggestions]
            }
        }
        Msg::SuggestionsLoaded(result) => {
            let next = match result {
                Ok(Some(suggestions)) => Remote::Ready(suggestions),
                Ok(None) => Remote::Missing,
                Err(message) => {
                    state.set_status(Severity::Error, message.clone());
                    Remote::Failed(message)
                }
            };
            *state.suggestions_mut() = next;
            Vec::new()
        }
        Msg::ProfileRequested => {
            *state.profile_mut() = Remote::Loading;
            vec![Effect::FetchProfile]
        }
        Msg::ProfileLoaded(Ok(profile)) => {
            state.accept_profile(profile);
            Vec::new()
        }
        Msg::ProfileLoaded(Err(message)) => {
            *state.profile_mut() = Remote::Failed(message.clone());
            state.set_status(Severity::Error, message);
            Vec::new()
        }
        Msg::ProfileEdited(edit) => {
            let outcome = match state.draft_mut() {
                Some(draft) => apply_edit(draft, &edit).map_err(|err| err.to_string()),
                None => Err("Profile is not loaded yet.".to_string()),
            };
            state.set_edit_rejected(outcome.is_err());
            if let Err(message) = outcome {
                state.set_status(Severity::Error, message);
            }
            Vec::new()
        }
        // The rejection message stays on screen.
        Msg::ProfileSaveRequested if state.is_edit_rejected() => Vec::new(),
        Msg::ProfileSaveRequested => match state.draft().cloned() {
            Some(profile) if !state.is_profile_saving() => {
                state.set_profile_saving(true);
                state.set_status(Severity::Info, "Saving profile...");
                vec![Effect::SaveProfile { profile }]
            }
            Some(_) => Vec::new(),
            None => {
                state.set_status(Severity::Error, "Profile is not loaded yet.");
                Vec::new()
            }
        },
        Msg::ProfileSaved(Ok(profile)) => {
            state.accept_profile(profile);
            state.set_status(Severity::Info, "Profile saved successfully.");
            Vec::new()
        }
        Msg::ProfileSaved(Err(message)) => {
            // The draft stays so the user can retry.
            state.set_profile_saving(false);
            state.set_status(Severity::Error, format!("Could not save profile: {message}"));
            Vec::new()
        }
        Msg::ResumesRequested => {
            *state.resumes_mut() = Remote::Loading;
            vec![Effect::FetchResumes]
        }
        Msg::ResumesLoaded(result) => {
            let next = match result {
                Ok(records) if records.is_empty() => Remote::Missing,
                Ok(records) => Remote::Ready(records),
                Err(message) => {
                    state.set_status(Severity::Error, message.clone());
                    Remote::Failed(message)
                }
            };
            *state.resumes_mut() = next;
            Vec::new()
        }
        Msg::ResumeUploadRequested { path } => {
            if state.is_resume_uploading() {
                Vec::new()
            } else {
                state.set_resume_uploading(true);
                state.set_status(Severity::Info, "Uploading résumé...");
                vec![Effect::UploadResume { path }]
            }
        }
        Msg::ResumeUploaded(Ok(UploadReport::Uploaded { profile })) => {
            state.set_resume_uploading(false);
            if let Some(profile) = profile {
                state.accept_profile(profile);
            }
            state.set_status(Severity::Info, "Résumé uploaded and parsed.");
            *state.resumes_mut() = Remote::Loading;
            vec![Effect::FetchResumes]
        }
        Msg::ResumeUploaded(Ok(UploadReport::Duplicate)) => {
            state.set_resume_uploading(false);
            state.set_status(Severity::Info, "File already uploaded, skipping.");
            Vec::new()
        }
        Msg::ResumeUploaded(Err(message)) => {
            state.set_resume_uploading(false);
            state.set_status(Severity::Error, message);
            Vec::new()
        }
        Msg::SignInRequested { id_token, mode } => {
            if state.is_auth_pending() {
                return (state, Vec::new());
            }
            match validate_id_token(&id_token) {
                Ok(id_token) => {
                    state.set_auth_pending(true);
                    vec![Effect::SignIn { id_token, mode }]
                }
                Err(err) => {
                    state.set_status(Severity::Error, err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::SignInCompleted(Ok(user)) => {
            state.set_auth_pending(false);
            let who = user.email.clone().unwrap_or_else(|| user.uid.clone());
            state.set_session_user(Some(user));
            state.set_status(Severity::Info, format!("Signed in as {who}."));
            Vec::new()
        }
        Msg::SignInCompleted(Err(message)) => {
            state.set_auth_pending(false);
            state.set_status(Severity::Error, message);
            Vec::new()
        }
        Msg::SessionRestored(user) => {
            state.set_session_user(user);
            Vec::new()
        }
        Msg::SignOutRequested => {
            if state.is_auth_pending() {
                return (state, Vec::new());
            }
            state.set_auth_pending(true);
            let mut effects = Vec::with_capacity(2);
            if state.search_phase() != &SearchPhase::Idle {
                state.clear_batch();
                effects.push(Effect::CancelScrape);
            }
            effects.push(Effect::SignOut);
            effects
        }
        Msg::SignedOut => {
            state.set_auth_pending(false);
            state.clear_user_data();
            state.set_status(Severity::Info, "Signed out.");
            Vec::new()
        }
        Msg::Teardown => {
            let active = state.search_phase() != &SearchPhase::Idle;
            state.tear_down();
            if active {
                vec![Effect::CancelScrape]
            } else {
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
