use std::time::Duration;

use scout_core::{Effect, Msg, UploadReport};
use scout_engine::{EngineCommand, EngineEvent, EngineHandle, Session, SessionEvent, UploadOutcome};
use scout_logging::{scout_error, scout_info, scout_warn};

use super::config::AppConfig;

/// What the engine reported, as seen by the dispatch loop.
#[derive(Debug)]
pub enum Inbound {
    Msg(Msg),
    Interrupted,
}

/// Runs core effects on the engine and turns engine events back into messages.
///
/// Owns the [`Session`]; sign-in, sign-out and résumé uploads are persisted
/// here before the matching message reaches the core.
pub struct EffectRunner {
    engine: EngineHandle,
    session: Session,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, session: Session) -> anyhow::Result<Self> {
        let cookie = session.cookie().map(str::to_string);
        let engine = EngineHandle::new(config.engine_settings(cookie))?;
        Ok(Self { engine, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let command = to_command(effect, self.session.resume_fingerprint());
            self.engine.send(command);
        }
    }

    /// Stop all polling for good. Late results are dropped by the engine.
    pub fn teardown(&self) {
        self.engine.send(EngineCommand::Teardown);
    }

    pub fn next(&mut self, timeout: Duration) -> Option<Inbound> {
        let event = self.engine.recv_timeout(timeout)?;
        Some(match event {
            EngineEvent::Interrupted => Inbound::Interrupted,
            other => Inbound::Msg(self.to_msg(other)),
        })
    }

    fn to_msg(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::BatchStarted { batch, tasks } => Msg::BatchStarted { batch, tasks },
            EngineEvent::BatchCreationFailed { error } => {
                scout_warn!("Search not started: {}", error);
                Msg::BatchRejected {
                    message: error.user_message(),
                }
            }
            EngineEvent::BatchProgress { batch, tasks } => Msg::BatchProgress { batch, tasks },
            EngineEvent::BatchFinished { batch } => Msg::BatchFinished { batch },
            EngineEvent::BatchFailed { batch, error } => {
                scout_warn!("{} failed: {}", batch, error);
                Msg::BatchFailed {
                    batch,
                    message: error.user_message(),
                }
            }
            EngineEvent::ListingFetched(result) => Msg::ListingLoaded(
                result
                    .map(|listing| listing.into_jobs())
                    .map_err(|err| err.user_message()),
            ),
            EngineEvent::AtsScoreLoaded(result) => {
                Msg::ScoreLoaded(result.map_err(|err| err.to_string()))
            }
            EngineEvent::SuggestionsLoaded(result) => {
                Msg::SuggestionsLoaded(result.map_err(|err| err.to_string()))
            }
            EngineEvent::ProfileLoaded(result) => {
                Msg::ProfileLoaded(result.map_err(|err| err.to_string()))
            }
            EngineEvent::ProfileSaved(result) => {
                Msg::ProfileSaved(result.map_err(|err| err.to_string()))
            }
            EngineEvent::ResumesLoaded(result) => {
                Msg::ResumesLoaded(result.map_err(|err| err.to_string()))
            }
            EngineEvent::ResumeUploaded(result) => {
                let report = match result {
                    Ok(UploadOutcome::Uploaded {
                        profile,
                        fingerprint,
                    }) => {
                        self.record(SessionEvent::ResumeUploaded { fingerprint });
                        Ok(UploadReport::Uploaded { profile })
                    }
                    Ok(UploadOutcome::Duplicate) => Ok(UploadReport::Duplicate),
                    Err(err) => Err(err.to_string()),
                };
                Msg::ResumeUploaded(report)
            }
            EngineEvent::SignedIn(result) => match result {
                Ok(grant) => {
                    let user = grant.user.clone();
                    self.record(SessionEvent::SignedIn(grant));
                    Msg::SignInCompleted(Ok(user))
                }
                Err(err) => Msg::SignInCompleted(Err(err.to_string())),
            },
            EngineEvent::SignedOut { remote } => {
                if let Err(err) = remote {
                    scout_warn!("Backend logout failed, signing out locally: {}", err);
                }
                if let Err(err) = self.session.teardown() {
                    scout_error!("{}", err);
                }
                scout_info!("Session cleared");
                Msg::SignedOut
            }
            // Handled in `next`.
            EngineEvent::Interrupted => Msg::Teardown,
        }
    }

    fn record(&mut self, event: SessionEvent) {
        if let Err(err) = self.session.update(event) {
            scout_error!("{}", err);
        }
    }
}

fn to_command(effect: Effect, last_fingerprint: Option<&str>) -> EngineCommand {
    match effect {
        Effect::StartScrape { query } => EngineCommand::Submit { query },
        Effect::CancelScrape => EngineCommand::CancelScrape,
        Effect::FetchListing => EngineCommand::FetchListing,
        Effect::FetchAtsScore => EngineCommand::FetchAtsScore,
        Effect::ScoreResume { job_description } => EngineCommand::ScoreResume { job_description },
        Effect::FetchSuggestions => EngineCommand::FetchSuggestions,
        Effect::GenerateSuggestions => EngineCommand::GenerateSuggestions,
        Effect::FetchProfile => EngineCommand::FetchProfile,
        Effect::SaveProfile { profile } => EngineCommand::SaveProfile { profile },
        Effect::FetchResumes => EngineCommand::FetchResumes,
        Effect::UploadResume { path } => EngineCommand::UploadResume {
            path,
            last_fingerprint: last_fingerprint.map(str::to_string),
        },
        Effect::SignIn { id_token, mode } => EngineCommand::SignIn { id_token, mode },
        Effect::SignOut => EngineCommand::SignOut,
    }
}
