use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use scout_core::{Profile, SearchQuery, SignInMode};
use scout_logging::{scout_debug, scout_info};
use thiserror::Error;

use crate::api::{ApiSettings, JobApi, ReqwestJobApi};
use crate::listing::ListingAggregator;
use crate::orchestrator::{ChannelEventSink, EventSink, PollSettings, ScrapeOrchestrator};
use crate::resume::ResumeUploader;
use crate::{ApiError, EngineEvent};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub api: ApiSettings,
    pub poll: PollSettings,
    /// Cookie restored from the session file.
    pub cookie: Option<String>,
    /// Report Ctrl-C as [`EngineEvent::Interrupted`].
    pub watch_interrupts: bool,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend client: {0}")]
    Api(#[from] ApiError),
    #[error("tokio runtime: {0}")]
    Runtime(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Submit { query: SearchQuery },
    CancelScrape,
    FetchListing,
    FetchAtsScore,
    ScoreResume { job_description: String },
    FetchSuggestions,
    GenerateSuggestions,
    FetchProfile,
    SaveProfile { profile: Profile },
    FetchResumes,
    UploadResume {
        path: PathBuf,
        last_fingerprint: Option<String>,
    },
    SignIn { id_token: String, mode: SignInMode },
    SignOut,
    Teardown,
}

/// Runs backend IO on its own thread; commands in, events out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let api = Arc::new(ReqwestJobApi::new(&settings.api)?.with_cookie(settings.cookie));
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
            let dyn_api: Arc<dyn JobApi> = api;
            let mut orchestrator =
                ScrapeOrchestrator::new(dyn_api.clone(), settings.poll, sink.clone());
            let requests = Arc::new(Requests {
                listing: ListingAggregator::new(dyn_api.clone()),
                uploader: ResumeUploader::new(dyn_api.clone()),
                api: dyn_api,
                sink: sink.clone(),
            });

            if settings.watch_interrupts {
                let sink = sink.clone();
                runtime.spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        sink.emit(EngineEvent::Interrupted);
                    }
                });
            }

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit { query } => {
                        let submitted = runtime
                            .block_on(orchestrator.submit(query.role_keywords(), query.location()));
                        if let Err(error) = submitted {
                            sink.emit(EngineEvent::BatchCreationFailed { error });
                        }
                    }
                    EngineCommand::CancelScrape => orchestrator.cancel(),
                    EngineCommand::Teardown => orchestrator.teardown(),
                    other => {
                        let requests = requests.clone();
                        runtime.spawn(async move {
                            requests.handle(other).await;
                        });
                    }
                }
            }
            orchestrator.teardown();
            scout_debug!("Engine thread exiting");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// One-shot backend requests that do not touch the scrape batch.
struct Requests {
    api: Arc<dyn JobApi>,
    listing: ListingAggregator,
    uploader: ResumeUploader,
    sink: Arc<dyn EventSink>,
}

impl Requests {
    async fn handle(&self, command: EngineCommand) {
        let event = match command {
            EngineCommand::FetchListing => EngineEvent::ListingFetched(self.listing.fetch().await),
            EngineCommand::FetchAtsScore => EngineEvent::AtsScoreLoaded(self.api.ats_score().await),
            EngineCommand::ScoreResume { job_description } => EngineEvent::AtsScoreLoaded(
                self.api.score_resume(&job_description).await.map(Some),
            ),
            EngineCommand::FetchSuggestions => {
                EngineEvent::SuggestionsLoaded(self.api.suggestions().await)
            }
            EngineCommand::GenerateSuggestions => {
                EngineEvent::SuggestionsLoaded(self.api.suggest().await.map(Some))
            }
            EngineCommand::FetchProfile => EngineEvent::ProfileLoaded(self.api.me().await),
            EngineCommand::SaveProfile { profile } => {
                EngineEvent::ProfileSaved(self.api.update_profile(&profile).await)
            }
            EngineCommand::FetchResumes => EngineEvent::ResumesLoaded(self.api.resumes().await),
            EngineCommand::UploadResume {
                path,
                last_fingerprint,
            } => EngineEvent::ResumeUploaded(
                self.uploader
                    .upload(&path, last_fingerprint.as_deref())
                    .await,
            ),
            EngineCommand::SignIn { id_token, mode } => {
                scout_info!("Signing in ({})", mode.label());
                let grant = match mode {
                    SignInMode::Login => self.api.login(&id_token).await,
                    SignInMode::Signup => self.api.signup(&id_token).await,
                };
                EngineEvent::SignedIn(grant)
            }
            EngineCommand::SignOut => EngineEvent::SignedOut {
                remote: self.api.logout().await,
            },
            EngineCommand::Submit { .. }
            | EngineCommand::CancelScrape
            | EngineCommand::Teardown => {
                return;
            }
        };
        self.sink.emit(event);
    }
}
