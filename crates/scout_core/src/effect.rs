use std::path::PathBuf;

use crate::{Profile, SearchQuery, SignInMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartScrape { query: SearchQuery },
    CancelScrape,
    FetchListing,
    FetchAtsScore,
    ScoreResume { job_description: String },
    FetchSuggestions,
    GenerateSuggestions,
    FetchProfile,
    SaveProfile { profile: Profile },
    FetchResumes,
    UploadResume { path: PathBuf },
    SignIn { id_token: String, mode: SignInMode },
    SignOut,
}
