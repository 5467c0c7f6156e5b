use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier the backend assigns to a scrape task.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for compact progress rows.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generation number of a scrape batch. Results carrying an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Finished,
    Failed,
    NotFound,
}

impl TaskStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::NotFound)
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Finished => "finished",
            TaskStatus::Failed => "failed",
            TaskStatus::NotFound => "not_found",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTask {
    pub id: TaskId,
    pub spider: String,
    pub status: TaskStatus,
}

impl ScrapeTask {
    pub fn pending(id: impl Into<String>, spider: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(id),
            spider: spider.into(),
            status: TaskStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobSource {
    Linkedin,
    Internshala,
    Other(String),
}

impl JobSource {
    /// Case-insensitive: the scrapers write `LinkedIn` while buckets are keyed `linkedin`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("linkedin") {
            JobSource::Linkedin
        } else if trimmed.eq_ignore_ascii_case("internshala") {
            JobSource::Internshala
        } else {
            JobSource::Other(trimmed.to_ascii_lowercase())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            JobSource::Linkedin => "LinkedIn",
            JobSource::Internshala => "Internshala",
            JobSource::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobListing {
    pub id: String,
    pub source: JobSource,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub url: String,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsResult {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub improve: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
}

/// User profile as stored by the backend.
///
/// Fields the client does not edit are carried in `extra` so that an update
/// sends back everything the backend returned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub firebase_uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub github_link: Option<String>,
    #[serde(default)]
    pub linkedin_link: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub experience: Vec<serde_json::Value>,
    #[serde(default)]
    pub projects: Vec<serde_json::Value>,
    #[serde(default)]
    pub certifications: Vec<serde_json::Value>,
    #[serde(default)]
    pub education: Vec<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub parsed: bool,
    #[serde(default)]
    pub parsed_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMode {
    Login,
    Signup,
}

impl SignInMode {
    pub fn label(self) -> &'static str {
        match self {
            SignInMode::Login => "login",
            SignInMode::Signup => "signup",
        }
    }
}
