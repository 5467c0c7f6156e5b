//! Backend JSON shapes and their conversion into domain types.
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scout_core::{JobListing, JobSource, ScrapeTask, TaskStatus};
use scout_logging::scout_warn;
use serde::Deserialize;
use serde_json::Value;

use crate::{ApiError, FailureKind};

/// `{ status, message, success, data? }` wrapper used by most endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
}

fn default_success() -> bool {
    true
}

impl Envelope {
    /// Data of a successful envelope; `success: false` becomes `Rejected`.
    pub fn into_data(self) -> Result<Option<Value>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::new(
                FailureKind::Rejected,
                self.message.unwrap_or_default(),
            ))
        }
    }
}

/// Message carried in an error body, either ours (`message`) or the
/// framework's (`detail`).
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TaskDescriptor {
    #[serde(default)]
    pub jobid: Option<String>,
    #[serde(default)]
    pub spider: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The create endpoint answers with a batch, or with a single descriptor.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CreateResponse {
    Many(Vec<TaskDescriptor>),
    One(TaskDescriptor),
}

impl CreateResponse {
    pub fn into_descriptors(self) -> Vec<TaskDescriptor> {
        match self {
            CreateResponse::Many(all) => all,
            CreateResponse::One(one) => vec![one],
        }
    }
}

/// Turn descriptors into pending tasks. Any descriptor without an id, or
/// reported as failed, rejects the whole batch.
pub(crate) fn tasks_from_descriptors(
    descriptors: Vec<TaskDescriptor>,
) -> Result<Vec<ScrapeTask>, String> {
    if descriptors.is_empty() {
        return Err("backend returned an empty batch".to_string());
    }
    descriptors
        .into_iter()
        .map(|descriptor| {
            let spider = descriptor
                .spider
                .filter(|spider| !spider.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            if descriptor.status.as_deref() == Some("failed") {
                return Err(format!("spider {spider} could not be scheduled"));
            }
            match descriptor.jobid.filter(|id| !id.trim().is_empty()) {
                Some(id) => Ok(ScrapeTask::pending(id, spider)),
                None => Err(format!("spider {spider} returned no job id")),
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: String,
}

/// Scheduler status names to task status.
pub(crate) fn map_task_status(raw: &str) -> TaskStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" | "scheduled" | "running" => TaskStatus::Pending,
        "finished" => TaskStatus::Finished,
        "failed" | "error" => TaskStatus::Failed,
        "not_found" => TaskStatus::NotFound,
        other => {
            scout_warn!("Unknown scrape status {:?}; treating as pending", other);
            TaskStatus::Pending
        }
    }
}

/// A `null` bucket, or `jobs: null`, counts as empty.
#[derive(Debug, Deserialize)]
struct JobsDocument {
    #[serde(default)]
    jobs: Option<BTreeMap<String, Option<Vec<RawJob>>>>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default, alias = "_id")]
    id: Option<Value>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    salary: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    published: Option<String>,
}

/// Buckets from the `/jobs/all` data payload. `null`, `[]`, or a document
/// without `jobs` all mean no buckets.
pub(crate) fn job_buckets(
    data: Option<Value>,
) -> Result<Vec<(String, Vec<JobListing>)>, ApiError> {
    let document = match data {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) if items.is_empty() => return Ok(Vec::new()),
        Some(value) => decode::<JobsDocument>(value)?,
    };
    Ok(document
        .jobs
        .unwrap_or_default()
        .into_iter()
        .map(|(key, raw)| {
            let jobs = raw
                .unwrap_or_default()
                .into_iter()
                .map(|job| job.into_listing(&key))
                .collect();
            (key, jobs)
        })
        .collect())
}

impl RawJob {
    fn into_listing(self, bucket: &str) -> JobListing {
        let source = JobSource::parse(self.source.as_deref().unwrap_or(bucket));
        let id = match self.id {
            Some(Value::String(id)) => id,
            Some(Value::Object(map)) => map
                .get("$oid")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.url.clone()),
            Some(other) if !other.is_null() => other.to_string(),
            _ => self.url.clone(),
        };
        JobListing {
            id,
            source,
            title: self.title,
            company: self.company,
            location: self.location,
            salary: self.salary.filter(|salary| !salary.trim().is_empty()),
            url: self.url,
            published: self.published.as_deref().and_then(parse_published),
        }
    }
}

/// RFC 3339, a naive timestamp, or a plain `YYYY-MM-DD` date.
pub(crate) fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionsData {
    #[serde(default)]
    pub suggestions: Vec<scout_core::Suggestion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthData {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub file_url: String,
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn status_names_map_to_task_status() {
        assert_eq!(map_task_status("scheduled"), TaskStatus::Pending);
        assert_eq!(map_task_status("running"), TaskStatus::Pending);
        assert_eq!(map_task_status("Finished"), TaskStatus::Finished);
        assert_eq!(map_task_status("error"), TaskStatus::Failed);
        assert_eq!(map_task_status("not_found"), TaskStatus::NotFound);
        assert_eq!(map_task_status("queued-somewhere"), TaskStatus::Pending);
    }

    #[test]
    fn single_descriptor_is_a_one_task_batch() {
        let response: CreateResponse =
            serde_json::from_value(json!({"jobid": "abc", "status": "scheduled"})).unwrap();
        let tasks = tasks_from_descriptors(response.into_descriptors()).unwrap();
        assert_eq!(tasks, vec![ScrapeTask::pending("abc", "unknown")]);
    }

    #[test]
    fn failed_descriptor_rejects_batch() {
        let response: CreateResponse = serde_json::from_value(json!([
            {"jobid": "a", "spider": "linkedin_jobs", "status": "scheduled"},
            {"jobid": null, "spider": "internshala_jobs", "status": "failed"}
        ]))
        .unwrap();
        assert!(tasks_from_descriptors(response.into_descriptors()).is_err());
        assert!(tasks_from_descriptors(Vec::new()).is_err());
    }

    #[test]
    fn empty_array_data_means_no_buckets() {
        assert!(job_buckets(Some(json!([]))).unwrap().is_empty());
        assert!(job_buckets(None).unwrap().is_empty());
        assert!(job_buckets(Some(json!({"user_id": "u1"}))).unwrap().is_empty());
    }

    #[test]
    fn null_buckets_decode_as_empty() {
        let buckets = job_buckets(Some(json!({
            "jobs": {"linkedin": [{"title": "A", "url": "https://l/1"}], "internshala": null}
        })))
        .unwrap();
        let sizes: Vec<_> = buckets
            .iter()
            .map(|(key, jobs)| (key.as_str(), jobs.len()))
            .collect();
        assert_eq!(sizes, vec![("internshala", 0), ("linkedin", 1)]);
        assert!(job_buckets(Some(json!({"jobs": null}))).unwrap().is_empty());
    }

    #[test]
    fn raw_jobs_fall_back_to_bucket_and_url() {
        let buckets = job_buckets(Some(json!({
            "jobs": {
                "linkedin": [{
                    "title": "Engineer",
                    "company": "Acme",
                    "location": "NYC",
                    "url": "https://example.com/1"
                }]
            }
        })))
        .unwrap();
        let (key, jobs) = &buckets[0];
        assert_eq!(key, "linkedin");
        assert_eq!(jobs[0].id, "https://example.com/1");
        assert_eq!(jobs[0].source, JobSource::Linkedin);
        assert_eq!(jobs[0].published, None);
    }

    #[test]
    fn published_accepts_common_formats() {
        let date = parse_published("2025-03-04").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 3, 4));
        let stamp = parse_published("2025-03-04T10:30:00Z").unwrap();
        assert_eq!(stamp.hour(), 10);
        assert!(parse_published("2025-03-04T10:30:00.123").is_some());
        assert_eq!(parse_published("3 days ago"), None);
    }

    #[test]
    fn rejected_envelope_keeps_message() {
        let envelope: Envelope =
            serde_json::from_value(json!({"status": 404, "success": false, "message": "nope"}))
                .unwrap();
        let err = envelope.into_data().unwrap_err();
        assert_eq!(err.kind, FailureKind::Rejected);
        assert_eq!(err.message, "nope");
    }

    #[test]
    fn error_body_message_or_detail() {
        assert_eq!(
            error_message(r#"{"detail":"Not authenticated"}"#).as_deref(),
            Some("Not authenticated")
        );
        assert_eq!(error_message("<html>"), None);
    }
}
