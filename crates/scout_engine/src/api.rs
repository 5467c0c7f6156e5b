use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Method, RequestBuilder, Response};
use scout_core::{
    AtsResult, JobListing, Profile, ResumeRecord, ScrapeTask, SearchQuery, SessionUser,
    Suggestion, TaskId, TaskStatus,
};
use scout_logging::{scout_debug, scout_warn};
use serde_json::{json, Value};
use url::Url;

use crate::wire::{
    self, AuthData, CreateResponse, Envelope, StatusResponse, SuggestionsData, UploadData,
};
use crate::{ApiError, AuthGrant, FailureKind, UploadedResume};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Job-search backend, one method per endpoint.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    /// Create scrape tasks for a query. Errors carry a reason for the log.
    async fn create_scrape_batch(&self, query: &SearchQuery) -> Result<Vec<ScrapeTask>, ApiError>;
    async fn scrape_status(&self, task: &TaskId) -> Result<TaskStatus, ApiError>;
    /// Raw buckets of `/jobs/all`, keyed by source.
    async fn all_jobs(&self) -> Result<Vec<(String, Vec<JobListing>)>, ApiError>;
    async fn me(&self) -> Result<Profile, ApiError>;
    async fn create_profile(&self) -> Result<Option<Profile>, ApiError>;
    async fn update_profile(&self, profile: &Profile) -> Result<Profile, ApiError>;
    async fn upload_resume(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedResume, ApiError>;
    async fn parse_resume(&self) -> Result<(), ApiError>;
    async fn resumes(&self) -> Result<Vec<ResumeRecord>, ApiError>;
    /// Stored score; `None` when the backend has none yet.
    async fn ats_score(&self) -> Result<Option<AtsResult>, ApiError>;
    async fn score_resume(&self, job_description: &str) -> Result<AtsResult, ApiError>;
    async fn suggestions(&self) -> Result<Option<Vec<Suggestion>>, ApiError>;
    async fn suggest(&self) -> Result<Vec<Suggestion>, ApiError>;
    async fn login(&self, id_token: &str) -> Result<AuthGrant, ApiError>;
    async fn signup(&self, id_token: &str) -> Result<AuthGrant, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
}

/// Keeps the session cookie: set on login or signup, cleared on logout.
#[derive(Debug)]
pub struct ReqwestJobApi {
    base_url: Url,
    client: reqwest::Client,
    cookie: RwLock<Option<String>>,
}

impl ReqwestJobApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base_url,
            client,
            cookie: RwLock::new(None),
        })
    }

    /// Attach the session cookie to every request.
    pub fn with_cookie(self, cookie: Option<String>) -> Self {
        self.set_cookie(cookie);
        self
    }

    pub fn set_cookie(&self, cookie: Option<String>) {
        *self.cookie.write().unwrap_or_else(PoisonError::into_inner) = cookie;
    }

    pub fn cookie(&self) -> Option<String> {
        self.cookie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.request_url(method, self.endpoint(path)?))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        scout_debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.cookie() {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = wire::error_message(&body).unwrap_or_else(|| status.to_string());
        Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message))
    }

    async fn json(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = self.send(builder).await?;
        response.json::<Value>().await.map_err(map_reqwest_error)
    }

    async fn envelope(&self, builder: RequestBuilder) -> Result<Envelope, ApiError> {
        wire::decode(self.json(builder).await?)
    }

    /// Data of a successful envelope, which must be present.
    async fn data<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        match self.envelope(builder).await?.into_data()? {
            Some(data) => wire::decode(data),
            None => Err(ApiError::new(FailureKind::Decode, "response has no data")),
        }
    }

    /// `success: false` means "nothing stored yet" for the read-only ATS endpoints.
    async fn optional_data<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let envelope = self.envelope(builder).await?;
        if !envelope.success {
            return Ok(None);
        }
        match envelope.data {
            None | Some(Value::Null) => Ok(None),
            Some(data) => wire::decode(data).map(Some),
        }
    }

    async fn authenticate(&self, path: &str, id_token: &str) -> Result<AuthGrant, ApiError> {
        let builder = self
            .request(Method::POST, path)?
            .json(&json!({ "token": id_token }));
        let response = self.send(builder).await?;
        let cookie = session_cookie(&response);
        let envelope: Envelope = response
            .json::<Value>()
            .await
            .map_err(map_reqwest_error)
            .and_then(wire::decode)?;
        let data = envelope
            .into_data()?
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "response has no user"))?;
        let user: AuthData = wire::decode(data)?;
        match &cookie {
            Some(cookie) => self.set_cookie(Some(cookie.clone())),
            None => scout_warn!("{} succeeded without setting a session cookie", path),
        }
        Ok(AuthGrant {
            user: SessionUser {
                uid: user.uid,
                email: user.email,
                provider: user.provider,
            },
            cookie,
        })
    }
}

/// `name=value` pairs of every `Set-Cookie` header, joined for a `Cookie` header.
fn session_cookie(response: &Response) -> Option<String> {
    let pairs: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();
    (!pairs.is_empty()).then(|| pairs.join("; "))
}

#[async_trait::async_trait]
impl JobApi for ReqwestJobApi {
    async fn create_scrape_batch(&self, query: &SearchQuery) -> Result<Vec<ScrapeTask>, ApiError> {
        let builder = self.request(Method::POST, "tasks/scrape")?.json(&json!({
            "jobRole": query.role_keywords(),
            "location": query.location(),
        }));
        let response: CreateResponse = wire::decode(self.json(builder).await?)?;
        wire::tasks_from_descriptors(response.into_descriptors())
            .map_err(|reason| ApiError::new(FailureKind::Rejected, reason))
    }

    async fn scrape_status(&self, task: &TaskId) -> Result<TaskStatus, ApiError> {
        let mut url = self.endpoint("tasks/scrape/status/")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url cannot have segments"))?
            .pop_if_empty()
            .push(task.as_str());
        let builder = self.request_url(Method::GET, url);
        let response: StatusResponse = wire::decode(self.json(builder).await?)?;
        Ok(wire::map_task_status(&response.status))
    }

    async fn all_jobs(&self) -> Result<Vec<(String, Vec<JobListing>)>, ApiError> {
        let envelope = self.envelope(self.request(Method::GET, "jobs/all")?).await?;
        wire::job_buckets(envelope.into_data()?)
    }

    async fn me(&self) -> Result<Profile, ApiError> {
        self.data(self.request(Method::GET, "profiles/me")?).await
    }

    async fn create_profile(&self) -> Result<Option<Profile>, ApiError> {
        let envelope = self.envelope(self.request(Method::POST, "profiles/create")?).await?;
        match envelope.into_data()? {
            None | Some(Value::Null) => Ok(None),
            Some(data) => wire::decode(data).map(Some),
        }
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, ApiError> {
        let builder = self.request(Method::PUT, "profiles/update")?.json(profile);
        self.data(builder).await
    }

    async fn upload_resume(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedResume, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self.request(Method::POST, "resume/upload")?.multipart(form);
        let data: UploadData = self.data(builder).await?;
        Ok(UploadedResume {
            id: data.id,
            file_url: data.file_url,
        })
    }

    async fn parse_resume(&self) -> Result<(), ApiError> {
        let envelope = self.envelope(self.request(Method::POST, "resume/parse")?).await?;
        envelope.into_data().map(|_| ())
    }

    async fn resumes(&self) -> Result<Vec<ResumeRecord>, ApiError> {
        let envelope = self.envelope(self.request(Method::GET, "resume/resumes")?).await?;
        match envelope.into_data()? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => wire::decode(data),
        }
    }

    async fn ats_score(&self) -> Result<Option<AtsResult>, ApiError> {
        self.optional_data(self.request(Method::GET, "ats/score")?).await
    }

    async fn score_resume(&self, job_description: &str) -> Result<AtsResult, ApiError> {
        let builder = self
            .request(Method::POST, "ats/score")?
            .json(&json!({ "job_description": job_description }));
        self.data(builder).await
    }

    async fn suggestions(&self) -> Result<Option<Vec<Suggestion>>, ApiError> {
        let data: Option<SuggestionsData> =
            self.optional_data(self.request(Method::GET, "ats/suggest")?).await?;
        Ok(data.map(|data| data.suggestions))
    }

    async fn suggest(&self) -> Result<Vec<Suggestion>, ApiError> {
        let data: SuggestionsData = self.data(self.request(Method::POST, "ats/suggest")?).await?;
        Ok(data.suggestions)
    }

    async fn login(&self, id_token: &str) -> Result<AuthGrant, ApiError> {
        self.authenticate("auth/login", id_token).await
    }

    async fn signup(&self, id_token: &str) -> Result<AuthGrant, ApiError> {
        self.authenticate("auth/signup", id_token).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "auth/logout")?;
        // The local cookie goes regardless of what the backend says.
        self.set_cookie(None);
        let envelope = self.envelope(builder).await?;
        envelope.into_data().map(|_| ())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let api = ReqwestJobApi::new(&ApiSettings {
            base_url: "http://localhost:8000/api".to_string(),
            ..ApiSettings::default()
        })
        .unwrap();
        assert_eq!(
            api.endpoint("jobs/all").unwrap().as_str(),
            "http://localhost:8000/api/jobs/all"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ReqwestJobApi::new(&ApiSettings {
            base_url: "not a url".to_string(),
            ..ApiSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
