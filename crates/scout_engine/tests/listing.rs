use std::sync::Arc;

use pretty_assertions::assert_eq;
use scout_core::JobSource;
use scout_engine::{
    ApiSettings, FetchedListing, ListingAggregator, OrchestratorError, ReqwestJobApi,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn aggregator(server: &MockServer) -> ListingAggregator {
    let api = ReqwestJobApi::new(&ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .unwrap();
    ListingAggregator::new(Arc::new(api))
}

async fn mount_jobs(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/jobs/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn missing_bucket_is_treated_as_empty() {
    let server = MockServer::start().await;
    mount_jobs(
        &server,
        json!({"success": true, "data": {"jobs": {"linkedin": [
            {"title": "A", "company": "Acme", "location": "NYC",
             "url": "https://l/1", "source": "LinkedIn"},
            {"title": "B", "company": "Beta", "location": "SF",
             "url": "https://l/2", "source": "LinkedIn"}
        ]}}}),
    )
    .await;

    let jobs = aggregator(&server).fetch().await.unwrap().into_jobs();
    let titles: Vec<_> = jobs.iter().map(|job| job.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert!(jobs.iter().all(|job| job.source == JobSource::Linkedin));
}

#[tokio::test]
async fn null_bucket_is_treated_as_empty() {
    let server = MockServer::start().await;
    mount_jobs(
        &server,
        json!({"success": true, "data": {"jobs": {
            "linkedin": [
                {"title": "A", "company": "Acme", "location": "NYC",
                 "url": "https://l/1", "source": "LinkedIn"}
            ],
            "internshala": null
        }}}),
    )
    .await;

    let jobs = aggregator(&server).fetch().await.unwrap().into_jobs();
    let titles: Vec<_> = jobs.iter().map(|job| job.title.as_str()).collect();
    assert_eq!(titles, vec!["A"]);
}

#[tokio::test]
async fn null_jobs_document_is_an_empty_notice() {
    let server = MockServer::start().await;
    mount_jobs(
        &server,
        json!({"success": true, "data": {"_id": "doc", "user_id": "u1", "jobs": null}}),
    )
    .await;

    assert_eq!(aggregator(&server).fetch().await.unwrap(), FetchedListing::Empty);
}

#[tokio::test]
async fn buckets_merge_newest_first() {
    let server = MockServer::start().await;
    mount_jobs(
        &server,
        json!({"success": true, "data": {"_id": "doc", "user_id": "u1", "jobs": {
            "linkedin": [
                {"title": "undated", "url": "https://l/1"},
                {"title": "linkedin-new", "url": "https://l/2", "published": "2025-03-10T08:00:00Z"}
            ],
            "internshala": [
                {"title": "internshala-old", "url": "https://i/1", "published": "2025-01-02"}
            ]
        }}}),
    )
    .await;

    let aggregator = aggregator(&server);
    let first = aggregator.fetch().await.unwrap();
    let titles: Vec<_> = first
        .clone()
        .into_jobs()
        .into_iter()
        .map(|job| job.title)
        .collect();
    assert_eq!(titles, vec!["linkedin-new", "internshala-old", "undated"]);

    let second = aggregator.fetch().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn no_jobs_is_an_empty_notice() {
    let server = MockServer::start().await;
    mount_jobs(
        &server,
        json!({"status": 200, "success": true, "message": "No jobs found", "data": []}),
    )
    .await;

    assert_eq!(aggregator(&server).fetch().await.unwrap(), FetchedListing::Empty);
}

#[tokio::test]
async fn backend_failure_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/all"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = aggregator(&server).fetch().await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Fetch(_)));
    assert_eq!(err.user_message(), "Failed to fetch jobs.");
}
