use std::sync::Once;

use pretty_assertions::assert_eq;
use scout_core::{
    update, AppState, BatchId, Effect, Msg, ScrapeTask, SearchPhase, SearchQuery, Severity,
    TaskStatus,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scout_logging::initialize_for_tests);
}

fn with_inputs(role: &str, location: &str) -> AppState {
    let (state, _) = update(AppState::new(), Msg::RoleChanged(role.to_string()));
    let (state, _) = update(state, Msg::LocationChanged(location.to_string()));
    state
}

fn submitted() -> AppState {
    let (state, effects) = update(with_inputs("Engineer", "NYC"), Msg::SearchSubmitted);
    assert_eq!(effects.len(), 1);
    state
}

fn two_tasks(first: TaskStatus, second: TaskStatus) -> Vec<ScrapeTask> {
    vec![
        ScrapeTask {
            status: first,
            ..ScrapeTask::pending("aaaaaaaa-1111", "linkedin_jobs")
        },
        ScrapeTask {
            status: second,
            ..ScrapeTask::pending("bbbbbbbb-2222", "internshala_jobs")
        },
    ]
}

#[test]
fn missing_role_or_location_is_rejected_without_effects() {
    init_logging();
    for (role, location) in [("", "NYC"), ("Engineer", ""), ("  ", "  ")] {
        let (state, effects) = update(with_inputs(role, location), Msg::SearchSubmitted);
        assert!(effects.is_empty());
        assert_eq!(state.search_phase(), &SearchPhase::Idle);
        let status = state.view().status.expect("status line");
        assert_eq!(status.severity, Severity::Error);
        assert_eq!(status.text, "Please enter both job role and location.");
    }
}

#[test]
fn valid_search_emits_start_scrape() {
    init_logging();
    let (mut state, effects) = update(with_inputs(" Engineer ", "NYC"), Msg::SearchSubmitted);

    assert_eq!(
        effects,
        vec![Effect::StartScrape {
            query: SearchQuery::new("Engineer", "NYC").unwrap()
        }]
    );
    assert_eq!(state.search_phase(), &SearchPhase::Submitting);
    assert!(state.view().busy);
    assert!(state.consume_dirty());
}

#[test]
fn second_submit_while_running_is_ignored() {
    init_logging();
    let state = submitted();
    let (state, effects) = update(state, Msg::SearchSubmitted);
    assert!(effects.is_empty());
    assert_eq!(state.search_phase(), &SearchPhase::Submitting);
}

#[test]
fn progress_updates_task_rows() {
    init_logging();
    let batch = BatchId(1);
    let (state, _) = update(
        submitted(),
        Msg::BatchStarted {
            batch,
            tasks: two_tasks(TaskStatus::Pending, TaskStatus::Pending),
        },
    );
    let (state, _) = update(
        state,
        Msg::BatchProgress {
            batch,
            tasks: two_tasks(TaskStatus::Finished, TaskStatus::Pending),
        },
    );

    let view = state.view();
    assert_eq!(view.search.batch, Some(batch));
    let rows: Vec<_> = view
        .search
        .tasks
        .iter()
        .map(|row| (row.short_id.as_str(), row.status))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("aaaaaaaa", TaskStatus::Finished),
            ("bbbbbbbb", TaskStatus::Pending)
        ]
    );
}

#[test]
fn finished_batch_clears_tasks_and_waits_for_listing() {
    init_logging();
    let batch = BatchId(1);
    let (state, _) = update(
        submitted(),
        Msg::BatchStarted {
            batch,
            tasks: two_tasks(TaskStatus::Pending, TaskStatus::Pending),
        },
    );
    let (state, effects) = update(state, Msg::BatchFinished { batch });

    assert!(effects.is_empty());
    assert_eq!(state.search_phase(), &SearchPhase::Idle);
    let view = state.view();
    assert!(view.listing_loading);
    assert!(view.busy);

    let (state, _) = update(state, Msg::ListingLoaded(Ok(Vec::new())));
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.status.unwrap().text, "No jobs found.");
}

#[test]
fn failed_batch_surfaces_error() {
    init_logging();
    let batch = BatchId(4);
    let (state, _) = update(
        submitted(),
        Msg::BatchStarted {
            batch,
            tasks: two_tasks(TaskStatus::Pending, TaskStatus::Pending),
        },
    );
    let (state, _) = update(
        state,
        Msg::BatchFailed {
            batch,
            message: "Some scrape tasks failed.".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.search.batch, None);
    assert!(!view.listing_loading);
    let status = view.status.unwrap();
    assert_eq!(status.severity, Severity::Error);
    assert_eq!(status.text, "Some scrape tasks failed.");
}

#[test]
fn creation_failure_returns_to_idle() {
    init_logging();
    let (state, _) = update(
        submitted(),
        Msg::BatchRejected {
            message: "Failed to start scrape task.".to_string(),
        },
    );
    assert_eq!(state.search_phase(), &SearchPhase::Idle);
    assert!(!state.view().busy);
}

#[test]
fn stale_batch_messages_are_dropped() {
    init_logging();
    let (state, _) = update(
        submitted(),
        Msg::BatchStarted {
            batch: BatchId(2),
            tasks: two_tasks(TaskStatus::Pending, TaskStatus::Pending),
        },
    );

    // A batch older than the current one never replaces it.
    let (state, _) = update(
        state,
        Msg::BatchStarted {
            batch: BatchId(1),
            tasks: Vec::new(),
        },
    );
    let (state, _) = update(
        state,
        Msg::BatchProgress {
            batch: BatchId(1),
            tasks: two_tasks(TaskStatus::Finished, TaskStatus::Finished),
        },
    );
    let (state, _) = update(state, Msg::BatchFinished { batch: BatchId(1) });

    let view = state.view();
    assert_eq!(view.search.batch, Some(BatchId(2)));
    assert!(view
        .search
        .tasks
        .iter()
        .all(|row| row.status == TaskStatus::Pending));
    assert!(!view.listing_loading);
}

#[test]
fn teardown_cancels_and_freezes_state() {
    init_logging();
    let batch = BatchId(1);
    let (state, _) = update(
        submitted(),
        Msg::BatchStarted {
            batch,
            tasks: two_tasks(TaskStatus::Pending, TaskStatus::Pending),
        },
    );
    let (state, effects) = update(state, Msg::Teardown);
    assert_eq!(effects, vec![Effect::CancelScrape]);
    assert!(!state.view().busy);

    let frozen = state.clone();
    let (state, effects) = update(state, Msg::BatchFinished { batch });
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::ListingRequested);
    assert!(effects.is_empty());
    assert_eq!(state, frozen);
}

#[test]
fn teardown_while_idle_has_no_effects() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::Teardown);
    assert!(effects.is_empty());
    assert!(state.is_torn_down());
}

#[test]
fn batch_created_after_sign_out_is_dropped() {
    init_logging();
    let (state, effects) = update(submitted(), Msg::SignOutRequested);
    assert_eq!(effects, vec![Effect::CancelScrape, Effect::SignOut]);
    let (state, _) = update(state, Msg::SignedOut);

    // The engine finishes creating the batch before it sees the cancel.
    let (state, effects) = update(
        state,
        Msg::BatchStarted {
            batch: BatchId(1),
            tasks: two_tasks(TaskStatus::Pending, TaskStatus::Pending),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.search_phase(), &SearchPhase::Idle);
    let view = state.view();
    assert_eq!(view.search.batch, None);
    assert!(!view.busy);
    assert_eq!(view.status.unwrap().text, "Signed out.");
}

#[test]
fn batch_started_without_a_submit_is_ignored() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::BatchStarted {
            batch: BatchId(3),
            tasks: two_tasks(TaskStatus::Pending, TaskStatus::Pending),
        },
    );
    assert_eq!(state.search_phase(), &SearchPhase::Idle);
    assert!(!state.view().busy);
}
