//! Termination rules for a tracked scrape batch.
use crate::{ScrapeTask, TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchVerdict {
    /// At least one task is still pending.
    Continue,
    /// Every task finished; the listing should be refreshed.
    Finished,
    /// A task failed or vanished; the whole batch is abandoned.
    Failed { tasks: Vec<TaskId> },
}

/// Failure wins over completion: one failed task fails the batch even if the
/// rest finished.
pub fn evaluate_batch(tasks: &[ScrapeTask]) -> BatchVerdict {
    let failed: Vec<TaskId> = tasks
        .iter()
        .filter(|task| task.status.is_failure())
        .map(|task| task.id.clone())
        .collect();
    if !failed.is_empty() {
        return BatchVerdict::Failed { tasks: failed };
    }
    if !tasks.is_empty() && tasks.iter().all(|task| task.status == TaskStatus::Finished) {
        BatchVerdict::Finished
    } else {
        BatchVerdict::Continue
    }
}

/// Apply freshly observed statuses by task id. Tasks without an observation
/// keep their previous status; unknown ids are ignored.
pub fn apply_statuses(tasks: &mut [ScrapeTask], observed: &[(TaskId, TaskStatus)]) {
    for (id, status) in observed {
        if let Some(task) = tasks.iter_mut().find(|task| &task.id == id) {
            task.status = *status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(statuses: &[TaskStatus]) -> Vec<ScrapeTask> {
        statuses
            .iter()
            .enumerate()
            .map(|(idx, status)| ScrapeTask {
                id: TaskId::new(format!("task-{idx}")),
                spider: "linkedin_jobs".to_string(),
                status: *status,
            })
            .collect()
    }

    #[test]
    fn pending_tasks_keep_polling() {
        let tasks = batch(&[TaskStatus::Finished, TaskStatus::Pending]);
        assert_eq!(evaluate_batch(&tasks), BatchVerdict::Continue);
    }

    #[test]
    fn all_finished_completes_batch() {
        let tasks = batch(&[TaskStatus::Finished, TaskStatus::Finished]);
        assert_eq!(evaluate_batch(&tasks), BatchVerdict::Finished);
    }

    #[test]
    fn failure_takes_precedence_over_finished() {
        let tasks = batch(&[TaskStatus::Finished, TaskStatus::Failed]);
        assert_eq!(
            evaluate_batch(&tasks),
            BatchVerdict::Failed {
                tasks: vec![TaskId::new("task-1")]
            }
        );
    }

    #[test]
    fn not_found_counts_as_failure() {
        let tasks = batch(&[TaskStatus::NotFound]);
        assert!(matches!(evaluate_batch(&tasks), BatchVerdict::Failed { .. }));
    }

    #[test]
    fn empty_batch_never_finishes() {
        assert_eq!(evaluate_batch(&[]), BatchVerdict::Continue);
    }

    #[test]
    fn unobserved_tasks_are_left_alone() {
        let mut tasks = batch(&[TaskStatus::Pending, TaskStatus::Pending]);
        apply_statuses(
            &mut tasks,
            &[
                (TaskId::new("task-1"), TaskStatus::Finished),
                (TaskId::new("unknown"), TaskStatus::Failed),
            ],
        );
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[1].status, TaskStatus::Finished);
        assert_eq!(tasks.len(), 2);
    }
}
