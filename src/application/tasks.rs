//! Memory-based production task state management
//!
//! Keeps per-task completion flags in memory behind a read-write lock. Each
//! flag is written exactly once, by the production run that owns the id, and
//! read by status pollers at their own cadence. The registry is an injected
//! service object with TTL-based reaping so a long-lived process does not
//! accumulate records forever.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// State of one production task, kept in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskState {
    pub completed: bool,
    /// Set when the production run failed; the task still completes so
    /// pollers terminate, but the dataset read will come up empty.
    pub failed: bool,
    #[serde(rename = "registeredAt")]
    pub registered_at: DateTime<Utc>,
}

/// Thread-safe registry of production task flags.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Arc<RwLock<HashMap<String, TaskState>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh task id and register it as not yet completed.
    pub async fn register(&self) -> String {
        let task_id = Uuid::new_v4().to_string();
        let state = TaskState {
            completed: false,
            failed: false,
            registered_at: Utc::now(),
        };

        let mut tasks = self.tasks.write().await;
        tasks.insert(task_id.clone(), state);

        tracing::info!("Registered production task: {}", task_id);
        task_id
    }

    /// Mark a task as completed. The false→true transition happens at most
    /// once; completion never reverts.
    pub async fn complete(&self, task_id: &str) {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(state) => {
                state.completed = true;
                tracing::info!("Task completed: {}", task_id);
            }
            None => tracing::warn!("Completion for unknown task id: {}", task_id),
        }
    }

    /// Mark a task as failed. Failed tasks still read as completed so
    /// pollers are not left hanging.
    pub async fn fail(&self, task_id: &str) {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(state) => {
                state.completed = true;
                state.failed = true;
                tracing::warn!("Task failed: {}", task_id);
            }
            None => tracing::warn!("Failure report for unknown task id: {}", task_id),
        }
    }

    /// Current state of a task, or `None` for ids never issued.
    pub async fn status(&self, task_id: &str) -> Option<TaskState> {
        let tasks = self.tasks.read().await;
        tasks.get(task_id).cloned()
    }

    /// Number of registered tasks, finished or not.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Drop completed tasks registered longer than `ttl` ago. In-flight
    /// tasks are never reaped. Returns the number of records removed.
    pub async fn reap_older_than(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, state| !state.completed || state.registered_at > cutoff);
        let removed = before - tasks.len();
        if removed > 0 {
            tracing::debug!("Reaped {} finished task records", removed);
        }
        removed
    }

    /// Spawn a background loop that reaps expired records every `every`.
    /// The handle can be aborted at shutdown; the loop holds no lock between
    /// ticks.
    pub fn spawn_reaper(
        registry: Arc<Self>,
        every: std::time::Duration,
        ttl: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                registry.reap_older_than(ttl).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_complete_is_monotonic() {
        let registry = TaskRegistry::new();
        let task_id = registry.register().await;

        let state = registry.status(&task_id).await.unwrap();
        assert!(!state.completed);

        registry.complete(&task_id).await;
        let state = registry.status(&task_id).await.unwrap();
        assert!(state.completed);
        assert!(!state.failed);

        // Completing again changes nothing.
        registry.complete(&task_id).await;
        assert!(registry.status(&task_id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn unknown_task_id_reads_as_none() {
        let registry = TaskRegistry::new();
        assert!(registry.status("no-such-task").await.is_none());
    }

    #[tokio::test]
    async fn failed_tasks_still_complete() {
        let registry = TaskRegistry::new();
        let task_id = registry.register().await;

        registry.fail(&task_id).await;
        let state = registry.status(&task_id).await.unwrap();
        assert!(state.completed);
        assert!(state.failed);
    }

    #[tokio::test]
    async fn reap_drops_only_expired_finished_tasks() {
        let registry = TaskRegistry::new();
        let finished = registry.register().await;
        let in_flight = registry.register().await;
        registry.complete(&finished).await;

        // A zero TTL expires every finished record immediately.
        let removed = registry.reap_older_than(Duration::zero()).await;
        assert_eq!(removed, 1);
        assert!(registry.status(&finished).await.is_none());
        assert!(registry.status(&in_flight).await.is_some());
    }
}
