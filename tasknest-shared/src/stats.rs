//! Task aggregator
//!
//! Builds a per-user dashboard snapshot from ten independent counts that
//! are dispatched concurrently and joined before assembly.
//!
//! "Today" is the server's local calendar date. A task due today is never
//! overdue, and completed tasks count toward neither `dueToday` nor
//! `overdue`.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task::{Priority, TaskStatus};
use crate::query::TaskCount;
use crate::store::{Store, StoreResult};

/// Half-open day window `[today, tomorrow)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
}

impl DayWindow {
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            today,
            tomorrow: today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX),
        }
    }

    /// Window around the server's local date
    pub fn local_today() -> Self {
        Self::for_date(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "ACTIVE")]
    pub active: i64,

    #[serde(rename = "COMPLETED")]
    pub completed: i64,
}

/// Dashboard statistics for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub by_priority: PriorityCounts,
    pub by_status: StatusCounts,
    pub due_today: i64,
    pub overdue: i64,
}

/// The count specifications behind one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct StatsPlan {
    pub total: TaskCount,
    pub active: TaskCount,
    pub completed: TaskCount,
    pub low: TaskCount,
    pub medium: TaskCount,
    pub high: TaskCount,
    pub status_active: TaskCount,
    pub status_completed: TaskCount,
    pub due_today: TaskCount,
    pub overdue: TaskCount,
}

impl StatsPlan {
    pub fn new(user_id: Uuid, window: DayWindow) -> Self {
        let all = TaskCount::all(user_id);
        let outstanding = all.clone().completed(false);

        Self {
            total: all.clone(),
            active: outstanding.clone(),
            completed: all.clone().completed(true),
            low: all.clone().priority(Priority::Low),
            medium: all.clone().priority(Priority::Medium),
            high: all.clone().priority(Priority::High),
            status_active: all.clone().status(TaskStatus::Active),
            status_completed: all.status(TaskStatus::Completed),
            due_today: outstanding
                .clone()
                .due_from(window.today)
                .due_before(window.tomorrow),
            overdue: outstanding.due_before(window.today),
        }
    }
}

/// Computes the snapshot for `user_id`
///
/// The counts share no state, so they run concurrently; the first store
/// error aborts the whole snapshot.
pub async fn collect(store: &dyn Store, user_id: Uuid, window: DayWindow) -> StoreResult<TaskStats> {
    let plan = StatsPlan::new(user_id, window);

    let (
        total,
        active,
        completed,
        low,
        medium,
        high,
        status_active,
        status_completed,
        due_today,
        overdue,
    ) = tokio::try_join!(
        store.count_tasks(&plan.total),
        store.count_tasks(&plan.active),
        store.count_tasks(&plan.completed),
        store.count_tasks(&plan.low),
        store.count_tasks(&plan.medium),
        store.count_tasks(&plan.high),
        store.count_tasks(&plan.status_active),
        store.count_tasks(&plan.status_completed),
        store.count_tasks(&plan.due_today),
        store.count_tasks(&plan.overdue),
    )?;

    tracing::debug!(user_id = %user_id, total, due_today, overdue, "Collected task stats");

    Ok(TaskStats {
        total,
        active,
        completed,
        by_priority: PriorityCounts { low, medium, high },
        by_status: StatusCounts {
            active: status_active,
            completed: status_completed,
        },
        due_today,
        overdue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::UpdateTask;
    use crate::models::{task::CreateTask, user::CreateUser};
    use crate::store::MemoryStore;
    use chrono::Utc;

    #[test]
    fn test_day_window() {
        let today = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        let window = DayWindow::for_date(today);
        assert_eq!(window.tomorrow, NaiveDate::from_ymd_opt(2031, 1, 1).unwrap());
    }

    #[test]
    fn test_plan_windows_exclude_completed() {
        let user = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2030, 5, 5).unwrap();
        let plan = StatsPlan::new(user, DayWindow::for_date(today));

        assert_eq!(plan.due_today.completed, Some(false));
        assert_eq!(plan.due_today.due_from, Some(today));
        assert_eq!(plan.overdue.completed, Some(false));
        assert_eq!(plan.overdue.due_before, Some(today));
        assert_eq!(plan.overdue.due_from, None);
        assert_eq!(plan.total, TaskCount::all(user));
    }

    #[tokio::test]
    async fn test_collect_over_memory_store() {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser {
                email: "ada@example.com".to_string(),
                username: "ada".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2030, 5, 5).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2030, 5, 4).unwrap();
        let next_week = NaiveDate::from_ymd_opt(2030, 5, 12).unwrap();

        let create = |title: &str, priority, due_date| CreateTask {
            title: title.to_string(),
            description: None,
            priority: Some(priority),
            due_date,
            category_id: None,
            user_id: user.id,
        };

        let due_today = store.create_task(create("a", Priority::High, Some(today))).await.unwrap();
        store.create_task(create("b", Priority::Low, Some(yesterday))).await.unwrap();
        store.create_task(create("c", Priority::Low, Some(next_week))).await.unwrap();
        store.create_task(create("d", Priority::Medium, None)).await.unwrap();

        let window = DayWindow::for_date(today);
        let stats = collect(&store, user.id, window).await.unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 4);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.by_priority, PriorityCounts { low: 2, medium: 1, high: 1 });
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.overdue, 1);

        let mut done = due_today;
        done.apply(
            UpdateTask {
                completed: Some(true),
                ..Default::default()
            },
            Utc::now(),
        );
        store.save_task(&done).await.unwrap();

        let stats = collect(&store, user.id, window).await.unwrap();
        assert_eq!(stats.due_today, 0);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.by_status, StatusCounts { active: 3, completed: 1 });
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(TaskStats::default()).unwrap();
        assert!(json["byPriority"].get("low").is_some());
        assert!(json["byStatus"].get("ACTIVE").is_some());
        assert!(json["byStatus"].get("COMPLETED").is_some());
        assert!(json.get("dueToday").is_some());
        assert!(json.get("overdue").is_some());
    }
}
