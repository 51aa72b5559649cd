//! Task filter builder
//!
//! Turns the raw list filter a client sends into a normalized [`TaskQuery`]
//! and renders it two ways:
//!
//! - as SQL, through `sqlx::QueryBuilder` (used by the PostgreSQL store)
//! - as a predicate plus comparator over in-memory rows (used by the
//!   memory store)
//!
//! Both renderings share one set of rules:
//!
//! - the owner predicate is always present and ANDed with everything else
//! - `status`, `priority` and `categoryId` are equality filters
//! - `search` is a case-insensitive literal substring match on title OR
//!   description
//! - `priority` sorts by the rank table below, never alphabetically
//! - ties are broken by `id` ascending
//! - a missing `dueDate` sorts after every date under ASC and before every
//!   date under DESC
//!
//! Out-of-range input is normalized rather than rejected: an unknown
//! `sortBy` falls back to `createdAt`, an unknown `order` to DESC, a page
//! below 1 to 1, and `limit` is clamped to `1..=100`.
//!
//! # Example
//!
//! ```
//! use tasknest_shared::query::{SortField, SortOrder, TaskFilter, TaskQuery};
//! use uuid::Uuid;
//!
//! let filter = TaskFilter {
//!     sort_by: Some("priority".to_string()),
//!     order: Some("asc".to_string()),
//!     page: Some(3),
//!     limit: Some(500),
//!     ..Default::default()
//! };
//!
//! let query = TaskQuery::new(Uuid::new_v4(), filter);
//! assert_eq!(query.sort_by, SortField::Priority);
//! assert_eq!(query.order, SortOrder::Asc);
//! assert_eq!(query.limit, 100);
//! assert_eq!(query.offset(), 200);
//! ```

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::task::{Priority, Task, TaskStatus};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Sort rank of each priority. Higher rank means more urgent.
pub const PRIORITY_RANKS: [(Priority, i32); 3] =
    [(Priority::High, 3), (Priority::Medium, 2), (Priority::Low, 1)];

/// Looks up the sort rank of a priority
pub fn priority_rank(priority: Priority) -> i32 {
    PRIORITY_RANKS
        .iter()
        .find(|(p, _)| *p == priority)
        .map(|(_, rank)| *rank)
        .unwrap_or(0)
}

/// List filter as received from the client (query-string shape)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub category_id: Option<Uuid>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Sortable task field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    DueDate,
    #[default]
    CreatedAt,
    Priority,
}

impl SortField {
    /// Parses a wire name, falling back to `createdAt`
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("dueDate") => SortField::DueDate,
            Some("priority") => SortField::Priority,
            _ => SortField::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses `ASC` / `DESC` in any case, falling back to DESC
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Normalized task list query, always scoped to one owner
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub user_id: Uuid,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub category_id: Option<Uuid>,

    /// Search term exactly as sent; an empty term is dropped
    pub search: Option<String>,

    pub sort_by: SortField,
    pub order: SortOrder,

    /// 1-based page number
    pub page: i64,

    /// Page size in `1..=MAX_LIMIT`
    pub limit: i64,
}

impl TaskQuery {
    /// Normalizes a raw filter for the given owner
    pub fn new(user_id: Uuid, filter: TaskFilter) -> Self {
        let search = filter.search.filter(|s| !s.is_empty());

        Self {
            user_id,
            status: filter.status,
            priority: filter.priority,
            category_id: filter.category_id,
            search,
            sort_by: SortField::parse(filter.sort_by.as_deref()),
            order: SortOrder::parse(filter.order.as_deref()),
            page: filter.page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Number of rows skipped before the current page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Pagination metadata for a result with `total` matching rows
    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total)
    }

    /// Appends the WHERE clause
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE user_id = ").push_bind(self.user_id);

        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(priority) = self.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        if let Some(category_id) = self.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR description ILIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }

    /// Appends the ORDER BY clause, including the id tie-break
    pub fn push_order_by(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" ORDER BY ");

        match self.sort_by {
            SortField::DueDate => {
                qb.push("due_date");
            }
            SortField::CreatedAt => {
                qb.push("created_at");
            }
            SortField::Priority => {
                qb.push("CASE priority");
                for (priority, rank) in PRIORITY_RANKS {
                    qb.push(format!(" WHEN '{}' THEN {}", priority.as_str(), rank));
                }
                qb.push(" END");
            }
        }

        qb.push(" ").push(self.order.as_sql()).push(", id ASC");
    }

    /// Whether an in-memory row satisfies the filter
    pub fn matches(&self, task: &Task) -> bool {
        task.user_id == self.user_id
            && self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.category_id.map_or(true, |c| task.category_id == Some(c))
            && self.search.as_deref().map_or(true, |term| search_matches(task, term))
    }

    /// Orders two in-memory rows the way the SQL rendering does
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let primary = match self.sort_by {
            SortField::DueDate => self.order.apply(nulls_high(a.due_date, b.due_date)),
            SortField::CreatedAt => self.order.apply(a.created_at.cmp(&b.created_at)),
            SortField::Priority => self
                .order
                .apply(priority_rank(a.priority).cmp(&priority_rank(b.priority))),
        };

        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Count specification: a conjunction of equality and due-date predicates
/// over one owner's tasks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCount {
    pub user_id: Uuid,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub category_id: Option<Uuid>,

    /// Inclusive lower bound on `due_date`
    pub due_from: Option<NaiveDate>,

    /// Exclusive upper bound on `due_date`
    pub due_before: Option<NaiveDate>,
}

impl TaskCount {
    /// All of the owner's tasks
    pub fn all(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn due_from(mut self, date: NaiveDate) -> Self {
        self.due_from = Some(date);
        self
    }

    pub fn due_before(mut self, date: NaiveDate) -> Self {
        self.due_before = Some(date);
        self
    }

    /// Appends the WHERE clause
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE user_id = ").push_bind(self.user_id);

        if let Some(completed) = self.completed {
            qb.push(" AND completed = ").push_bind(completed);
        }
        if let Some(priority) = self.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(category_id) = self.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(from) = self.due_from {
            qb.push(" AND due_date >= ").push_bind(from);
        }
        if let Some(before) = self.due_before {
            qb.push(" AND due_date < ").push_bind(before);
        }
    }

    /// Whether an in-memory row is counted
    ///
    /// A due-date bound never matches a task without a due date.
    pub fn matches(&self, task: &Task) -> bool {
        task.user_id == self.user_id
            && self.completed.map_or(true, |c| task.completed == c)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.status.map_or(true, |s| task.status == s)
            && self.category_id.map_or(true, |c| task.category_id == Some(c))
            && self
                .due_from
                .map_or(true, |from| task.due_date.is_some_and(|d| d >= from))
            && self
                .due_before
                .map_or(true, |before| task.due_date.is_some_and(|d| d < before))
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,

    /// Full matching count, independent of the page window
    pub total: i64,

    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Escapes LIKE metacharacters and wraps the term in `%`
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn search_matches(task: &Task, term: &str) -> bool {
    let needle = term.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

/// Ascending comparison where `None` is greater than any value
fn nulls_high<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(user_id: Uuid, title: &str, priority: Priority) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            priority,
            status: TaskStatus::Active,
            due_date: None,
            completed: false,
            completed_at: None,
            user_id,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sorted(query: &TaskQuery, mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by(|a, b| query.compare(a, b));
        tasks
    }

    #[test]
    fn test_defaults() {
        let query = TaskQuery::new(Uuid::nil(), TaskFilter::default());
        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset(), 0);
        assert!(query.search.is_none());
    }

    #[test]
    fn test_lenient_normalization() {
        let query = TaskQuery::new(
            Uuid::nil(),
            TaskFilter {
                sort_by: Some("title".to_string()),
                order: Some("sideways".to_string()),
                page: Some(-4),
                limit: Some(0),
                search: Some(String::new()),
                ..Default::default()
            },
        );

        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 1);
        assert!(query.search.is_none());
    }

    #[test]
    fn test_search_term_is_not_trimmed() {
        let owner = Uuid::new_v4();
        let query = TaskQuery::new(
            owner,
            TaskFilter {
                search: Some(" milk ".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(query.search.as_deref(), Some(" milk "));

        assert!(!query.matches(&task(owner, "milk", Priority::Low)));
        assert!(query.matches(&task(owner, "oat milk carton", Priority::Low)));
    }

    #[test]
    fn test_sort_field_and_order_parsing() {
        assert_eq!(SortField::parse(Some("dueDate")), SortField::DueDate);
        assert_eq!(SortField::parse(Some("createdAt")), SortField::CreatedAt);
        assert_eq!(SortField::parse(Some("priority")), SortField::Priority);
        assert_eq!(SortField::parse(None), SortField::CreatedAt);

        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("Asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }

    #[test]
    fn test_priority_rank_table() {
        assert_eq!(priority_rank(Priority::High), 3);
        assert_eq!(priority_rank(Priority::Medium), 2);
        assert_eq!(priority_rank(Priority::Low), 1);
    }

    #[test]
    fn test_priority_sort_is_by_rank_not_name() {
        let user = Uuid::new_v4();
        let tasks = vec![
            task(user, "a", Priority::Low),
            task(user, "b", Priority::High),
            task(user, "c", Priority::Medium),
        ];

        let desc = TaskQuery::new(
            user,
            TaskFilter {
                sort_by: Some("priority".to_string()),
                order: Some("DESC".to_string()),
                ..Default::default()
            },
        );
        let order: Vec<Priority> = sorted(&desc, tasks.clone()).iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![Priority::High, Priority::Medium, Priority::Low]);

        let asc = TaskQuery { order: SortOrder::Asc, ..desc };
        let order: Vec<Priority> = sorted(&asc, tasks).iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![Priority::Low, Priority::Medium, Priority::High]);
    }

    #[test]
    fn test_due_date_nulls_follow_postgres() {
        let user = Uuid::new_v4();
        let mut early = task(user, "early", Priority::Low);
        early.due_date = NaiveDate::from_ymd_opt(2030, 1, 1);
        let mut late = task(user, "late", Priority::Low);
        late.due_date = NaiveDate::from_ymd_opt(2030, 6, 1);
        let none = task(user, "none", Priority::Low);

        let asc = TaskQuery {
            sort_by: SortField::DueDate,
            order: SortOrder::Asc,
            ..TaskQuery::new(user, TaskFilter::default())
        };
        let titles: Vec<String> = sorted(&asc, vec![none.clone(), late.clone(), early.clone()])
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["early", "late", "none"]);

        let desc = TaskQuery { order: SortOrder::Desc, ..asc };
        let titles: Vec<String> = sorted(&desc, vec![early, none, late])
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["none", "late", "early"]);
    }

    #[test]
    fn test_ties_break_on_id_ascending_in_both_orders() {
        let user = Uuid::new_v4();
        let mut a = task(user, "a", Priority::High);
        let mut b = task(user, "b", Priority::High);
        let stamp = Utc::now();
        a.created_at = stamp;
        b.created_at = stamp;

        let (lo, hi) = if a.id < b.id { (a, b) } else { (b, a) };

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let query = TaskQuery {
                order,
                ..TaskQuery::new(user, TaskFilter::default())
            };
            let ids: Vec<Uuid> = sorted(&query, vec![hi.clone(), lo.clone()])
                .iter()
                .map(|t| t.id)
                .collect();
            assert_eq!(ids, vec![lo.id, hi.id]);
        }
    }

    #[test]
    fn test_created_at_sort() {
        let user = Uuid::new_v4();
        let mut old = task(user, "old", Priority::Low);
        old.created_at = Utc::now() - Duration::days(2);
        let new = task(user, "new", Priority::Low);

        let query = TaskQuery::new(user, TaskFilter::default());
        let titles: Vec<String> = sorted(&query, vec![old, new])
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["new", "old"]);
    }

    #[test]
    fn test_matches_owner_is_mandatory() {
        let owner = Uuid::new_v4();
        let query = TaskQuery::new(owner, TaskFilter::default());

        assert!(query.matches(&task(owner, "mine", Priority::Low)));
        assert!(!query.matches(&task(Uuid::new_v4(), "theirs", Priority::Low)));
    }

    #[test]
    fn test_matches_equality_filters() {
        let owner = Uuid::new_v4();
        let category = Uuid::new_v4();
        let mut filed = task(owner, "filed", Priority::High);
        filed.category_id = Some(category);

        let query = TaskQuery::new(
            owner,
            TaskFilter {
                priority: Some(Priority::High),
                status: Some(TaskStatus::Active),
                category_id: Some(category),
                ..Default::default()
            },
        );

        assert!(query.matches(&filed));
        assert!(!query.matches(&task(owner, "loose", Priority::High)));

        let mut done = filed.clone();
        done.status = TaskStatus::Completed;
        assert!(!query.matches(&done));
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_or_description() {
        let owner = Uuid::new_v4();
        let mut described = task(owner, "Groceries", Priority::Low);
        described.description = Some("Buy OAT milk".to_string());

        let by_title = TaskQuery::new(
            owner,
            TaskFilter {
                search: Some("grocer".to_string()),
                ..Default::default()
            },
        );
        let by_description = TaskQuery::new(
            owner,
            TaskFilter {
                search: Some("oat".to_string()),
                ..Default::default()
            },
        );
        let miss = TaskQuery::new(
            owner,
            TaskFilter {
                search: Some("bread".to_string()),
                ..Default::default()
            },
        );

        assert!(by_title.matches(&described));
        assert!(by_description.matches(&described));
        assert!(!miss.matches(&described));
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("milk"), "%milk%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_sql_rendering() {
        let query = TaskQuery::new(
            Uuid::new_v4(),
            TaskFilter {
                status: Some(TaskStatus::Active),
                search: Some("milk".to_string()),
                sort_by: Some("priority".to_string()),
                order: Some("asc".to_string()),
                ..Default::default()
            },
        );

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM tasks");
        query.push_where(&mut qb);
        query.push_order_by(&mut qb);
        let sql = qb.sql();

        assert!(sql.contains("WHERE user_id = $1 AND status = $2"));
        assert!(sql.contains("title ILIKE $3 ESCAPE '\\' OR description ILIKE $4"));
        assert!(sql.contains(
            "ORDER BY CASE priority WHEN 'HIGH' THEN 3 WHEN 'MEDIUM' THEN 2 WHEN 'LOW' THEN 1 END ASC, id ASC"
        ));
    }

    #[test]
    fn test_count_spec_due_window() {
        let owner = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2030, 3, 10).unwrap();
        let tomorrow = today.succ_opt().unwrap();

        let spec = TaskCount::all(owner)
            .completed(false)
            .due_from(today)
            .due_before(tomorrow);

        let mut due_today = task(owner, "today", Priority::Low);
        due_today.due_date = Some(today);
        let mut due_tomorrow = task(owner, "tomorrow", Priority::Low);
        due_tomorrow.due_date = Some(tomorrow);
        let undated = task(owner, "undated", Priority::Low);

        assert!(spec.matches(&due_today));
        assert!(!spec.matches(&due_tomorrow));
        assert!(!spec.matches(&undated));

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        spec.push_where(&mut qb);
        assert!(qb
            .sql()
            .ends_with("WHERE user_id = $1 AND completed = $2 AND due_date >= $3 AND due_date < $4"));
    }

    #[test]
    fn test_page_meta() {
        assert_eq!(PageMeta::new(1, 1, 2).total_pages, 2);
        assert_eq!(PageMeta::new(2, 1, 2).total_pages, 2);
        assert_eq!(PageMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PageMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageMeta::new(1, 10, 11).total_pages, 2);

        let json = serde_json::to_value(PageMeta::new(1, 10, 11)).unwrap();
        assert_eq!(json["totalPages"], 2);
    }
}
