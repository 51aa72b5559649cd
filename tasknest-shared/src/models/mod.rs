/// Database models for TaskNest
///
/// Each model owns its row type, its create/update inputs and the sqlx
/// functions that read and write it. Services never call these directly;
/// they go through [`crate::store::Store`].
///
/// # Models
///
/// - `user`: accounts (unique email and username)
/// - `category`: per-user task groups (unique name per owner)
/// - `task`: tasks with priority, status and completion tracking
/// - `subtask`: checklist items under a task
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::category::{Category, CreateCategory};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let category = Category::create(&pool, CreateCategory {
///     name: "Work".to_string(),
///     description: None,
///     color: Some("#FF5733".to_string()),
///     user_id,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Deserializer};

pub mod category;
pub mod subtask;
pub mod task;
pub mod user;

/// Deserializes a field that distinguishes "absent" from "null"
///
/// Use with `#[serde(default, deserialize_with = "...")]`: an absent key
/// yields `None`, an explicit `null` yields `Some(None)`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        note: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.note, None);

        let null: Patch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(null.note, Some(None));

        let set: Patch = serde_json::from_str(r#"{"note": "x"}"#).unwrap();
        assert_eq!(set.note, Some(Some("x".to_string())));
    }
}
