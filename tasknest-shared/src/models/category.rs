/// Category model and database operations
///
/// Categories group a user's tasks. A category name is unique per owner,
/// not globally. Deleting a category leaves its tasks in place with
/// `category_id` set to NULL.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     color VARCHAR(7),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT categories_user_name_key UNIQUE (user_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "id, name, description, color, user_id, created_at, updated_at";

/// Checks the `#RRGGBB` color format (hex digits in either case)
pub fn is_hex_color(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

/// Task category owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// `#RRGGBB` when present
    pub color: Option<String>,

    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub user_id: Uuid,
}

/// Partial update for a category
///
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<Option<String>>,
}

impl Category {
    /// Applies a partial update in place
    pub fn apply(&mut self, patch: UpdateCategory) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }

    /// Inserts a new category
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `categories_user_name_key` when the
    /// owner already has a category with this name.
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, description, color, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.color)
        .bind(data.user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds the owner's category with exactly this name
    pub async fn find_by_name(
        pool: &PgPool,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 AND name = $2"
        ))
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Fetches every category in `ids` (missing ids are skipped)
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Lists the owner's categories, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Writes the mutable fields back and bumps `updated_at`
    pub async fn save(pool: &PgPool, category: &Category) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = $2, description = $3, color = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.color)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a category; its tasks survive with `category_id = NULL`
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#FF5733"));
        assert!(is_hex_color("#abcdef"));
        assert!(is_hex_color("#0a0B0c"));

        assert!(!is_hex_color("FF5733"));
        assert!(!is_hex_color("#FF573"));
        assert!(!is_hex_color("#FF57333"));
        assert!(!is_hex_color("#GG5733"));
        assert!(!is_hex_color(""));
    }

    #[test]
    fn test_apply_clears_nullable_fields() {
        let now = Utc::now();
        let mut category = Category {
            id: Uuid::new_v4(),
            name: "Work".to_string(),
            description: Some("Day job".to_string()),
            color: Some("#112233".to_string()),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        category.apply(UpdateCategory {
            description: Some(None),
            ..Default::default()
        });

        assert_eq!(category.name, "Work");
        assert!(category.description.is_none());
        assert_eq!(category.color.as_deref(), Some("#112233"));
    }
}
