use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Role of a user: admins manage the catalog, cashiers record sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub is_active: bool,
}

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, hashed_password, role, is_active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    /// Batch lookup used when resolving cashier detail for transaction
    /// listings.
    pub async fn find_by_ids(db: &PgPool, ids: &[i32]) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, hashed_password, role, is_active
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await
    }

    /// Create a new user with an already hashed password. A duplicate
    /// username surfaces as a unique violation from the database.
    pub async fn create(
        db: &PgPool,
        username: &str,
        hashed_password: &str,
        role: Role,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, hashed_password, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, hashed_password, role, is_active
            "#,
        )
        .bind(username)
        .bind(hashed_password)
        .bind(role)
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Cashier).unwrap(), "\"cashier\"");
    }

    #[test]
    fn user_json_hides_password_hash() {
        let user = User {
            id: 1,
            username: "admin".into(),
            hashed_password: "$argon2id$v=19$secret".into(),
            role: Role::Admin,
            is_active: true,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"username\":\"admin\""));
    }
}
