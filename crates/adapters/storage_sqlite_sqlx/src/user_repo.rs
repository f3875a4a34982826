//! `SQLite` implementation of [`UserRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homelink_app::ports::{NewUser, StoredUser, UserRepository};
use homelink_domain::error::HomeLinkError;
use homelink_domain::time::now;
use homelink_domain::user::{Role, User, UserId};

use crate::error::StorageError;

struct Wrapper(StoredUser);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let username: String = row.try_get("username")?;
        let password_hash: String = row.try_get("password_hash")?;
        let role_text: String = row.try_get("role")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        let role = Role::from_str(&role_text).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();
        let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(StoredUser {
            user: User {
                id: UserId::from_uuid(id),
                username,
                role,
                created_at,
                updated_at,
            },
            password_hash,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO users (id, username, password_hash, role, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_BY_USERNAME: &str = "SELECT * FROM users WHERE username = ?";
const SELECT_ALL: &str = "SELECT * FROM users ORDER BY username";
const UPDATE_PASSWORD: &str =
    "UPDATE users SET password_hash = ?, updated_at = ? WHERE username = ?";
const DELETE: &str = "DELETE FROM users WHERE username = ?";
const COUNT: &str = "SELECT COUNT(*) FROM users";

/// `SQLite`-backed user repository.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, HomeLinkError> {
        let ts = now();
        let user = User {
            id: UserId::new(),
            username: new_user.username,
            role: new_user.role,
            created_at: ts,
            updated_at: ts,
        };

        sqlx::query(INSERT)
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(&new_user.password_hash)
            .bind(user.role.to_string())
            .bind(user.created_at.to_rfc3339())
            .bind(user.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, HomeLinkError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn get_all(&self) -> Result<Vec<User>, HomeLinkError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0.user).collect())
    }

    async fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, HomeLinkError> {
        let result = sqlx::query(UPDATE_PASSWORD)
            .bind(password_hash)
            .bind(now().to_rfc3339())
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, username: &str) -> Result<bool, HomeLinkError> {
        let result = sqlx::query(DELETE)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, HomeLinkError> {
        let count: i64 = sqlx::query_scalar(COUNT)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
