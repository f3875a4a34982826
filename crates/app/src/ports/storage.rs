//! Storage port — repository trait for user persistence.

use std::future::Future;

use homelink_domain::error::HomeLinkError;
use homelink_domain::user::{Role, User};

/// Input for creating a user. The password is hashed by the service before
/// it reaches the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// A user together with its stored credential hash.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Repository for persisting and querying users.
pub trait UserRepository {
    /// Persist a new user.
    fn create(&self, new_user: NewUser) -> impl Future<Output = Result<User, HomeLinkError>> + Send;

    /// Look up a user (with credential hash) by username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<StoredUser>, HomeLinkError>> + Send;

    /// All users, without credential material.
    fn get_all(&self) -> impl Future<Output = Result<Vec<User>, HomeLinkError>> + Send;

    /// Replace a user's password hash. Returns `false` when no such user.
    fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool, HomeLinkError>> + Send;

    /// Delete a user by username. Returns `false` when no such user.
    fn delete(&self, username: &str) -> impl Future<Output = Result<bool, HomeLinkError>> + Send;

    /// Number of stored users.
    fn count(&self) -> impl Future<Output = Result<u64, HomeLinkError>> + Send;
}

impl<T: UserRepository + Send + Sync> UserRepository for std::sync::Arc<T> {
    fn create(&self, new_user: NewUser) -> impl Future<Output = Result<User, HomeLinkError>> + Send {
        (**self).create(new_user)
    }

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<StoredUser>, HomeLinkError>> + Send {
        (**self).find_by_username(username)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<User>, HomeLinkError>> + Send {
        (**self).get_all()
    }

    fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool, HomeLinkError>> + Send {
        (**self).update_password(username, password_hash)
    }

    fn delete(&self, username: &str) -> impl Future<Output = Result<bool, HomeLinkError>> + Send {
        (**self).delete(username)
    }

    fn count(&self) -> impl Future<Output = Result<u64, HomeLinkError>> + Send {
        (**self).count()
    }
}
