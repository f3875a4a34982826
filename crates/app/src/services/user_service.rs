//! User service — credential storage use-cases.

use homelink_domain::error::{HomeLinkError, NotFoundError, ValidationError};
use homelink_domain::user::{Role, User};

use crate::ports::{NewUser, UserRepository};

/// Application service for user management.
pub struct UserService<R> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a user with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`HomeLinkError::Validation`] on empty fields or a duplicate
    /// username, or a storage error propagated from the repository.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, HomeLinkError> {
        if username.is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        if self.repo.find_by_username(username).await?.is_some() {
            return Err(ValidationError::DuplicateUsername.into());
        }

        let password_hash = hash_password(password)?;
        self.repo
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await
    }

    /// List all users, without credential material.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_users(&self) -> Result<Vec<User>, HomeLinkError> {
        self.repo.get_all().await
    }

    /// Replace a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`HomeLinkError::NotFound`] when the user does not exist, or
    /// [`HomeLinkError::Validation`] for an empty password.
    pub async fn change_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), HomeLinkError> {
        if new_password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        let password_hash = hash_password(new_password)?;
        if self.repo.update_password(username, &password_hash).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "User",
                id: username.to_string(),
            }
            .into())
        }
    }

    /// Delete a user by username.
    ///
    /// # Errors
    ///
    /// Returns [`HomeLinkError::NotFound`] when the user does not exist.
    pub async fn delete_user(&self, username: &str) -> Result<(), HomeLinkError> {
        if self.repo.delete(username).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "User",
                id: username.to_string(),
            }
            .into())
        }
    }

    /// Create the configured admin account when the store holds no users.
    ///
    /// Returns whether the account was created.
    ///
    /// # Errors
    ///
    /// Propagates creation and storage errors.
    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<bool, HomeLinkError> {
        if self.repo.count().await? > 0 {
            return Ok(false);
        }
        self.create_user(username, password, Role::Admin).await?;
        tracing::info!(username, "seeded default admin account");
        Ok(true)
    }
}

fn hash_password(password: &str) -> Result<String, HomeLinkError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|err| HomeLinkError::Credential(Box::new(err)))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    use homelink_domain::time::now;
    use homelink_domain::user::UserId;

    use crate::ports::StoredUser;

    use super::*;

    /// Shared in-memory repository for service tests.
    #[derive(Default)]
    pub(crate) struct InMemoryUserRepo {
        store: Mutex<HashMap<String, StoredUser>>,
    }

    impl UserRepository for InMemoryUserRepo {
        fn create(
            &self,
            new_user: NewUser,
        ) -> impl Future<Output = Result<User, HomeLinkError>> + Send {
            let ts = now();
            let user = User {
                id: UserId::new(),
                username: new_user.username.clone(),
                role: new_user.role,
                created_at: ts,
                updated_at: ts,
            };
            let mut store = self.store.lock().unwrap();
            store.insert(
                new_user.username,
                StoredUser {
                    user: user.clone(),
                    password_hash: new_user.password_hash,
                },
            );
            async { Ok(user) }
        }

        fn find_by_username(
            &self,
            username: &str,
        ) -> impl Future<Output = Result<Option<StoredUser>, HomeLinkError>> + Send {
            let store = self.store.lock().unwrap();
            let result = store.get(username).cloned();
            async { Ok(result) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<User>, HomeLinkError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<User> = store.values().map(|s| s.user.clone()).collect();
            async { Ok(result) }
        }

        fn update_password(
            &self,
            username: &str,
            password_hash: &str,
        ) -> impl Future<Output = Result<bool, HomeLinkError>> + Send {
            let mut store = self.store.lock().unwrap();
            let updated = match store.get_mut(username) {
                Some(stored) => {
                    stored.password_hash = password_hash.to_string();
                    stored.user.updated_at = now();
                    true
                }
                None => false,
            };
            async move { Ok(updated) }
        }

        fn delete(&self, username: &str) -> impl Future<Output = Result<bool, HomeLinkError>> + Send {
            let mut store = self.store.lock().unwrap();
            let removed = store.remove(username).is_some();
            async move { Ok(removed) }
        }

        fn count(&self) -> impl Future<Output = Result<u64, HomeLinkError>> + Send {
            let store = self.store.lock().unwrap();
            let len = store.len() as u64;
            async move { Ok(len) }
        }
    }

    fn make_service() -> UserService<InMemoryUserRepo> {
        UserService::new(InMemoryUserRepo::default())
    }

    #[tokio::test]
    async fn should_create_user_with_hashed_password() {
        let svc = make_service();

        let user = svc
            .create_user("lucas", "hunter2", Role::User)
            .await
            .unwrap();
        assert_eq!(user.username, "lucas");
        assert_eq!(user.role, Role::User);

        let stored = svc
            .repo
            .find_by_username("lucas")
            .await
            .unwrap()
            .expect("stored");
        assert_ne!(stored.password_hash, "hunter2");
        assert!(bcrypt::verify("hunter2", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn should_reject_empty_username_and_password() {
        let svc = make_service();

        let result = svc.create_user("", "secret", Role::User).await;
        assert!(matches!(
            result,
            Err(HomeLinkError::Validation(ValidationError::EmptyUsername))
        ));

        let result = svc.create_user("lucas", "", Role::User).await;
        assert!(matches!(
            result,
            Err(HomeLinkError::Validation(ValidationError::EmptyPassword))
        ));
    }

    #[tokio::test]
    async fn should_reject_duplicate_username() {
        let svc = make_service();
        svc.create_user("lucas", "secret", Role::User).await.unwrap();

        let result = svc.create_user("lucas", "other", Role::Admin).await;
        assert!(matches!(
            result,
            Err(HomeLinkError::Validation(ValidationError::DuplicateUsername))
        ));
    }

    #[tokio::test]
    async fn should_change_password_for_existing_user() {
        let svc = make_service();
        svc.create_user("lucas", "old", Role::User).await.unwrap();

        svc.change_password("lucas", "new").await.unwrap();

        let stored = svc
            .repo
            .find_by_username("lucas")
            .await
            .unwrap()
            .expect("stored");
        assert!(bcrypt::verify("new", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn should_return_not_found_when_changing_password_of_missing_user() {
        let svc = make_service();
        let result = svc.change_password("ghost", "new").await;
        assert!(matches!(result, Err(HomeLinkError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_user() {
        let svc = make_service();
        svc.create_user("lucas", "secret", Role::User).await.unwrap();

        svc.delete_user("lucas").await.unwrap();

        assert!(svc.list_users().await.unwrap().is_empty());
        let result = svc.delete_user("lucas").await;
        assert!(matches!(result, Err(HomeLinkError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_seed_admin_only_into_empty_store() {
        let svc = make_service();

        assert!(svc.seed_admin("admin", "changeme").await.unwrap());
        assert!(!svc.seed_admin("admin", "changeme").await.unwrap());

        let users = svc.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
    }
}
