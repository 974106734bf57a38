use crate::{
    database::{MongoDB, USERS_COLLECTION},
    models::User,
    utils::AppError,
};
use async_trait::async_trait;
use mongodb::bson::doc;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub const EMAIL_TAKEN: &str = "Email already registered";

/// Persistence for user accounts. Users are created and read, never updated.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, AppError>;
    /// Fails with `AppError::Conflict` when the e-mail is already taken.
    async fn insert(&self, user: User) -> Result<User, AppError>;

    /// Backend name reported by `/health`.
    fn backend(&self) -> &'static str;
}

pub struct MongoUserStore {
    db: MongoDB,
}

impl MongoUserStore {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let collection = self.db.collection::<User>(USERS_COLLECTION);
        Ok(collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let collection = self.db.collection::<User>(USERS_COLLECTION);
        Ok(collection.find_one(doc! { "user_id": user_id }).await?)
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let collection = self.db.collection::<User>(USERS_COLLECTION);

        // The unique index closes the gap left by the pre-insert lookup
        match collection.insert_one(&user).await {
            Ok(result) => {
                user._id = result.inserted_id.as_object_id();
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(EMAIL_TAKEN.to_string())),
            Err(e) => Err(AppError::Database(format!("Failed to create user: {}", e))),
        }
    }
}

/// Process-local store, used with `USER_STORE=memory` and in tests.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }
        users.insert(user.user_id.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FavoriteApp, NewUser, UserType};

    fn user(id: &str, email: &str) -> User {
        NewUser {
            name: "Bruno".to_string(),
            email: email.to_string(),
            cellphone: "21988887777".to_string(),
            password_hash: "hash".to_string(),
            favorite_app: FavoriteApp::NinetyNine,
            user_type: UserType::Passenger,
        }
        .into_user(id.to_string())
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryUserStore::new();
        store.insert(user("u1", "bruno@triap.com")).await.unwrap();

        let by_email = store.find_by_email("bruno@triap.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.user_id), Some("u1".to_string()));

        let by_id = store.find_by_id("u1").await.unwrap();
        assert_eq!(by_id.map(|u| u.email), Some("bruno@triap.com".to_string()));

        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = InMemoryUserStore::new();
        store.insert(user("u1", "bruno@triap.com")).await.unwrap();

        let err = store.insert(user("u2", "bruno@triap.com")).await.unwrap_err();
        assert_eq!(err, AppError::Conflict(EMAIL_TAKEN.to_string()));
    }
}
