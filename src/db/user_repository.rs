use crate::db::{Database, StoreError};
use crate::models::user::User;
use bincode::{Decode, Encode};
use std::str;
use tracing::info;

const USERS_TREE: &str = "users";
const EMAIL_INDEX_TREE: &str = "email_index";

#[derive(Debug, Encode, Decode)]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64, // Store as timestamp
}

impl From<User> for StoredUser {
    fn from(user: User) -> Self {
        StoredUser {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at.timestamp(),
        }
    }
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        User {
            id: stored.id,
            name: stored.name,
            email: stored.email,
            password_hash: stored.password_hash,
            created_at: chrono::DateTime::from_timestamp(stored.created_at, 0)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}

pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        UserRepository { db }
    }

    /// Insert a new user. Email uniqueness is enforced here against the
    /// email index, which is the authoritative duplicate check.
    pub async fn create(&self, user: User) -> Result<User, StoreError> {
        let users_tree = self.db.db.open_tree(USERS_TREE)?;
        let email_index = self.db.db.open_tree(EMAIL_INDEX_TREE)?;

        if email_index.contains_key(user.email.as_bytes())? {
            return Err(StoreError::DuplicateEmail);
        }

        let stored_user = StoredUser::from(user.clone());
        let encoded = bincode::encode_to_vec(&stored_user, bincode::config::standard())?;

        users_tree.insert(user.id.as_bytes(), encoded.as_slice())?;
        email_index.insert(user.email.as_bytes(), user.id.as_bytes())?;

        info!(user_id = %user.id, email = %user.email, "User created in database");

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users_tree = self.db.db.open_tree(USERS_TREE)?;

        match users_tree.get(id.as_bytes())? {
            Some(data) => {
                let (stored_user, _): (StoredUser, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                Ok(Some(User::from(stored_user)))
            }
            None => Ok(None),
        }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email_index = self.db.db.open_tree(EMAIL_INDEX_TREE)?;

        match email_index.get(email.as_bytes())? {
            Some(user_id) => {
                let id = str::from_utf8(&user_id)
                    .map_err(|e| StoreError::CorruptIndex(e.to_string()))?;
                self.get_by_id(id).await
            }
            None => Ok(None),
        }
    }
}
