use crate::db::{Database, StoreError};
use crate::models::todo::{Category, Todo};
use bincode::{Decode, Encode};
use std::str;
use tracing::info;

const TODOS_TREE: &str = "todos";
const OWNER_INDEX_TREE: &str = "todo_owner_index";

#[derive(Debug, Encode, Decode)]
pub struct StoredTodo {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub completed: bool,
    pub category: String,
    pub due_date: Option<i64>,
    pub created_at: i64, // Store as timestamp
}

impl From<Todo> for StoredTodo {
    fn from(todo: Todo) -> Self {
        StoredTodo {
            id: todo.id,
            user_id: todo.user_id,
            text: todo.text,
            completed: todo.completed,
            category: todo.category.as_str().to_string(),
            due_date: todo.due_date.map(|d| d.timestamp()),
            created_at: todo.created_at.timestamp(),
        }
    }
}

impl From<StoredTodo> for Todo {
    fn from(stored: StoredTodo) -> Self {
        Todo {
            id: stored.id,
            user_id: stored.user_id,
            text: stored.text,
            completed: stored.completed,
            category: Category::parse(&stored.category).unwrap_or_default(),
            due_date: stored
                .due_date
                .and_then(|t| chrono::DateTime::from_timestamp(t, 0)),
            created_at: chrono::DateTime::from_timestamp(stored.created_at, 0)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}

/// Index key scoping a todo to its owner; prefix scans over
/// `{user_id}:` yield exactly that user's todos.
fn owner_index_key(user_id: &str, todo_id: &str) -> String {
    format!("{}:{}", user_id, todo_id)
}

pub struct TodoRepository {
    db: Database,
}

impl TodoRepository {
    pub fn new(db: Database) -> Self {
        TodoRepository { db }
    }

    pub async fn create(&self, todo: Todo) -> Result<Todo, StoreError> {
        let todos_tree = self.db.db.open_tree(TODOS_TREE)?;
        let owner_index = self.db.db.open_tree(OWNER_INDEX_TREE)?;

        let stored_todo = StoredTodo::from(todo.clone());
        let encoded = bincode::encode_to_vec(&stored_todo, bincode::config::standard())?;

        todos_tree.insert(todo.id.as_bytes(), encoded.as_slice())?;
        owner_index.insert(
            owner_index_key(&todo.user_id, &todo.id).as_bytes(),
            todo.id.as_bytes(),
        )?;

        info!(todo_id = %todo.id, user_id = %todo.user_id, "Todo created in database");

        Ok(todo)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let todos_tree = self.db.db.open_tree(TODOS_TREE)?;

        match todos_tree.get(id.as_bytes())? {
            Some(data) => {
                let (stored_todo, _): (StoredTodo, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                Ok(Some(Todo::from(stored_todo)))
            }
            None => Ok(None),
        }
    }

    /// All todos belonging to one owner, oldest first. Scoping happens
    /// here by key prefix; no caller-supplied filter can widen it.
    pub async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Todo>, StoreError> {
        let owner_index = self.db.db.open_tree(OWNER_INDEX_TREE)?;

        let mut todos = Vec::new();
        let prefix = format!("{}:", user_id);
        for entry in owner_index.scan_prefix(prefix.as_bytes()) {
            let (_, todo_id) = entry?;
            let id = str::from_utf8(&todo_id)
                .map_err(|e| StoreError::CorruptIndex(e.to_string()))?;
            if let Some(todo) = self.get_by_id(id).await? {
                todos.push(todo);
            }
        }

        todos.sort_by_key(|t| t.created_at);
        Ok(todos)
    }

    /// Overwrite an existing todo. The id and owner never change, so the
    /// owner index entry stays valid.
    pub async fn update(&self, todo: Todo) -> Result<Todo, StoreError> {
        let todos_tree = self.db.db.open_tree(TODOS_TREE)?;

        let stored_todo = StoredTodo::from(todo.clone());
        let encoded = bincode::encode_to_vec(&stored_todo, bincode::config::standard())?;

        todos_tree.insert(todo.id.as_bytes(), encoded.as_slice())?;

        info!(todo_id = %todo.id, user_id = %todo.user_id, "Todo updated in database");

        Ok(todo)
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        let todos_tree = self.db.db.open_tree(TODOS_TREE)?;
        let owner_index = self.db.db.open_tree(OWNER_INDEX_TREE)?;

        let removed = todos_tree.remove(id.as_bytes())?.is_some();
        owner_index.remove(owner_index_key(user_id, id).as_bytes())?;

        if removed {
            info!(todo_id = %id, user_id = %user_id, "Todo deleted from database");
        }

        Ok(removed)
    }
}
