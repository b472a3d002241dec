use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Task categories. Unknown values fail deserialization, which surfaces
/// as a 400 before any handler code runs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
pub enum Category {
    #[default]
    General,
    Work,
    Personal,
    Shopping,
    Health,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "General" => Some(Category::General),
            "Work" => Some(Category::Work),
            "Personal" => Some(Category::Personal),
            "Shopping" => Some(Category::Shopping),
            "Health" => Some(Category::Health),
            _ => None,
        }
    }
}

/// A task record. `user_id` is stamped from the verified caller identity
/// at creation and is the only identity allowed to mutate or delete it.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub completed: bool,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
