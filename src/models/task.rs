use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Completed,
}

/// Input structure for creating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,

    /// The initial status of the task.
    pub status: TaskStatus,
}

/// Partial update for a task.
///
/// Field presence is tracked explicitly rather than inferred from values.
/// Plain `Option<T>` fields are "absent or set". Clearable fields use
/// `Option<Option<T>>`: the outer level records whether the field appeared
/// in the request body at all, the inner level carries an explicit `null`.
/// Sending `{"description": null}` clears the description; omitting the key
/// leaves it untouched. An empty string is a value like any other and is
/// subject to the usual length rules.
#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_task_update"))]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "explicit_null")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    pub status: Option<TaskStatus>,
}

/// Deserializes a field so that an explicit JSON `null` is distinguishable
/// from the key being absent. Combined with `#[serde(default)]`: absent
/// yields `None`, `null` yields `Some(None)`, a value yields `Some(Some(v))`.
fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// The length rule for the clearable description lives here because the
// derive's length validator does not reach through the presence wrapper.
fn validate_task_update(update: &TaskUpdate) -> Result<(), ValidationError> {
    if let Some(Some(text)) = &update.description {
        if text.chars().count() > 1000 {
            return Err(ValidationError::new("description_too_long"));
        }
    }
    Ok(())
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// The current status of the task.
    pub status: TaskStatus,
    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Filter tasks by status.
    pub status: Option<TaskStatus>,
    /// Search term to filter tasks by title or description (case-insensitive).
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` instance from `TaskInput` and the owner's `user_id`.
    ///
    /// The owner always comes from the resolved identity of the caller;
    /// there is no way for a request body to pick a different owner.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// Applies a partial update in place and bumps `updated_at`.
    ///
    /// Only fields present in the request change. For clearable fields an
    /// explicit `null` resets them to `None`.
    pub fn apply_update(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}
