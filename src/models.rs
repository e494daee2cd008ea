use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Message attached to the `title` field whenever it is missing or blank.
pub const TITLE_REQUIRED: &str = "Title is required";

/// Field name to message, as carried by validation failures on the wire.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [
        TodoStatus::Pending,
        TodoStatus::InProgress,
        TodoStatus::Completed,
    ];

    /// Wire literal, e.g. `in-progress`.
    pub fn as_str(self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in-progress",
            TodoStatus::Completed => "completed",
        }
    }

    /// Human-readable label for list rows and filter tabs.
    pub fn label(self) -> &'static str {
        match self {
            TodoStatus::Pending => "Pending",
            TodoStatus::InProgress => "In Progress",
            TodoStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid status")]
pub struct UnknownStatus(pub String);

impl FromStr for TodoStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TodoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TodoStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Body of `POST /todos`. Fields stay loosely typed so that every problem can
/// be reported against the field it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn validate(&self) -> Result<TodoFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = check_title(self.title.as_deref().unwrap_or_default(), &mut errors);
        let status = match self.status.as_deref() {
            Some(raw) => check_status(raw, &mut errors),
            None => TodoStatus::default(),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TodoFields {
            title,
            description: self.description.as_deref().map(|d| d.trim().to_string()),
            status,
        })
    }
}

/// Body of `PUT /todos/{id}`. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl UpdateTodo {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// Applies the update onto `current` and validates the merged record with
    /// the same rules as creation.
    pub fn merge_onto(&self, current: &Todo) -> Result<TodoFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = check_title(self.title.as_deref().unwrap_or(&current.title), &mut errors);
        let status = match self.status.as_deref() {
            Some(raw) => check_status(raw, &mut errors),
            None => current.status,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let description = match self.description.as_deref() {
            Some(d) => Some(d.trim().to_string()),
            None => current.description.clone(),
        };

        Ok(TodoFields {
            title,
            description,
            status,
        })
    }
}

/// The mutable part of a todo after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFields {
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
}

/// Success envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Confirmation returned by `DELETE /todos/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: i64,
}

/// Returns the field-level message for a title, if it is not acceptable.
pub fn title_error(title: &str) -> Option<&'static str> {
    if title.trim().is_empty() {
        Some(TITLE_REQUIRED)
    } else {
        None
    }
}

fn check_title(raw: &str, errors: &mut FieldErrors) -> String {
    if let Some(message) = title_error(raw) {
        errors.insert("title".to_string(), message.to_string());
    }
    raw.trim().to_string()
}

fn check_status(raw: &str, errors: &mut FieldErrors) -> TodoStatus {
    raw.parse().unwrap_or_else(|err: UnknownStatus| {
        errors.insert("status".to_string(), err.to_string());
        TodoStatus::default()
    })
}
