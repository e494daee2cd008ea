//! Client-side view of the todo collection and the reducer that drives it.
//!
//! Every change to [`CacheState`] goes through [`reduce`], which is a pure
//! function of the previous state and one [`Event`]. Events describe the
//! outcome of a server call (or a purely local UI action); nothing here
//! performs I/O.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ErrorMessages;
use crate::models::{Todo, TodoStatus, UnknownStatus};

/// Display filter over the cached todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, status: TodoStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == TodoStatus::Pending,
            StatusFilter::InProgress => status == TodoStatus::InProgress,
            StatusFilter::Completed => status == TodoStatus::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => TodoStatus::Pending.as_str(),
            StatusFilter::InProgress => TodoStatus::InProgress.as_str(),
            StatusFilter::Completed => TodoStatus::Completed.as_str(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Pending => TodoStatus::Pending.label(),
            StatusFilter::InProgress => TodoStatus::InProgress.label(),
            StatusFilter::Completed => TodoStatus::Completed.label(),
        }
    }
}

impl From<TodoStatus> for StatusFilter {
    fn from(status: TodoStatus) -> Self {
        match status {
            TodoStatus::Pending => StatusFilter::Pending,
            TodoStatus::InProgress => StatusFilter::InProgress,
            TodoStatus::Completed => StatusFilter::Completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse::<TodoStatus>().map(StatusFilter::from)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheState {
    pub todos: Vec<Todo>,
    /// The todo open in the edit view, if any.
    pub current_todo: Option<Todo>,
    pub loading: bool,
    pub error: Option<ErrorMessages>,
    pub filter_status: StatusFilter,
}

impl CacheState {
    pub fn visible_todos(&self) -> Vec<&Todo> {
        visible_todos(&self.todos, self.filter_status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A server call was issued.
    Requested,
    TodosLoaded(Vec<Todo>),
    TodoLoaded(Todo),
    TodoCreated(Todo),
    TodoUpdated(Todo),
    TodoDeleted(i64),
    Failed(ErrorMessages),
    FilterChanged(StatusFilter),
    CurrentSet(Todo),
    CurrentCleared,
    ErrorCleared,
}

pub fn reduce(state: &CacheState, event: Event) -> CacheState {
    let mut next = state.clone();
    match event {
        Event::Requested => {
            next.loading = true;
            next.error = None;
        }
        Event::TodosLoaded(todos) => {
            next.loading = false;
            next.todos = todos;
        }
        Event::TodoLoaded(todo) => {
            next.loading = false;
            next.current_todo = Some(todo);
        }
        Event::TodoCreated(todo) => {
            next.loading = false;
            // A list reload may already have delivered this record.
            match next.todos.iter_mut().find(|t| t.id == todo.id) {
                Some(existing) => *existing = todo,
                None => next.todos.push(todo),
            }
        }
        Event::TodoUpdated(todo) => {
            next.loading = false;
            if let Some(existing) = next.todos.iter_mut().find(|t| t.id == todo.id) {
                *existing = todo;
            }
            next.current_todo = None;
        }
        Event::TodoDeleted(id) => {
            next.loading = false;
            next.todos.retain(|t| t.id != id);
        }
        Event::Failed(messages) => {
            next.loading = false;
            next.error = Some(messages);
        }
        Event::FilterChanged(filter) => next.filter_status = filter,
        Event::CurrentSet(todo) => next.current_todo = Some(todo),
        Event::CurrentCleared => next.current_todo = None,
        Event::ErrorCleared => next.error = None,
    }
    next
}

/// Todos shown under `filter`, in cache order.
pub fn visible_todos(todos: &[Todo], filter: StatusFilter) -> Vec<&Todo> {
    todos.iter().filter(|t| filter.matches(t.status)).collect()
}
