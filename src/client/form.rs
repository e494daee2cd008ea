use super::cache::TodoCache;
use super::error::{ClientError, ErrorMessages};
use crate::models::{title_error, CreateTodo, FieldErrors, Todo, TodoStatus, UpdateTodo};

/// Form state behind the add and edit views.
///
/// The title error is recomputed on every edit, so it is visible before the
/// form is ever submitted. Field errors returned by the server are copied
/// back onto the form after a rejected submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    errors: FieldErrors,
}

impl TodoForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            status: todo.status,
            errors: FieldErrors::new(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.check_title();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.errors.remove("description");
    }

    pub fn set_status(&mut self, status: TodoStatus) {
        self.status = status;
        self.errors.remove("status");
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn check_title(&mut self) {
        match title_error(&self.title) {
            Some(message) => {
                self.errors.insert("title".to_string(), message.to_string());
            }
            None => {
                self.errors.remove("title");
            }
        }
    }

    /// Drops errors from an earlier submit and re-checks the title.
    fn revalidate(&mut self) {
        self.errors.clear();
        self.check_title();
    }

    fn local_rejection(&self) -> ClientError {
        ClientError::Validation {
            messages: ErrorMessages::from(self.errors.values().cloned().collect::<Vec<_>>()),
            fields: self.errors.clone(),
        }
    }

    /// Copies server-side field errors onto the form.
    pub fn absorb(&mut self, err: &ClientError) {
        if let Some(fields) = err.field_errors() {
            self.errors
                .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    pub fn to_create(&self) -> CreateTodo {
        CreateTodo::new(self.title.as_str())
            .description(self.description.as_str())
            .status(self.status)
    }

    pub fn to_update(&self) -> UpdateTodo {
        UpdateTodo::default()
            .title(self.title.as_str())
            .description(self.description.as_str())
            .status(self.status)
    }

    /// Submits as a new todo. An invalid title is rejected locally and never
    /// reaches the server.
    pub async fn submit_create(&mut self, cache: &TodoCache) -> Result<Todo, ClientError> {
        self.revalidate();
        if !self.is_valid() {
            return Err(self.local_rejection());
        }
        let result = cache.create_todo(&self.to_create()).await;
        if let Err(err) = &result {
            self.absorb(err);
        }
        result
    }

    pub async fn submit_update(&mut self, cache: &TodoCache, id: i64) -> Result<Todo, ClientError> {
        self.revalidate();
        if !self.is_valid() {
            return Err(self.local_rejection());
        }
        let result = cache.update_todo(id, &self.to_update()).await;
        if let Err(err) = &result {
            self.absorb(err);
        }
        result
    }
}
