use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::api::{ApiClient, ClientConfig};
use super::error::ClientError;
use super::state::{reduce, CacheState, Event, StatusFilter};
use crate::models::{CreateTodo, Todo, UpdateTodo};

/// Shared client-side store of todos.
///
/// Cloning is cheap and every clone observes the same state. Operations issue
/// one REST call each and apply exactly one transition when it completes.
/// Overlapping calls for the same id are not sequenced: the response that
/// arrives last determines the cached record.
#[derive(Clone)]
pub struct TodoCache {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    state: watch::Sender<CacheState>,
    error_timer: Mutex<ErrorTimer>,
    error_display: Duration,
}

/// Auto-dismiss timer for the current error banner. `generation` changes
/// whenever the banner is replaced or dropped, so a timer that already woke
/// up can tell it is stale.
#[derive(Default)]
struct ErrorTimer {
    generation: u64,
    handle: Option<AbortHandle>,
}

impl ErrorTimer {
    fn cancel(&mut self) -> u64 {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation
    }
}

impl Inner {
    fn dispatch(&self, event: Event) {
        debug!(?event, "applying cache transition");
        self.state.send_modify(|state| *state = reduce(state, event));
    }

    fn timer(&self) -> MutexGuard<'_, ErrorTimer> {
        self.error_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn expire_error(&self, generation: u64) {
        let mut timer = self.timer();
        if timer.generation == generation {
            timer.handle = None;
            self.dispatch(Event::ErrorCleared);
        }
    }
}

impl TodoCache {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_api(ApiClient::new(config)?, config.error_display))
    }

    pub fn with_api(api: ApiClient, error_display: Duration) -> Self {
        let (state, _) = watch::channel(CacheState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                error_timer: Mutex::new(ErrorTimer::default()),
                error_display,
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CacheState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified after every transition.
    pub fn subscribe(&self) -> watch::Receiver<CacheState> {
        self.inner.state.subscribe()
    }

    /// Cached todos matching the current filter.
    pub fn visible_todos(&self) -> Vec<Todo> {
        self.inner
            .state
            .borrow()
            .visible_todos()
            .into_iter()
            .cloned()
            .collect()
    }

    fn begin_request(&self) {
        let mut timer = self.inner.timer();
        timer.cancel();
        self.inner.dispatch(Event::Requested);
    }

    fn fail(&self, err: &ClientError) {
        warn!(error = %err, "todo request failed");

        let mut timer = self.inner.timer();
        let generation = timer.cancel();
        self.inner.dispatch(Event::Failed(err.messages()));

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.error_display;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                inner.expire_error(generation);
            }
        });
        timer.handle = Some(task.abort_handle());
    }

    /// Reloads the whole collection. Failures only land in `error`.
    pub async fn load_todos(&self) {
        self.begin_request();
        match self.inner.api.list_todos().await {
            Ok(todos) => self.inner.dispatch(Event::TodosLoaded(todos)),
            Err(err) => self.fail(&err),
        }
    }

    /// Fetches one todo into `current_todo`.
    ///
    /// Refetching the todo that is already current skips the loading phase so
    /// the edit view does not flicker; the response still replaces it.
    pub async fn load_todo(&self, id: i64) -> Result<Todo, ClientError> {
        let already_current = self
            .inner
            .state
            .borrow()
            .current_todo
            .as_ref()
            .is_some_and(|todo| todo.id == id);
        if !already_current {
            self.begin_request();
        }

        match self.inner.api.get_todo(id).await {
            Ok(todo) => {
                self.inner.dispatch(Event::TodoLoaded(todo.clone()));
                Ok(todo)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn create_todo(&self, req: &CreateTodo) -> Result<Todo, ClientError> {
        self.begin_request();
        match self.inner.api.create_todo(req).await {
            Ok(todo) => {
                self.inner.dispatch(Event::TodoCreated(todo.clone()));
                Ok(todo)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn update_todo(&self, id: i64, req: &UpdateTodo) -> Result<Todo, ClientError> {
        self.begin_request();
        match self.inner.api.update_todo(id, req).await {
            Ok(todo) => {
                self.inner.dispatch(Event::TodoUpdated(todo.clone()));
                Ok(todo)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Deletes a todo. Failures only land in `error`.
    pub async fn delete_todo(&self, id: i64) {
        self.begin_request();
        match self.inner.api.delete_todo(id).await {
            Ok(id) => self.inner.dispatch(Event::TodoDeleted(id)),
            Err(err) => self.fail(&err),
        }
    }

    pub fn set_filter(&self, filter: StatusFilter) {
        self.inner.dispatch(Event::FilterChanged(filter));
    }

    /// Opens a todo the caller already holds, without a server call.
    pub fn set_current(&self, todo: Todo) {
        self.inner.dispatch(Event::CurrentSet(todo));
    }

    /// Called when the edit view is left, whatever is still in flight.
    pub fn clear_current(&self) {
        self.inner.dispatch(Event::CurrentCleared);
    }

    pub fn dismiss_error(&self) {
        let mut timer = self.inner.timer();
        timer.cancel();
        self.inner.dispatch(Event::ErrorCleared);
    }
}
