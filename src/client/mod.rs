//! Client-side cache of the todo collection, kept in step with the server
//! through the REST contract.

pub mod api;
pub mod cache;
pub mod error;
pub mod form;
pub mod state;

pub use api::{ApiClient, ClientConfig};
pub use cache::TodoCache;
pub use error::{ClientError, ErrorMessages};
pub use form::TodoForm;
pub use state::{reduce, visible_todos, CacheState, Event, StatusFilter};
