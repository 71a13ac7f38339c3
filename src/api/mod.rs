//! HTTP layer: JSON API plus server-rendered pages.
//!
//! Routes are nested under `/api/` for data and mounted at the root
//! for HTML views. The router is composable — `app_router()` returns
//! a `Router` that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod pages;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_server, AppServer};
pub use types::ApiContext;
