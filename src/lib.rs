pub mod api; // HTTP layer: JSON API + server-rendered pages
pub mod cart;
pub mod config;
pub mod core_state; // Transport-agnostic state
pub mod models;
pub mod scan; // Label photo → text → candidate fields
pub mod schedule;
pub mod store;
