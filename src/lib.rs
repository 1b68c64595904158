//! Log ingestion service.
//!
//! Notification logs arrive as JSON frames on a WebSocket (`/ws/logs`), are
//! stored in MongoDB and pushed to every connected client. A small HTTP API
//! pages through stored logs and lets clients favorite or delete them.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod repositories;
pub mod services;
pub mod state;

pub use api::router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
