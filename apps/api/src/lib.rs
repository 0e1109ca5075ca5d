//! Gerbil HTTP API.
//!
//! The binary in `main.rs` loads [`ApiConfig`], builds an [`AppState`] and
//! serves [`build_router`]. Tests and the contract suite build the same router
//! over in-memory storage with [`build_memory_state`].

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

pub use api_config::{ApiConfig, StorageBackend, init_tracing};
pub use api_router::build_router;
pub use api_services::{build_app_state, build_memory_state, connect_and_migrate};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::AppState;
