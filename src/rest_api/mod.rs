//! REST API over the deployer operations

mod dto;
mod handlers;
mod server;

pub use dto::{ErrorResponse, HealthResponse, ListResponse};
pub use handlers::ApiError;
pub use server::{router, run_server, AppState};
