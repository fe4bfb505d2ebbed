pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod mail;
pub mod media;
pub mod metrics;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use router::app_router;
pub use state::AppState;
