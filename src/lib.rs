pub mod api;
pub mod config;
pub mod error;
pub mod food;
pub mod providers;

pub use config::GatewayConfig;
pub use error::{ApiError, ErrorEnvelope, Fault};
