pub mod config;
mod error;
mod extract;
mod http_layers;
mod persons;
mod pieces;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use http_layers::*;
pub use server::{make_app, run_server};
