pub mod config;
mod framing;
pub mod protocol;
mod server;

pub use config::{ConfigError, ServerConfig, Transport};
pub use framing::MAX_BODY_BYTES;
pub use server::VentureServer;
