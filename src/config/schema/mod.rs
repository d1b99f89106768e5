mod core;
mod gateway;
mod limits;
mod smtp;

pub use core::{ClientConfig, Config};
pub use gateway::GatewayConfig;
pub use limits::{CompressionConfig, LimitsConfig};
pub use smtp::{SmtpConfig, SmtpSettings};
