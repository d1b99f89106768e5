pub mod schema;

pub use schema::{
    ClientConfig, CompressionConfig, Config, GatewayConfig, LimitsConfig, SmtpConfig,
    SmtpSettings,
};
