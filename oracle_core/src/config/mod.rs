pub mod config_check;
pub mod oracle_config;

pub use config_check::ConfigWithCheck;
pub use oracle_config::OracleConfig;
