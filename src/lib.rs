pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{http::ReqwestGateway, reporter::RecordingErrorReporter};
pub use core::{moosend::MoosendConnector, runner::IntegrationRunner};
pub use utils::error::{IntegrationError, Result};
