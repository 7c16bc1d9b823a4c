use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "moosend-connector")]
#[command(about = "Sync form submissions to Moosend mailing lists")]
pub struct CliConfig {
    #[arg(long, short, help = "Path to the TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "MOOSEND_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, help = "Mailing list that receives new subscribers")]
    pub list_id: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List mailing lists and their fields
    Lists,
    /// Check that the API key can reach Moosend
    Check,
    /// Send one submission (JSON file) to the configured list
    Subscribe {
        #[arg(long)]
        submission: PathBuf,
    },
}

impl CliConfig {
    /// 讀取配置檔並套用命令列覆蓋值
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::new(String::new()),
        };

        Ok(settings.with_overrides(self.api_key.clone(), self.list_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;

    #[test]
    fn test_parse_subscribe_command() {
        let cli = CliConfig::try_parse_from([
            "moosend-connector",
            "--api-key",
            "k",
            "--list-id",
            "L1",
            "subscribe",
            "--submission",
            "entry.json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Subscribe { .. }));

        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.api_key(), "k");
        assert_eq!(settings.list_id(), Some("L1"));
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliConfig::try_parse_from([
            "moosend-connector",
            "--config",
            "/nonexistent/moosend.toml",
            "check",
        ])
        .unwrap();

        assert!(cli.load_settings().is_err());
    }
}
