use crate::config::toml_config::{DatasetConfig, GeneratorConfig, ServerConfig, TomlConfig};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "helpdesk.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "helpdesk")]
#[command(about = "University help-desk FAQ router: JSON API, web form and terminal chat")]
#[command(version)]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Dataset CSV file(s), replacing the configured list
    #[arg(long, global = true, value_delimiter = ',')]
    pub dataset: Vec<String>,

    /// Disable the language-model fallback
    #[arg(long, global = true)]
    pub no_llm: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the JSON API
    Api {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Serve the HTML form site
    Web {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Chat in the terminal
    Chat,
    /// Print the effective configuration as TOML
    ShowConfig,
}

impl CliConfig {
    /// Loads the configuration file (explicit, else `helpdesk.toml` if present, else defaults)
    /// and applies command line overrides.
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                TomlConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if !self.dataset.is_empty() {
            config
                .dataset
                .get_or_insert_with(DatasetConfig::default)
                .paths = Some(self.dataset.clone());
            tracing::info!("🔧 Dataset overridden to: {}", self.dataset.join(", "));
        }

        if self.no_llm {
            config
                .generator
                .get_or_insert_with(GeneratorConfig::default)
                .enabled = Some(false);
            tracing::info!("🔧 Language-model fallback disabled");
        }

        let (host, port, is_api) = match &self.command {
            Command::Api { host, port } => (host, port, true),
            Command::Web { host, port } => (host, port, false),
            Command::Chat | Command::ShowConfig => return,
        };
        let server = config.server.get_or_insert_with(ServerConfig::default);
        if let Some(host) = host {
            server.host = Some(host.clone());
        }
        if let Some(port) = port {
            if is_api {
                server.api_port = Some(*port);
            } else {
                server.web_port = Some(*port);
            }
        }
    }
}
