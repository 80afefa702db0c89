use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "portfolio-ui")]
#[command(about = "Replay UI event scripts against a portfolio page and print the resulting state")]
pub struct CliArgs {
    /// Page document (JSON element tree)
    #[arg(long)]
    pub page: String,

    /// Event script (JSON array of events)
    #[arg(long)]
    pub events: Option<String>,

    /// Site configuration (TOML); built-in defaults when omitted
    #[arg(long)]
    pub config: Option<String>,

    /// Override the theme storage file from the configuration
    #[arg(long)]
    pub theme_file: Option<String>,

    /// Send contact submissions for real instead of only validating them
    #[arg(long)]
    pub send: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        validate_path("page", &self.page)?;
        if let Some(events) = &self.events {
            validate_path("events", events)?;
        }
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        if let Some(theme_file) = &self.theme_file {
            validate_path("theme_file", theme_file)?;
        }
        Ok(())
    }
}
