pub mod cli;
pub mod settings;
pub mod toml_config;

use crate::utils::error::{ImageGenError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::Parser;

pub const USAGE_HINT: &str =
    "Provide either: <prompt> <output> for single mode, or --prompts prompts.json for batch mode";

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "imagegen")]
#[command(about = "Generate images from text prompts via the whomeai image API")]
#[command(version)]
pub struct CliConfig {
    /// Text prompt describing the desired image (single mode)
    pub prompt: Option<String>,

    /// Output image filename (single mode, .png is appended if missing)
    pub output: Option<String>,

    /// JSON array of {name, prompt} objects; images go to <images-dir>/<name>.png
    #[arg(long = "prompts", value_name = "FILE")]
    pub prompts_file: Option<String>,

    /// Bearer token (defaults to env WHOMEAI_API_KEY or 'sk-demo')
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model to use for text-to-image
    #[arg(long)]
    pub model: Option<String>,

    /// Image size as <width>x<height>
    #[arg(long)]
    pub size: Option<String>,

    /// Image generation endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// Output directory for batch mode
    #[arg(long)]
    pub images_dir: Option<String>,

    /// Seconds to wait between batch requests
    #[arg(long, value_name = "SECS")]
    pub delay: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail immediately on HTTP 429 instead of waiting and retrying once
    #[arg(long)]
    pub no_retry: bool,

    /// TOML file supplying defaults for the options above
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Single { prompt: String, output: String },
    Batch { prompts_file: String },
}

impl CliConfig {
    /// `--prompts` 優先；否則 prompt 與 output 缺一不可
    pub fn mode(&self) -> Result<RunMode> {
        if let Some(prompts_file) = &self.prompts_file {
            return Ok(RunMode::Batch {
                prompts_file: prompts_file.clone(),
            });
        }

        match (self.prompt.as_deref(), self.output.as_deref()) {
            (Some(prompt), Some(output)) if !prompt.is_empty() && !output.is_empty() => {
                Ok(RunMode::Single {
                    prompt: prompt.to_string(),
                    output: output.to_string(),
                })
            }
            _ => Err(ImageGenError::usage(USAGE_HINT)),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match self.mode()? {
            RunMode::Single { prompt, output } => {
                validate_non_empty_string("prompt", &prompt)?;
                validate_path("output", &output)?;
            }
            RunMode::Batch { prompts_file } => validate_path("prompts", &prompts_file)?,
        }

        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_mode() {
        let cli = CliConfig::parse_from(["imagegen", "a red fox", "fox"]);
        assert_eq!(
            cli.mode().unwrap(),
            RunMode::Single {
                prompt: "a red fox".into(),
                output: "fox".into()
            }
        );
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_parse_batch_mode_with_flags() {
        let cli = CliConfig::parse_from([
            "imagegen",
            "--prompts",
            "prompts.json",
            "--api-key",
            "sk-test",
            "--model",
            "nano-banana",
            "--delay",
            "0",
        ]);
        assert_eq!(
            cli.mode().unwrap(),
            RunMode::Batch {
                prompts_file: "prompts.json".into()
            }
        );
        assert_eq!(cli.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cli.delay, Some(0));
    }

    #[test]
    fn test_prompts_flag_wins_over_positionals() {
        let cli = CliConfig::parse_from(["imagegen", "a prompt", "out", "--prompts", "p.json"]);
        assert!(matches!(cli.mode().unwrap(), RunMode::Batch { .. }));
    }

    #[test]
    fn test_missing_output_is_usage_error() {
        let cli = CliConfig::parse_from(["imagegen", "only a prompt"]);
        let err = cli.mode().unwrap_err();
        assert_eq!(err.to_string(), USAGE_HINT);

        let cli = CliConfig::parse_from(["imagegen"]);
        assert!(cli.validate().is_err());
    }
}
