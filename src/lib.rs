pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{cli::LocalStorage, settings::Settings, CliConfig, RunMode};
pub use crate::core::{client::ImageClient, generator::ImageGenerator, manifest::Manifest};
pub use crate::utils::error::{ImageGenError, Result};
