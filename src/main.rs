use clap::Parser;
use imagegen::config::toml_config::FileConfig;
use imagegen::utils::{logger, validation::Validate};
use imagegen::{
    CliConfig, ImageClient, ImageGenerator, LocalStorage, Manifest, RunMode, Settings,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("Starting imagegen");

    let result = tokio::select! {
        result = run(config) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted by user");
            std::process::exit(130);
        }
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ imagegen failed: {} (Category: {:?})",
            e,
            e.category()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
}

async fn run(config: CliConfig) -> imagegen::Result<()> {
    // 驗證配置
    config.validate()?;
    let mode = config.mode()?;

    let file_config = config
        .config
        .as_deref()
        .map(|path| FileConfig::from_file(path))
        .transpose()?;
    let settings = Settings::resolve(&config, file_config.as_ref());
    settings.validate()?;

    tracing::debug!(
        "Resolved settings: url={}, model={}, size={}, timeout={}s, retry_on_429={}",
        settings.api_url,
        settings.model,
        settings.size,
        settings.timeout_secs,
        settings.retry_on_rate_limit
    );

    match mode {
        RunMode::Batch { prompts_file } => {
            // 整份 manifest 先驗證完畢，才建立目錄與發出請求
            let manifest = Manifest::load(&prompts_file)?;
            tracing::info!(
                "📁 Loaded {} prompts from {}",
                manifest.len(),
                manifest.path.display()
            );

            std::fs::create_dir_all(&settings.images_dir)?;
            let client = ImageClient::new(&settings)?;
            let storage = LocalStorage::new(&settings.images_dir);
            let generator = ImageGenerator::new(client, storage)
                .with_batch_delay(settings.batch_delay_secs);

            generator.generate_batch(&manifest).await?;
        }
        RunMode::Single { prompt, output } => {
            let client = ImageClient::new(&settings)?;
            let generator = ImageGenerator::new(client, LocalStorage::current_dir()?);

            let saved = generator.generate_single(&prompt, &output).await?;
            println!("{}", saved.display());
        }
    }

    Ok(())
}
