use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use boorubot::application::{ImageFetchService, PurgeMessagesUseCase, SearchImagesUseCase};
use boorubot::domain::{BotToken, DiscordPort};
use boorubot::infrastructure::{
    BooruClient, BotConfig, CliArgs, DiscordClient, GatewayClient, StorageManager,
};
use boorubot::presentation::{Bot, InteractionHandler};

fn init_logging(config: &BotConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<BotConfig> {
    let args = CliArgs::parse();

    let storage = match &args.config {
        Some(path) => StorageManager::with_dir(
            path.parent()
                .map(std::path::Path::to_path_buf)
                .unwrap_or_default(),
        ),
        None => StorageManager::new()?,
    };
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);

    Ok(config)
}

fn create_bot(config: &BotConfig, token: &BotToken) -> Result<Bot> {
    let discord: Arc<dyn DiscordPort> = Arc::new(
        DiscordClient::new(token.clone(), config.http.timeout())
            .wrap_err("failed to build Discord client")?,
    );
    let booru = Arc::new(BooruClient::new(config.booru_settings()));

    let handler = InteractionHandler::new(
        Arc::clone(&discord),
        SearchImagesUseCase::new(ImageFetchService::new(booru)),
        PurgeMessagesUseCase::new(Arc::clone(&discord)),
        config.search.default_provider,
    );

    Ok(Bot::new(
        GatewayClient::with_default_config(),
        discord,
        handler,
        config.commands.register_on_ready,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();

    let config = load_config()?;
    init_logging(&config)?;

    info!(
        version = boorubot::VERSION,
        config_path = ?config.effective_config_path(),
        "Starting {}",
        boorubot::NAME
    );

    let token = config
        .token
        .as_deref()
        .and_then(BotToken::new)
        .ok_or_else(|| eyre!("DISCORD_TOKEN is missing or malformed"))?;

    let bot = create_bot(&config, &token)?;
    bot.run(&token).await?;

    Ok(())
}
