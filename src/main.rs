use genstudio::{config::Config, logger, server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    if config.gemini.api_key.is_none() {
        log::error!("No Gemini API key set (GEMINI_API_KEY); generation endpoints will answer 500");
    }

    server::run(config).await?;
    Ok(())
}
