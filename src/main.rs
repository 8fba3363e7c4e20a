use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use haircut_recommender::{handlers, AppState, Config};

#[derive(Parser)]
#[command(name = "haircut-recommender")]
#[command(version)]
#[command(about = "Serves haircut recommendations from a pre-trained classifier")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Dataset CSV path (overrides config file)
    #[arg(short, long, value_name = "PATH")]
    dataset: Option<String>,

    /// ONNX model path (overrides config file)
    #[arg(short, long, value_name = "PATH")]
    model: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!(
        "haircut_recommender={level},actix_web={level}",
        level = cli.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting haircut recommender v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dataset) = cli.dataset {
        config.data.dataset_path = dataset.into();
    }
    if let Some(model) = cli.model {
        config.model.path = model.into();
    }

    let state = web::Data::new(AppState::from_config(&config)?);
    if !state.model_loaded() {
        warn!("Serving without a model; /predict will fail until restart");
    }

    let (host, port) = config.bind_address();
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
