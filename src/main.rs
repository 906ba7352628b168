use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info};

use gifbooth::configuration::config::Config;
use gifbooth::configuration::types::CaptureSettings;
use gifbooth::encoding::gif_encoder::GifFrameEncoder;
use gifbooth::media_source::synthetic::SyntheticSource;
use gifbooth::recording::controller::RecordingController;
use gifbooth::storage::database_store::DatabaseStore;
use gifbooth::upload::http_gateway::HttpUploadGateway;
use gifbooth::web_interface::web_server::WebServer;

#[derive(Parser)]
#[command(name = "gifbooth")]
#[command(version)]
#[command(about = "Capture webcam clips and share them as GIFs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the upload and gallery API
    Serve {
        #[command(flatten)]
        config: Config,
    },
    /// Record a clip with the test-pattern camera and write it as a GIF
    Record {
        #[command(flatten)]
        capture: CaptureSettings,

        /// Capture duration in seconds
        #[arg(long, default_value_t = 3)]
        seconds: u64,

        /// Output file
        #[arg(long, default_value = "recording.gif")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    match Args::parse().command {
        Command::Serve { config } => serve(config).await,
        Command::Record {
            capture,
            seconds,
            output,
        } => record(capture, seconds, output).await,
    }
}

async fn serve(config: Config) {
    let bind_address = match config.validate() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Opening asset store at {:?}", config.database_path);
    let store = match DatabaseStore::new_file(&config.database_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Unable to open the asset store: {}", e);
            std::process::exit(1);
        }
    };

    let gateway = Arc::new(HttpUploadGateway::new(
        config.upload_endpoint.clone(),
        config.upload_api_key.clone(),
        config.upload_domain.clone(),
    ));

    let server = WebServer::new(store, gateway);
    if let Err(e) = server.start(bind_address, config.port).await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}

async fn record(capture: CaptureSettings, seconds: u64, output: PathBuf) {
    if !(1..=10).contains(&capture.quality) || !(1..=60).contains(&capture.frame_rate) {
        error!("Invalid capture settings");
        std::process::exit(1);
    }

    let mut controller = RecordingController::new(
        SyntheticSource::new(),
        GifFrameEncoder::new(),
        capture.recording_options(),
    );

    let result = async {
        let params = controller.request_access().await?;
        info!(
            "Camera live at {}x{}@{} fps",
            params.width, params.height, params.frame_rate
        );
        controller.start().await?;
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        controller.stop().await
    }
    .await;

    if let Err(e) = result {
        error!("Recording failed: {}", e);
        std::process::exit(1);
    }

    let snapshot = controller.snapshot();
    let artifact = match snapshot.artifact {
        Some(artifact) => artifact,
        None => {
            error!("Recording produced no artifact");
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(&output, &artifact.bytes) {
        error!("Unable to write {:?}: {}", output, e);
        std::process::exit(1);
    }
    info!(
        "Wrote {:?}: {} bytes, {} ms of capture",
        output,
        artifact.bytes.len(),
        snapshot.elapsed_ms
    );
}
