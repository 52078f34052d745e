// playgen - terminal playlist generator
// Filter a remote song catalog by tempo and energy, export the hits as CSV or M3U

use anyhow::Result;
use clap::Parser;
use playgen::{catalog::RestCatalog, ui::App, Catalog, Config};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playgen")]
#[command(about = "Query a song catalog by tempo/energy and export playlists")]
struct Args {
    /// Enable developer logging (debug level for everything)
    #[arg(long)]
    dev: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging(dev: bool, log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    // stdout belongs to the TUI, so logs go to a daily rotating file
    let file_appender = tracing_appender::rolling::daily(log_dir, "playgen.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = if dev {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,playgen=debug"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first - missing credentials should fail before the screen flips
    let config = Config::load(args.config.as_deref())?;
    let _log_guard = init_logging(args.dev, &config.logging.directory)?;

    info!("playgen starting up (catalog table '{}')", config.catalog.table);

    let catalog: Arc<dyn Catalog> = Arc::new(RestCatalog::new(&config.catalog));

    let mut app = App::new(&config, catalog)?;
    app.run().await?;

    info!("playgen shut down");
    Ok(())
}
