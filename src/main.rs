use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use exo_dossier::config::{self, DossierConfig};
use exo_dossier::dossier::avatar::{AvatarSource, HttpAvatarSource, NoAvatar};
use exo_dossier::dossier::compositor::DossierCompositor;
use exo_dossier::dossier::snapshot::PlayerSnapshot;
use exo_dossier::icons::catalog::IconCatalog;
use exo_dossier::icons::fetcher::IconFetcher;
use exo_dossier::icons::http_gallery::HttpGallery;
use exo_dossier::icons::versions::TrackedVersions;
use exo_dossier::metrics::client::MetricsClient;
use exo_dossier::metrics::format::{format_bytes, format_player, format_status};

#[derive(Parser)]
#[command(name = "exo-dossier")]
#[command(version, about = "Inventory dossiers and server status for ExoMetric game servers")]
struct Cli {
    /// Configuration file (defaults to config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-download every tracked icon archive and rebuild the index
    Sync,
    /// Show which version provides the icon of an item
    Lookup {
        /// Item identifier, e.g. minecraft:iron_helmet
        item: String,
    },
    /// Render a player's inventory dossier to a PNG file
    Render(RenderArgs),
    /// Print the server status summary
    Status,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct RenderSource {
    /// Player snapshot JSON file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Online player to fetch from the metrics service
    #[arg(long)]
    player: Option<String>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    source: RenderSource,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

/// Long-lived services shared by every command
struct Services {
    config: DossierConfig,
    client: reqwest::Client,
    catalog: Arc<IconCatalog>,
    fetcher: Arc<IconFetcher>,
}

impl Services {
    fn new(config: DossierConfig) -> anyhow::Result<Self> {
        let client = config::http_client().context("Failed to build HTTP client")?;
        let assets_dir = config.assets.resolved_dir();

        let gallery = HttpGallery::new(
            client.clone(),
            &config.gallery.base_url,
            &config.gallery.release_stamp_url,
        );
        let catalog = Arc::new(IconCatalog::new(
            Arc::new(gallery),
            TrackedVersions::new(&config.gallery.tracked_versions),
            &assets_dir,
        ));
        let fetcher = Arc::new(IconFetcher::new(
            catalog.clone(),
            client.clone(),
            assets_dir.join("ui"),
            &config.assets.silhouette_base_url,
        ));

        Ok(Self {
            config,
            client,
            catalog,
            fetcher,
        })
    }

    fn metrics(&self) -> anyhow::Result<MetricsClient> {
        MetricsClient::from_config(self.client.clone(), &self.config.metrics)
            .context("Set API_URL or metrics.apiUrl in the config file")
    }

    fn compositor(&self) -> DossierCompositor {
        let avatars: Arc<dyn AvatarSource> = if self.config.avatar.enabled {
            Arc::new(HttpAvatarSource::new(
                self.client.clone(),
                &self.config.avatar.base_url,
            ))
        } else {
            Arc::new(NoAvatar)
        };

        DossierCompositor::new(
            self.fetcher.clone(),
            avatars,
            &self.config.assets.resolved_dir(),
        )
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = exo_dossier::logging::init(&config::log_path(), cli.json_logs)
        .context("Failed to initialize logging")?;

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let config = DossierConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, Services::new(config)?))
}

async fn run(command: Command, services: Services) -> anyhow::Result<()> {
    match command {
        Command::Sync => sync(&services).await,
        Command::Lookup { item } => lookup(&services, &item).await,
        Command::Render(args) => render(&services, args).await,
        Command::Status => status(&services).await,
    }
}

async fn sync(services: &Services) -> anyhow::Result<()> {
    let report = services.catalog.full_sync().await;

    println!(
        "Synchronized {} versions ({} files), {} items indexed, {} on disk",
        report.extracted.len(),
        report.files,
        services.catalog.item_count(),
        format_bytes(services.catalog.store().disk_usage())
    );
    if !report.failed.is_empty() {
        bail!("Failed to synchronize versions: {}", report.failed.join(", "));
    }
    Ok(())
}

async fn lookup(services: &Services, item: &str) -> anyhow::Result<()> {
    services.catalog.initialize().await;

    let Some(version) = services.catalog.lookup(item) else {
        bail!("No gallery version records an icon for {}", item);
    };
    match services.catalog.locate(item) {
        Some(path) => println!("{} {}", version, path.display()),
        None => println!("{} (icon missing from local mirror)", version),
    }
    Ok(())
}

async fn render(services: &Services, args: RenderArgs) -> anyhow::Result<()> {
    let snapshot = match (args.source.snapshot, args.source.player) {
        (Some(path), _) => read_snapshot(&path)?,
        (None, Some(name)) => {
            let players = services
                .metrics()?
                .get_players()
                .await
                .context("Failed to fetch the online player list")?;
            players
                .find(&name)
                .cloned()
                .with_context(|| format!("Player {} is not online", name))?
        }
        (None, None) => bail!("Either --snapshot or --player is required"),
    };

    services.fetcher.initialize().await;
    let rendered = services
        .compositor()
        .render(&snapshot)
        .await
        .with_context(|| format!("Failed to render dossier of {}", snapshot.name))?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {:?}", args.out))?;
    let path = args.out.join(&rendered.file_name);
    std::fs::write(&path, &rendered.png)
        .with_context(|| format!("Failed to write {:?}", path))?;

    info!("Dossier of {} written to {:?}", snapshot.name, path);
    println!("{}", format_player(&snapshot));
    println!("{}", path.display());
    Ok(())
}

fn read_snapshot(path: &Path) -> anyhow::Result<PlayerSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid snapshot {:?}", path))
}

async fn status(services: &Services) -> anyhow::Result<()> {
    let stats = match services.metrics()?.get_stats().await {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Metrics service unavailable: {}", e);
            None
        }
    };

    println!("{}", format_status(stats.as_ref()));
    Ok(())
}
