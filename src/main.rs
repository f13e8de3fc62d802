use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use mixseed_lib::config::{AppConfig, DEFAULT_RECOMMENDATION_LIMIT, MAX_SEEDS};
use mixseed_lib::history::{HistoryStore, JsonHistoryStore};
use mixseed_lib::models::FilterParameters;
use mixseed_lib::notifier::LogNotifier;
use mixseed_lib::orchestrator::{ImportMethod, Orchestrator};
use mixseed_lib::parser;
use mixseed_lib::providers::{FileSessionStore, ProviderContext, ProviderId, ReqwestTransport, StaticAgent};

#[derive(Parser, Debug)]
#[clap(name = "mixseed")]
#[clap(about = "Seed-based playlist recommendations from Spotify and Tidal")]
struct Cli {
    /// Streaming provider to use
    #[clap(long, short, global = true, env = "MIXSEED_PROVIDER", default_value = "spotify")]
    provider: ProviderId,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the tracks a playlist export file contains
    Parse { file: PathBuf },

    /// Print the provider's authorization URL
    Login,

    /// Finish login with the URL the provider redirected to
    Callback { url: String },

    /// List your playlists on the provider
    Playlists,

    /// Generate recommendations from a file or one of your playlists
    Recommend(RecommendArgs),

    /// Browse or manage saved generations
    History {
        #[clap(subcommand)]
        action: HistoryAction,
    },

    /// Forget the stored session
    Logout,
}

#[derive(clap::Args, Debug)]
struct RecommendArgs {
    /// Playlist export file (.json, .csv, .m3u or plain text)
    #[clap(long, conflicts_with = "playlist", required_unless_present = "playlist")]
    file: Option<PathBuf>,

    /// Id of one of your playlists
    #[clap(long)]
    playlist: Option<String>,

    /// Candidate indices to use as seeds (defaults to the first five)
    #[clap(long, value_delimiter = ',')]
    seeds: Vec<usize>,

    #[clap(long, default_value = "0.5")]
    energy: f32,

    #[clap(long, default_value = "0.5")]
    danceability: f32,

    #[clap(long, default_value = "50")]
    popularity: u8,

    #[clap(long, default_value = "0.5")]
    instrumentalness: f32,

    #[clap(long, default_value_t = DEFAULT_RECOMMENDATION_LIMIT)]
    limit: u32,

    /// Save the recommendations as a new playlist
    #[clap(long)]
    create_playlist: bool,

    /// Name for the created playlist
    #[clap(long, requires = "create_playlist")]
    name: Option<String>,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    List,
    Show { id: String },
    Delete { id: String },
    Clear,
}

struct Host {
    agent: Arc<StaticAgent>,
    orchestrator: Orchestrator,
}

fn build_host(config: &AppConfig, provider: ProviderId, history: Arc<JsonHistoryStore>) -> Result<Host> {
    let redirect = match provider {
        ProviderId::Spotify => &config.spotify.redirect_uri,
        ProviderId::Tidal => &config.tidal.redirect_uri,
    };
    let agent = Arc::new(StaticAgent::new(
        Url::parse(redirect).with_context(|| format!("invalid redirect URI {}", redirect))?,
    ));
    let notifier = Arc::new(LogNotifier);

    let ctx = ProviderContext {
        transport: Arc::new(ReqwestTransport::new()?),
        sessions: Arc::new(FileSessionStore::new(config.sessions_dir())),
        agent: agent.clone(),
        notifier: notifier.clone(),
    };
    let registry = mixseed_lib::provider_registry(config, &ctx);
    let orchestrator = Orchestrator::new(registry, provider, notifier, history)?;

    Ok(Host { agent, orchestrator })
}

async fn require_session(orchestrator: &mut Orchestrator) -> Result<()> {
    if !orchestrator.authenticate().await {
        bail!(
            "not logged in to {}; run `mixseed --provider {} login` first",
            orchestrator.provider().name(),
            orchestrator.active_provider()
        );
    }
    Ok(())
}

async fn recommend(orchestrator: &mut Orchestrator, args: RecommendArgs) -> Result<()> {
    require_session(orchestrator).await?;

    let found = if let Some(path) = &args.file {
        let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        orchestrator.upload_file(&content, filename).await?
    } else if let Some(id) = &args.playlist {
        orchestrator.choose_import(ImportMethod::Playlist).await?;
        orchestrator.select_playlist(id).await?
    } else {
        bail!("pass --file or --playlist");
    };
    if found == 0 {
        bail!("no candidate tracks to seed from");
    }

    let picks: Vec<usize> = if args.seeds.is_empty() {
        (0..found.min(MAX_SEEDS)).collect()
    } else {
        args.seeds.clone()
    };
    for idx in picks {
        let Some(track) = orchestrator.candidates().get(idx) else {
            bail!("seed index {} out of range (0..{})", idx, found);
        };
        let id = track.id.clone();
        orchestrator.select_seed(&id)?;
    }
    orchestrator.confirm_seeds()?;

    orchestrator.set_filters(FilterParameters {
        energy: args.energy,
        danceability: args.danceability,
        popularity: args.popularity,
        instrumentalness: args.instrumentalness,
        limit: args.limit,
    })?;

    let tracks = orchestrator.generate().await?;
    if tracks.is_empty() {
        return Ok(());
    }
    for (i, track) in tracks.iter().enumerate() {
        println!("{:>3}. {} - {}", i + 1, track.artist, track.name);
    }

    if args.create_playlist {
        if let Some(playlist) = orchestrator.create_playlist(args.name.as_deref()).await? {
            println!(
                "Created \"{}\" {}",
                playlist.name,
                playlist.external_url.unwrap_or_default()
            );
        }
    }
    Ok(())
}

async fn history(store: &JsonHistoryStore, orchestrator: &mut Orchestrator, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            for record in store.list().await? {
                println!(
                    "{}  {}  {:<7}  {} tracks  {}",
                    record.id,
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.platform,
                    record.recommendations.len(),
                    record.playlist_name
                );
            }
        }
        HistoryAction::Show { id } => {
            let Some(record) = store.get(&id).await? else {
                bail!("no history record {}", id);
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        HistoryAction::Delete { id } => orchestrator.delete_history(&id).await?,
        HistoryAction::Clear => orchestrator.clear_history().await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let store = Arc::new(JsonHistoryStore::new(config.history_file()));

    if let Command::Parse { file } = &cli.command {
        let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let filename = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let tracks = parser::parse(&content, filename);
        if tracks.is_empty() {
            log::warn!("No tracks found in the file");
        }
        for track in tracks {
            println!("{} - {}", track.artist, track.name);
        }
        return Ok(());
    }

    let Host { agent, mut orchestrator } = build_host(&config, cli.provider, store.clone())?;

    match cli.command {
        Command::Parse { .. } => {}
        Command::Login => {
            orchestrator.login();
            if let Some(url) = agent.last_navigation() {
                println!("{}", url);
            }
        }
        Command::Callback { url } => {
            agent.set_current(Url::parse(&url).context("invalid callback URL")?);
            require_session(&mut orchestrator).await?;
        }
        Command::Playlists => {
            require_session(&mut orchestrator).await?;
            for playlist in orchestrator.choose_import(ImportMethod::Playlist).await? {
                println!("{}  {} ({} tracks)", playlist.id, playlist.name, playlist.track_count);
            }
        }
        Command::Recommend(args) => recommend(&mut orchestrator, args).await?,
        Command::History { action } => history(&store, &mut orchestrator, action).await?,
        Command::Logout => orchestrator.logout(),
    }

    Ok(())
}
