use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use milestone_notifier::{
    Error, Result,
    cli::{Args, Commands, Credentials, non_blank},
    config::{AppConfig, MonitorPlan},
    lock::RunLock,
    logging::init_logging,
    notification::{DiscordSink, NotificationDispatcher, TwitterSink},
    runner::{RunCoordinator, RunOptions, RunStatus},
    source::YoutubeMetricSource,
    state::{JsonFileBackend, StateBackend, StateStore},
    utils::http_client::build_client,
};
use youtube_stats::YoutubeClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // `process::exit` skips destructors, so the log guard is dropped inside `run`.
    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Error: {}", e);
            1
        }
    };
    process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    let mut config = AppConfig::load(&args.config)?;
    let _log_guard = init_logging(
        config.log_level.adjusted(args.verbose, args.quiet),
        config.log_dir.as_deref(),
    )?;

    match args.command {
        Commands::Run {
            dry_run,
            state,
            credentials,
        } => {
            if let Some(state) = state {
                config.state_path = state;
            }
            let plan = config.plan()?;
            run_once(&config, &plan, dry_run, credentials).await
        }
        Commands::Validate => {
            let plan = config.plan()?;
            print_summary(&config, &plan);
            Ok(0)
        }
        Commands::State { state } => {
            let backend = JsonFileBackend::new(state.unwrap_or(config.state_path));
            let records = backend.load()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(0)
        }
    }
}

async fn run_once(
    config: &AppConfig,
    plan: &MonitorPlan,
    dry_run: bool,
    credentials: Credentials,
) -> Result<i32> {
    let api_key = non_blank(credentials.youtube_api_key)
        .ok_or(Error::MissingCredential("YOUTUBE_API_KEY"))?;

    let lock_path = config.lock_path();

    let Some(_lock) = RunLock::acquire(&lock_path)? else {
        info!(lock = %lock_path.display(), "Another run is in progress, skipping");
        return Ok(0);
    };

    let mut store = StateStore::load(JsonFileBackend::new(&config.state_path))?;

    let client = build_client(config.request_timeout());
    let source = Arc::new(YoutubeMetricSource::new(YoutubeClient::new(
        api_key,
        client.clone(),
    )));

    let mut discord = config.discord.clone();
    if let Some(url) = non_blank(credentials.discord_webhook_url) {
        discord.webhook_url = url;
    }
    let mut twitter = config.twitter.clone();
    if let Some(token) = non_blank(credentials.twitter_bearer_token) {
        twitter.bearer_token = token;
    }

    let dispatcher = NotificationDispatcher::new(Arc::new(DiscordSink::new(discord, client.clone())))
        .with_twitter(Arc::new(TwitterSink::new(twitter, client)))
        .with_interval(config.notify_interval());

    let coordinator = RunCoordinator::new(source, dispatcher).with_options(RunOptions {
        dry_run,
        fetch_timeout: config.fetch_timeout(),
        track_playlist_membership: config.track_playlist_membership,
    });

    let report = coordinator.run(plan, &mut store).await?;
    let status = report.status();
    if status == RunStatus::PartialFailure {
        warn!(
            fetch_failures = report.fetch_failures(),
            sink_failures = report.sink_failures,
            "Run completed with failures"
        );
    }
    Ok(status.exit_code())
}

fn print_summary(config: &AppConfig, plan: &MonitorPlan) {
    println!("Configuration OK");
    println!("  state file: {}", config.state_path.display());
    println!(
        "  subscriber thresholds: {:?}",
        plan.subscriber_thresholds.as_slice()
    );
    println!("  view thresholds: {:?}", plan.view_thresholds.as_slice());
    println!(
        "  {} channel(s), {} playlist(s)",
        plan.channels().count(),
        plan.playlists().count()
    );
    for entity in plan.channels().chain(plan.playlists()) {
        println!(
            "  {} {} ({}){}",
            entity.kind,
            entity.id,
            entity.description,
            if entity.twitter_enabled { " +twitter" } else { "" }
        );
    }
}
