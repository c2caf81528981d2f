use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use persona_profiler::{
    content_filter, AccountResolver, ContentItem, FeedProvider, LanguageSet, ProfilerConfig,
    ProfilingClient, RateLimitGate, TimelineWalker, TwitterFeedProvider, DEFAULT_PAGE_SIZE,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "persona-profiler",
    version,
    about = "Build a personality profile from an account's recent original posts"
)]
struct Args {
    /// Numeric account id or @handle to analyze
    identifier: String,

    /// Comma-separated language tags to keep
    #[arg(short, long, default_value = "en,es", value_delimiter = ',')]
    languages: Vec<String>,

    /// Number of original posts to collect
    #[arg(short, long, default_value = "200")]
    count: usize,

    /// Posts requested per timeline page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Output encoding of the profile document
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Ask the service to include raw scores (JSON output only)
    #[arg(long)]
    include_raw: bool,

    /// Ask the service for a CSV header row (CSV output only)
    #[arg(long)]
    csv_headers: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Json,
    Csv,
}

fn setup_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,persona_profiler=debug"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let args = Args::parse();
    let config = ProfilerConfig::from_env()?;

    let languages: LanguageSet = args
        .languages
        .iter()
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .collect();

    let gate = Arc::new(RateLimitGate::new());
    let provider: Arc<dyn FeedProvider> = Arc::new(TwitterFeedProvider::new(
        &config.twitter_api_url,
        &config.twitter_bearer_token,
        gate.clone(),
    )?);

    let resolver = AccountResolver::new(provider.clone(), gate.clone());
    let account_id = resolver
        .resolve(&args.identifier)
        .await
        .context("failed to resolve account identifier")?;
    info!("resolved {} to account id {}", args.identifier, account_id);

    let walker = TimelineWalker::new(provider, gate).with_page_size(args.page_size);
    let posts = walker
        .fetch(account_id, &languages, args.count)
        .await
        .context("timeline walk failed")?;

    if posts.len() < args.count {
        warn!(
            "feed exhausted with {} qualifying posts (wanted {})",
            posts.len(),
            args.count
        );
    }
    info!("collected {} original posts", posts.len());

    let items: Vec<ContentItem> = posts.iter().map(content_filter::normalize).collect();

    let profiling = ProfilingClient::new(
        &config.profiling_url,
        &config.profiling_username,
        &config.profiling_password,
    )?;

    let document = match args.format {
        OutputFormat::Json => profiling.profile_json(&items, args.include_raw).await?,
        OutputFormat::Csv => profiling.profile_csv(&items, args.csv_headers).await?,
    };

    println!("{document}");

    Ok(())
}
