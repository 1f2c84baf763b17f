use anyhow::Context as _;
use tabelog_crawler::{crawler, Config, Context};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(true)
        .with_file(false)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("fail to setup logging");

    if let Err(err) = run().await {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("fail to load configuration")?;
    let ctx = Context::init(&config)
        .await
        .with_context(|| format!("fail to set up crawler with {}", config.db_path.display()))?;

    let summary = crawler::run(&ctx, &config.station, config.page)
        .await
        .with_context(|| format!("fail to crawl station {}", config.station))?;
    tracing::info!(
        restaurants = summary.restaurants,
        reviews = summary.reviews,
        "crawl finished"
    );

    ctx.store.close().await;
    Ok(())
}
