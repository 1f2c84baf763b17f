//! The crawl itself: one page of restaurants, then the reviews of each.
//!
//! Strictly sequential. The first error of any kind ends the run; rows saved
//! before it stay in the database.

use crate::api::TabelogClient;
use crate::config::Config;
use crate::db::Store;
use crate::error::Result;
use crate::http::HttpClient;

/// Everything a crawl needs, built once at start-up.
#[derive(Debug, Clone)]
pub struct Context {
    pub api: TabelogClient,
    pub store: Store,
}

impl Context {
    pub fn new(api: TabelogClient, store: Store) -> Self {
        Self { api, store }
    }

    /// Open the database and create its tables, and set up the API client.
    pub async fn init(config: &Config) -> Result<Self> {
        let api = TabelogClient::new(HttpClient::new()?, &config.api_base, &config.api_key)
            .with_boundary(config.boundary);
        let store = Store::connect(&config.db_path).await?;
        store.init().await?;
        Ok(Self { api, store })
    }
}

/// How many rows a crawl saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub restaurants: usize,
    pub reviews: usize,
}

/// Crawl one result page for `station` and every listed restaurant's reviews.
pub async fn run(ctx: &Context, station: &str, page: u32) -> Result<CrawlSummary> {
    let mut summary = CrawlSummary::default();

    let restaurants = ctx.api.fetch_restaurants(station, page).await?;
    for restaurant in restaurants {
        tracing::info!("Get: {}", restaurant.restaurant_name);
        ctx.store.save(&restaurant).await?;
        summary.restaurants += 1;

        // reviews carry no restaurant id, rcd is only used for the lookup
        let reviews = ctx.api.fetch_reviews(restaurant.rcd).await?;
        for review in reviews {
            tracing::info!("- review: {}", review.title);
            ctx.store.save(&review).await?;
            summary.reviews += 1;
        }
    }

    Ok(summary)
}
