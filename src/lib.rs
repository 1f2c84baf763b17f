//! Crawl restaurants and their reviews from the Tabelog search API into
//! SQLite.
//!
//! [`crawler::run`] drives the whole thing: [`api::TabelogClient`] fetches
//! and parses XML through [`http::HttpClient`], and [`db::Store`] writes every
//! record into a table derived from its [`db::Record`] descriptor.

pub mod api;
pub mod config;
pub mod crawler;
pub mod data;
pub mod db;
pub mod encode;
pub mod error;
pub mod http;
pub mod xml;

pub use config::Config;
pub use crawler::{CrawlSummary, Context};
pub use error::{ApiError, Error, Result};
