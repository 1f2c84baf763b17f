//! Start-up configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary),
//! falling back to the paths the crawler has always used. The API key itself
//! lives in its own file.

use std::env;
use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::api::DEFAULT_API_BASE;
use crate::encode::Utf8Boundary;
use crate::error::{Error, Result};

pub const DEFAULT_KEY_FILE: &str = "./config/apikey";
pub const DEFAULT_DB_PATH: &str = "./db/tabelog.db";
pub const DEFAULT_STATION: &str = "新宿";

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    pub api_key: String,
    #[builder(default = "PathBuf::from(DEFAULT_DB_PATH)")]
    pub db_path: PathBuf,
    #[builder(default = "DEFAULT_API_BASE.to_string()")]
    pub api_base: String,
    #[builder(default = "DEFAULT_STATION.to_string()")]
    pub station: String,
    #[builder(default = "1")]
    pub page: u32,
    #[builder(default)]
    pub boundary: Utf8Boundary,
}

impl Config {
    /// Read the key file and the `TABELOG_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], looking variables up with `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let key_file = var("TABELOG_APIKEY_FILE").unwrap_or_else(|| DEFAULT_KEY_FILE.into());
        let mut builder = ConfigBuilder::default();
        builder.api_key(read_api_key(Path::new(&key_file))?);

        if let Some(path) = var("TABELOG_DB_PATH") {
            builder.db_path(path);
        }
        if let Some(base) = var("TABELOG_API_BASE") {
            builder.api_base(base);
        }
        if let Some(station) = var("TABELOG_STATION") {
            builder.station(station);
        }
        if let Some(page) = var("TABELOG_PAGE") {
            builder.page(parse_page(&page)?);
        }
        if let Some(flag) = var("TABELOG_STRICT_UTF8") {
            if parse_flag(&flag)? {
                builder.boundary(Utf8Boundary::Standard);
            }
        }

        builder.build().map_err(|err| Error::Config(err.to_string()))
    }
}

/// The key file's content, trimmed of surrounding whitespace.
pub fn read_api_key(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ApiKey {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.trim().to_string())
}

fn parse_page(value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(Error::Config(format!("TABELOG_PAGE is not a page number: {value:?}"))),
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::Config(format!("TABELOG_STRICT_UTF8 is not a boolean: {value:?}"))),
    }
}
