//! Thin HTTP wrapper returning raw bodies.
//!
//! Redirects are handled here rather than by reqwest: GETs follow them up to
//! [`MAX_REDIRECTS`] hops, and a POST answered with a `Location` header is
//! turned into a GET of that location. Status codes are never treated as
//! errors, the search API reports failures in the body.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::cookie::CookieStore;
use reqwest::header::{HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Response, Url};

use crate::error::{Error, Result};

pub const MAX_REDIRECTS: usize = 10;

/// Cookie store with a single slot.
///
/// Whatever cookies the last response set replace the previous ones, and the
/// slot is replayed on every request no matter the host. Good enough for
/// talking to one API host, it is not RFC 6265 cookie handling.
#[derive(Debug, Default)]
pub struct SingleSlotJar {
    slot: RwLock<Vec<String>>,
}

impl SingleSlotJar {
    /// `name=value` pairs currently held.
    pub fn pairs(&self) -> Vec<String> {
        self.slot.read().clone()
    }
}

impl CookieStore for SingleSlotJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {
        let cookies = cookie_headers
            .filter_map(|header| header.to_str().ok())
            .filter_map(cookie_pair)
            .collect();
        *self.slot.write() = cookies;
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        let slot = self.slot.read();
        if slot.is_empty() {
            return None;
        }
        HeaderValue::from_str(&slot.join("; ")).ok()
    }
}

// "sid=abc; Path=/; HttpOnly" -> "sid=abc"
fn cookie_pair(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    pair.contains('=').then(|| pair.to_string())
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    jar: Arc<SingleSlotJar>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let jar = Arc::new(SingleSlotJar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client, jar })
    }

    pub fn jar(&self) -> &SingleSlotJar {
        &self.jar
    }

    pub async fn get(&self, url: &str) -> Result<Bytes> {
        tracing::debug!(url, "GET");
        let mut response = self.client.get(url).send().await?;
        let mut hops = 0;
        while response.status().is_redirection() {
            let Some(next) = location(&response)? else { break };
            if hops == MAX_REDIRECTS {
                return Err(Error::TooManyRedirects(MAX_REDIRECTS));
            }
            hops += 1;
            tracing::debug!(%next, "following redirect");
            response = self.client.get(next).send().await?;
        }
        Ok(response.bytes().await?)
    }

    /// POST `form` url-encoded. If the response points somewhere else, the
    /// body of a GET to that location is returned instead of the POST body.
    pub async fn post(&self, url: &str, form: &[(&str, &str)]) -> Result<Bytes> {
        tracing::debug!(url, "POST");
        let response = self.client.post(url).form(form).send().await?;
        if let Some(next) = location(&response)? {
            return self.get(next.as_str()).await;
        }
        Ok(response.bytes().await?)
    }
}

/// `Location` header of `response`, resolved against the request URL.
fn location(response: &Response) -> Result<Option<Url>> {
    let Some(value) = response.headers().get(LOCATION) else {
        return Ok(None);
    };
    let location = String::from_utf8_lossy(value.as_bytes()).into_owned();
    response
        .url()
        .join(&location)
        .map(Some)
        .map_err(|source| Error::Redirect { location, source })
}
