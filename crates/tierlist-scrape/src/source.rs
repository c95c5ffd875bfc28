//! Where programme pages come from.

use std::{future::Future, time::Duration};

use reqwest::Client;

use crate::{
  error::{Error, Result},
  parse::{ProgramPage, parse_program},
};

/// A source of parsed programme pages.
pub trait ProgramSource: Send + Sync {
  fn fetch<'a>(&'a self, url: &'a str) -> impl Future<Output = Result<ProgramPage>> + Send + 'a;
}

/// Fetches pages over HTTP. Requests are never retried.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client: Client,
}

impl HttpSource {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }
}

impl ProgramSource for HttpSource {
  async fn fetch(&self, url: &str) -> Result<ProgramPage> {
    let resp = self.client.get(url).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Unavailable {
        url:    url.to_owned(),
        reason: resp.status().to_string(),
      });
    }
    let body = resp.text().await?;
    parse_program(&body)
  }
}
