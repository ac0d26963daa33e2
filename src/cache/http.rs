//! Network fetcher backed by reqwest.

use color_eyre::{eyre::eyre, Result};
use futures::future::BoxFuture;

use super::traits::{AssetRequest, AssetResponse, Fetcher, Method};

/// Fetcher that performs real HTTP requests.
#[derive(Clone, Default)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new() -> Self {
    Self::default()
  }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
  match method {
    Method::Get => reqwest::Method::GET,
    Method::Head => reqwest::Method::HEAD,
    Method::Post => reqwest::Method::POST,
    Method::Put => reqwest::Method::PUT,
    Method::Patch => reqwest::Method::PATCH,
    Method::Delete => reqwest::Method::DELETE,
  }
}

impl Fetcher for HttpFetcher {
  fn fetch(&self, request: &AssetRequest) -> BoxFuture<'static, Result<AssetResponse>> {
    let client = self.client.clone();
    let method = to_reqwest_method(request.method);
    let url = request.url.clone();

    Box::pin(async move {
      let response = client
        .request(method, &url)
        .send()
        .await
        .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

      let status = response.status().as_u16();
      let body = response
        .bytes()
        .await
        .map_err(|e| eyre!("Failed to read body from {}: {}", url, e))?;

      Ok(AssetResponse::new(status, body.to_vec()))
    })
  }
}
