use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, marker::PhantomData};
use thiserror::Error;

use crate::query::RequestTarget;

/// Why a single fetch attempt failed. Cancellation is not represented here:
/// a cancelled attempt never produces a result at all.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Performs the network call for one [`RequestTarget`].
#[async_trait]
pub trait Fetcher: Send + Sync + Debug + 'static {
    type Output: Clone + Send + Sync + 'static;

    async fn fetch(&self, target: &RequestTarget) -> Result<Self::Output, FetchError>;
}

/// reqwest-backed fetcher decoding the JSON body into `T`.
#[derive(Debug)]
pub struct HttpFetcher<T> {
    http: Client,
    _output: PhantomData<fn() -> T>,
}

impl<T> HttpFetcher<T> {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self { http, _output: PhantomData }
    }
}

impl<T> Default for HttpFetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Fetcher for HttpFetcher<T>
where
    T: DeserializeOwned + Clone + Send + Sync + Debug + 'static,
{
    type Output = T;

    async fn fetch(&self, target: &RequestTarget) -> Result<T, FetchError> {
        let mut req = self.http.request(target.method().into(), target.url().clone());
        if let Some(payload) = target.payload() {
            req = req.json(payload);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
