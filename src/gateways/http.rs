use std::{sync::Arc, time::Duration};

use crate::{settings::Settings, usecases::gateways::Web};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{redirect, Response};

const MAX_REDIRECTS: usize = 3;

struct Http {
    settings: Arc<Settings>,
    client: reqwest::Client,
}

pub fn new(settings: Arc<Settings>) -> Result<impl Web> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent())
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(settings.download_timeout_seconds()))
        .build()
        .map_err(|e| anyhow!("could not build cdn client: {}", e))?;

    Ok(Http { settings, client })
}

#[async_trait]
impl Web for Http {
    async fn get_image_data(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("requesting image from {}", url);

        let response = self
            .get_with_status_check(url)
            .await
            .map_err(|e| anyhow!("could not get image: {}", e))?;
        let body = self
            .read_body_with_limit(response, self.settings.max_avatar_bytes())
            .await
            .map_err(|e| anyhow!("could not read image body: {}", e))?;

        Ok(body)
    }
}

impl Http {
    // The cdn sometimes 404s on urls that look valid, callers skip those.
    async fn get_with_status_check(&self, url: &str) -> Result<Response> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("could not get {}: {}", url, e))?;

        if !resp.status().is_success() {
            return Err(anyhow!("invalid status for get {}: {}", url, resp.status()));
        }

        Ok(resp)
    }

    async fn read_body_with_limit(&self, mut resp: Response, limit: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        while let Some(chunk) = resp.chunk().await? {
            if buf.len() + chunk.len() > limit {
                return Err(anyhow!(
                    "response body too large {}",
                    buf.len() + chunk.len()
                ));
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(buf)
    }
}
