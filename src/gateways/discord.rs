use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{header, StatusCode};

use crate::common::error::CollageError;
use crate::entities::{member::RawMember, rate_limit};
use crate::settings::Settings;
use crate::usecases::gateways::{Directory, MembersPage};

const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATELIMIT_RESET_AFTER: &str = "x-ratelimit-reset-after";

struct Discord {
    settings: Arc<Settings>,
    client: reqwest::Client,
}

pub fn new(settings: Arc<Settings>, token: &str) -> Result<impl Directory> {
    let mut authorization = header::HeaderValue::from_str(&format!("Bot {}", token))
        .map_err(|e| anyhow!("token is not a valid header value: {}", e))?;
    authorization.set_sensitive(true);

    let mut headers = header::HeaderMap::new();
    headers.insert(header::AUTHORIZATION, authorization);

    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent())
        .default_headers(headers)
        .build()
        .map_err(|e| anyhow!("could not build api client: {}", e))?;

    Ok(Discord { settings, client })
}

#[async_trait]
impl Directory for Discord {
    async fn members_page(
        &self,
        guild_id: u64,
        after: u64,
        limit: u32,
    ) -> Result<MembersPage, CollageError> {
        let url = members_url(&self.settings.api_base_url(), guild_id);
        tracing::debug!(guild_id, after, limit, "requesting member page");

        let resp = self
            .client
            .get(&url)
            .query(&[("limit", limit as u64), ("after", after)])
            .send()
            .await
            .map_err(|e| CollageError::Network(format!("could not get {}: {}", url, e)))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CollageError::Auth(format!("{} for {}", status, url)));
        }

        let rate = rate_limit::from_headers(
            header_str(&resp, RATELIMIT_REMAINING),
            header_str(&resp, RATELIMIT_RESET_AFTER),
        );
        if rate.is_exhausted() {
            return Ok(MembersPage::RateLimited(rate));
        }

        if !status.is_success() {
            return Err(CollageError::Network(format!(
                "invalid status for get {}: {}",
                url, status
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| CollageError::Network(format!("could not read member page: {}", e)))?;

        let members = serde_json::from_slice::<Vec<RawMember>>(&body).map_err(|e| {
            CollageError::Malformed(format!("could not deserialize member page as json: {}", e))
        })?;

        Ok(MembersPage::Members(members))
    }
}

fn members_url(api_base_url: &str, guild_id: u64) -> String {
    format!("{}/guilds/{}/members", api_base_url.trim_end_matches('/'), guild_id)
}

fn header_str<'a>(resp: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}
