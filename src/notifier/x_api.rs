// src/notifier/x_api.rs

//! X (Twitter) posting client.
//!
//! Posts statuses through the v1.1 `statuses/update` endpoint with an
//! OAuth 1.0a user-context signature (HMAC-SHA1). Credentials come from the
//! environment; a missing variable is a startup-fatal configuration error,
//! checked before any scraping happens.

use std::collections::BTreeMap;
use std::env;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use sha1::Sha1;

use crate::error::{AppError, Result};

use super::{Notifier, truncate_status};

const UPDATE_STATUS_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

/// Everything outside RFC 3986 unreserved characters gets encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The four OAuth 1.0a user-context secrets.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl Credentials {
    /// Read credentials from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: require_env("TWITTER_API_KEY")?,
            api_secret: require_env("TWITTER_API_SECRET")?,
            access_token: require_env("TWITTER_ACCESS_TOKEN")?,
            access_secret: require_env("TWITTER_ACCESS_SECRET")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("missing environment variable {name}")))
}

/// Notifier posting to an X account.
pub struct XNotifier {
    client: reqwest::Client,
    creds: Credentials,
}

impl XNotifier {
    pub fn new(client: reqwest::Client, creds: Credentials) -> Self {
        Self { client, creds }
    }

    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        Ok(Self::new(client, Credentials::from_env()?))
    }

    fn authorization_header(&self, status: &str, timestamp: &str, nonce: &str) -> String {
        let mut oauth_params = BTreeMap::new();
        oauth_params.insert("oauth_consumer_key", self.creds.api_key.as_str());
        oauth_params.insert("oauth_nonce", nonce);
        oauth_params.insert("oauth_signature_method", "HMAC-SHA1");
        oauth_params.insert("oauth_timestamp", timestamp);
        oauth_params.insert("oauth_token", self.creds.access_token.as_str());
        oauth_params.insert("oauth_version", "1.0");

        // The signature covers the OAuth parameters and the request body.
        let mut signed_params = oauth_params.clone();
        signed_params.insert("status", status);

        let base = signature_base_string("POST", UPDATE_STATUS_URL, &signed_params);
        let signature = sign(&base, &self.creds.api_secret, &self.creds.access_secret);

        let mut parts: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
            .collect();
        parts.push(format!("oauth_signature=\"{}\"", percent_encode(&signature)));
        format!("OAuth {}", parts.join(", "))
    }
}

#[async_trait]
impl Notifier for XNotifier {
    async fn post(&self, text: &str) -> Result<()> {
        let status = truncate_status(text);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let nonce: String = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let header = self.authorization_header(&status, &timestamp, &nonce);

        let response = self
            .client
            .post(UPDATE_STATUS_URL)
            .header("Authorization", header)
            .form(&[("status", status.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(format!(
                "status post rejected ({code}): {body}"
            )));
        }
        Ok(())
    }
}

/// OAuth percent encoding (RFC 3986 strict).
fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Build the OAuth signature base string from sorted request parameters.
fn signature_base_string(method: &str, url: &str, params: &BTreeMap<&str, &str>) -> String {
    let param_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method,
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// HMAC-SHA1 over the base string, base64-encoded.
fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(base.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}
