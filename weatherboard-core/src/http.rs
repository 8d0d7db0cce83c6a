use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{SourceError, truncate_body};

pub const DEFAULT_USER_AGENT: &str = concat!("weatherboard/", env!("CARGO_PKG_VERSION"));

/// Build the shared client. Without `timeout` a hung request waits indefinitely.
pub fn build_client(user_agent: &str, timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// GET `url` with `query` and decode a JSON body, keeping the service name in every error.
pub async fn get_json<T, Q>(
    http: &Client,
    service: &'static str,
    url: &str,
    query: &Q,
) -> Result<T, SourceError>
where
    T: DeserializeOwned,
    Q: serde::Serialize + ?Sized,
{
    tracing::debug!(service, url, "sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|error| SourceError::Transport { service, error })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|error| SourceError::Transport { service, error })?;

    if !status.is_success() {
        return Err(SourceError::Status {
            service,
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|error| SourceError::Decode { service, error })
}
