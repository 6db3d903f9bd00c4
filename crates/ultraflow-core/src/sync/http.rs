//! REST client for a remote document endpoint.
//!
//! Layout under the configured base URL:
//! - `POST {base}/users/{uid}/sessions`: append one session document
//! - `GET  {base}/users/{uid}/sessions?from=&to=`: list, newest first
//! - `PUT  {base}/users/{uid}/settings`: replace the settings document
//! - `GET  {base}/users/{uid}/settings`: fetch it (404 when never written)

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use super::identity::Identity;
use super::remote::RemoteStore;
use super::types::{DateRange, RemoteSession, RemoteSettings, SyncError};

pub struct HttpRemote {
    base: Url,
    http_client: Client,
}

impl HttpRemote {
    pub fn new(endpoint: &str) -> Result<Self, SyncError> {
        let base = Url::parse(endpoint).map_err(|_| SyncError::InvalidEndpoint(endpoint.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(SyncError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self {
            base,
            http_client: Client::new(),
        })
    }

    fn url(&self, identity: &Identity, leaf: &str) -> Result<Url, SyncError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(["users", identity.user_id.as_str(), leaf]);
        Ok(url)
    }

    fn authed(builder: RequestBuilder, identity: &Identity) -> RequestBuilder {
        match &identity.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(resp: Response) -> Result<Response, SyncError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SyncError::AuthenticationRequired);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SyncError::Remote(format!("{status}: {body}")))
    }
}

impl RemoteStore for HttpRemote {
    async fn append_session(&self, identity: &Identity, session: &RemoteSession) -> Result<(), SyncError> {
        let url = self.url(identity, "sessions")?;
        let resp = Self::authed(self.http_client.post(url), identity)
            .json(session)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn list_sessions(&self, identity: &Identity, range: DateRange) -> Result<Vec<RemoteSession>, SyncError> {
        let url = self.url(identity, "sessions")?;
        let mut query = Vec::new();
        if let Some(from) = range.from {
            query.push(("from", from.to_rfc3339()));
        }
        if let Some(to) = range.to {
            query.push(("to", to.to_rfc3339()));
        }
        let resp = Self::authed(self.http_client.get(url), identity)
            .query(&query)
            .send()
            .await?;
        let entries: Vec<serde_json::Value> = Self::check(resp).await?.json().await?;

        let mut sessions: Vec<RemoteSession> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed remote session");
                    None
                }
            })
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    async fn replace_settings(&self, identity: &Identity, settings: &RemoteSettings) -> Result<(), SyncError> {
        let url = self.url(identity, "settings")?;
        let resp = Self::authed(self.http_client.put(url), identity)
            .json(settings)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get_settings(&self, identity: &Identity) -> Result<Option<RemoteSettings>, SyncError> {
        let url = self.url(identity, "settings")?;
        let resp = Self::authed(self.http_client.get(url), identity).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let settings = Self::check(resp).await?.json().await?;
        Ok(Some(settings))
    }
}
