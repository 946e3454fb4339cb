//! HTTP client for communicating with attendance-server

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use attendance_core::config::ClientConfig;
use attendance_core::notify::DispatchOutcome;
use attendance_core::service::{ProfileForm, ProfileView};
use attendance_core::store::TrustedClock;
use attendance_core::{Event, EventDraft, EventId, Identity, PortalError, PortalResult, UserProfile};

const USER_HEADER: &str = "x-user-id";
const TIME_TIMEOUT_SECS: u64 = 2;

/// HTTP client for attendance-server, acting as one user
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    user_id: Option<String>,
}

// Response types matching server API

#[derive(Deserialize)]
pub struct TimeResponse {
    pub now: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct NotifyResponse {
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
    pub message: String,
}

#[derive(Serialize)]
pub struct CanCreateRequest {
    pub allowed: bool,
}

#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl Client {
    /// `user` overrides the user id from the config file.
    pub fn new(config: &ClientConfig, user: Option<String>) -> Self {
        Client {
            http: reqwest::Client::new(),
            base_url: config.server_url.trim_end_matches('/').to_string(),
            user_id: user.or_else(|| config.user_id.clone()),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.user_id {
            Some(id) => builder.header(USER_HEADER, id),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T> {
        let resp = builder
            .send()
            .await
            .with_context(|| format!("Failed to connect to server at {}", self.base_url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err: ErrorResponse = resp
                .json()
                .await
                .with_context(|| format!("Server returned {status}"))?;
            anyhow::bail!("{}", err.error);
        }

        Ok(resp.json().await?)
    }

    /// GET /time
    pub async fn server_time(&self) -> Result<DateTime<Utc>> {
        let builder = self
            .request(reqwest::Method::GET, "/time")
            .timeout(Duration::from_secs(TIME_TIMEOUT_SECS));
        let time: TimeResponse = self.send(builder).await?;
        Ok(time.now)
    }

    /// GET /me
    pub async fn me(&self) -> Result<Identity> {
        self.send(self.request(reqwest::Method::GET, "/me")).await
    }

    /// GET /profile
    pub async fn profile(&self) -> Result<ProfileView> {
        self.send(self.request(reqwest::Method::GET, "/profile")).await
    }

    /// PUT /profile
    pub async fn save_profile(&self, form: &ProfileForm) -> Result<UserProfile> {
        self.send(self.request(reqwest::Method::PUT, "/profile").json(form))
            .await
    }

    /// GET /events
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.send(self.request(reqwest::Method::GET, "/events")).await
    }

    /// POST /events
    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        self.send(self.request(reqwest::Method::POST, "/events").json(draft))
            .await
    }

    /// PUT /events/:id
    pub async fn update_event(&self, id: EventId, draft: &EventDraft) -> Result<Event> {
        self.send(
            self.request(reqwest::Method::PUT, &format!("/events/{id}"))
                .json(draft),
        )
        .await
    }

    /// POST /events/:id/notify
    pub async fn notify(&self, id: EventId) -> Result<NotifyResponse> {
        self.send(self.request(reqwest::Method::POST, &format!("/events/{id}/notify")))
            .await
    }

    /// GET /admin/profiles
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        self.send(self.request(reqwest::Method::GET, "/admin/profiles"))
            .await
    }

    /// PUT /admin/profiles/:id/can-create
    pub async fn set_can_create(&self, user: &str, allowed: bool) -> Result<UserProfile> {
        self.send(
            self.request(reqwest::Method::PUT, &format!("/admin/profiles/{user}/can-create"))
                .json(&CanCreateRequest { allowed }),
        )
        .await
    }
}

/// The server's clock is the trusted time source for the dashboard.
#[async_trait]
impl TrustedClock for Client {
    async fn now(&self) -> PortalResult<DateTime<Utc>> {
        self.server_time()
            .await
            .map_err(|e| PortalError::TimeSourceUnavailable(format!("{e:#}")))
    }
}
