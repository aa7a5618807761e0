use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use super::{ApiResponse, SchedulingApi};
use crate::models::{AvailabilityQuery, ReservationRequest};

pub struct HttpSchedulingApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSchedulingApi {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scheduling HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> anyhow::Result<ApiResponse> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to call scheduling API at {url}"))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read scheduling API response from {url}"))?;

        tracing::debug!(url = %url, status, "scheduling API responded");
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl SchedulingApi for HttpSchedulingApi {
    async fn check_availability(&self, query: &AvailabilityQuery) -> anyhow::Result<ApiResponse> {
        self.post("/reservas/disponibilidad", query).await
    }

    async fn create_reservation(&self, request: &ReservationRequest) -> anyhow::Result<ApiResponse> {
        self.post("/reservas", request).await
    }
}
