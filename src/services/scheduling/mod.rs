pub mod http;

use async_trait::async_trait;

use crate::models::{AvailabilityQuery, ReservationRequest};

/// Status and raw body of a remote scheduling call. Decoding is left to the
/// booking flow, which needs to tell malformed bodies apart from transport errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Remote scheduling service. An `Err` always means the call itself failed
/// (connection, timeout, body read); any HTTP status comes back as `Ok`.
#[async_trait]
pub trait SchedulingApi: Send + Sync {
    async fn check_availability(&self, query: &AvailabilityQuery) -> anyhow::Result<ApiResponse>;

    async fn create_reservation(&self, request: &ReservationRequest) -> anyhow::Result<ApiResponse>;
}
