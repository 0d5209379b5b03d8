//! Liveness probe.

/// `GET /api/healthz` — always `OK`.
pub async fn healthz() -> &'static str {
    "OK"
}
