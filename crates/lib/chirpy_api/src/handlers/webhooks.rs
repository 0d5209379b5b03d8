//! Payment-provider webhooks.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::debug;

use crate::AppState;
use crate::error::AppResult;
use crate::models::PolkaWebhookRequest;
use crate::services::users;

/// Event that upgrades a user.
const USER_UPGRADED: &str = "user.upgraded";

/// `POST /api/polka/webhooks` — apply an upgrade event. Other events are
/// acknowledged and ignored.
pub async fn polka_webhook_handler(
    State(state): State<AppState>,
    Json(body): Json<PolkaWebhookRequest>,
) -> AppResult<StatusCode> {
    if body.event != USER_UPGRADED {
        debug!(event = %body.event, "ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }
    users::upgrade_user(state.users.as_ref(), body.data.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
