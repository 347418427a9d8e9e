//! Admin bulk-action handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use wipay_core::{BulkAction, BulkOutcome, UserId};
use wipay_store::Store;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Maximum accounts per bulk request.
const MAX_BULK_ACCOUNTS: usize = 500;

/// Bulk action request.
#[derive(Debug, Deserialize)]
pub struct BulkActionRequest {
    /// Target account IDs.
    pub user_ids: Vec<String>,
    /// The action to apply.
    #[serde(flatten)]
    pub action: BulkAction,
}

/// Bulk action response.
#[derive(Debug, Serialize)]
pub struct BulkActionResponse {
    /// Batch outcome (all-or-nothing).
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

/// Apply a bulk action to a set of operator accounts.
///
/// The batch is all-or-nothing: a missing account fails the whole request
/// and nothing is written.
pub async fn bulk_action(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(body): Json<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, ApiError> {
    if body.user_ids.is_empty() {
        return Err(ApiError::BadRequest("user_ids must not be empty".into()));
    }
    if body.user_ids.len() > MAX_BULK_ACCOUNTS {
        return Err(ApiError::BadRequest(format!(
            "at most {MAX_BULK_ACCOUNTS} accounts per request"
        )));
    }

    let user_ids = body
        .user_ids
        .iter()
        .map(|s| {
            s.parse::<UserId>()
                .map_err(|_| ApiError::BadRequest(format!("invalid user id: {s}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let updated = match state.store.bulk_apply(&user_ids, &body.action) {
        Ok(n) => n,
        Err(wipay_store::StoreError::NotFound) => {
            // All-or-nothing: report the full set as failed
            tracing::warn!(
                admin_id = %admin.user_id,
                accounts = %user_ids.len(),
                action = ?body.action,
                "Bulk action aborted: missing account"
            );
            return Ok(Json(BulkActionResponse {
                outcome: BulkOutcome {
                    success: 0,
                    failed: user_ids.len(),
                },
            }));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        admin_id = %admin.user_id,
        accounts = %updated,
        action = ?body.action,
        "Bulk action applied"
    );

    Ok(Json(BulkActionResponse {
        outcome: BulkOutcome {
            success: updated,
            failed: 0,
        },
    }))
}
