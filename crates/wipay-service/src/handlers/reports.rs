//! Sales report handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wipay_core::{aggregate, PlanAction, ReportPeriod, ReportSummary, ReportTable, Token, UserId};
use wipay_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Page size when walking an operator's voucher history.
const REPORT_PAGE_SIZE: usize = 1_000;

/// Report query parameters.
///
/// Either `period=week|month|year`, or both `start` and `end` for a custom
/// range. Custom ranges require a plan with advanced reports.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Predefined period name.
    pub period: Option<String>,
    /// Custom range start.
    pub start: Option<DateTime<Utc>>,
    /// Custom range end (inclusive through the end of its day).
    pub end: Option<DateTime<Utc>>,
}

/// Report response: the summary plus its tabular export form.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    /// Aggregated figures.
    #[serde(flatten)]
    pub summary: ReportSummary,
    /// Tabular form for PDF export.
    pub table: ReportTable,
}

/// Aggregate the operator's voucher sales for a period.
pub async fn report_summary(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    let period = parse_period(&query)?;

    if matches!(period, ReportPeriod::Custom { .. }) {
        let subscription = state
            .store
            .get_subscription(&auth.user_id)?
            .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

        let check = subscription.validate_action(PlanAction::ViewAdvancedReports);
        if !check.allowed {
            return Err(ApiError::Forbidden);
        }
    }

    let now = Utc::now();
    let (range_start, _) = period.range(now);
    let tokens = collect_tokens_since(
        state.store.as_ref(),
        &auth.user_id,
        range_start,
        REPORT_PAGE_SIZE,
    )?;

    let summary = aggregate(&tokens, &period, now);
    let table = summary.to_table();

    tracing::debug!(
        user_id = %auth.user_id,
        transactions = %summary.transactions,
        revenue = %summary.revenue,
        "Report generated"
    );

    Ok(Json(ReportResponse { summary, table }))
}

/// Walk the operator's voucher history page by page.
///
/// Listings come back newest first, so the walk stops as soon as a page ends
/// before `start`; the aggregation filters out whatever from the boundary
/// page falls outside the range.
fn collect_tokens_since<S: Store + ?Sized>(
    store: &S,
    user_id: &UserId,
    start: DateTime<Utc>,
    page_size: usize,
) -> Result<Vec<Token>, ApiError> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    loop {
        let page = store.list_tokens_by_user(user_id, page_size, offset)?;
        let page_len = page.len();
        let past_range = page.last().is_some_and(|t| t.created_at < start);

        tokens.extend(page);

        if page_len < page_size || past_range {
            break;
        }
        offset += page_len;
    }

    Ok(tokens)
}

fn parse_period(query: &ReportQuery) -> Result<ReportPeriod, ApiError> {
    if let Some(name) = &query.period {
        return match name.as_str() {
            "week" => Ok(ReportPeriod::Week),
            "month" => Ok(ReportPeriod::Month),
            "year" => Ok(ReportPeriod::Year),
            other => Err(ApiError::BadRequest(format!(
                "unknown period: {other} (expected week, month, or year)"
            ))),
        };
    }

    match (query.start, query.end) {
        (Some(start), Some(end)) => {
            if end < start {
                return Err(ApiError::BadRequest("end must not be before start".into()));
            }
            Ok(ReportPeriod::Custom { start, end })
        }
        _ => Err(ApiError::BadRequest(
            "specify period=week|month|year or both start and end".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;
    use wipay_core::{
        PaymentMethod, Plan, PricingConfig, Subscription, Token, TokenDuration, UserId,
    };
    use wipay_store::RocksStore;

    fn seed_store(token_count: usize) -> (RocksStore, TempDir, UserId) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();

        let user_id = UserId::generate();
        let mut subscription = Subscription::new_free(user_id, 1);
        subscription.plan = Plan::Enterprise;
        store.put_subscription(&subscription).unwrap();

        for _ in 0..token_count {
            let token = Token::issue(
                user_id,
                "+211920000002".into(),
                TokenDuration::OneHour,
                PaymentMethod::Cash,
                &PricingConfig::default(),
            )
            .unwrap();
            store.issue_token(&token).unwrap();
        }

        (store, dir, user_id)
    }

    #[test]
    fn collects_history_across_pages() {
        let (store, _dir, user_id) = seed_store(5);
        let start = Utc::now() - Duration::days(1);

        let tokens = collect_tokens_since(&store, &user_id, start, 2).unwrap();
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn stops_paging_once_past_the_range_start() {
        let (store, _dir, user_id) = seed_store(6);
        // Everything was just created, so a start in the future puts the
        // whole history behind the range after the first page.
        let start = Utc::now() + Duration::seconds(1);

        let tokens = collect_tokens_since(&store, &user_id, start, 2).unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn empty_history_yields_no_tokens() {
        let (store, _dir, user_id) = seed_store(0);
        let start = Utc::now() - Duration::days(7);

        let tokens = collect_tokens_since(&store, &user_id, start, 1_000).unwrap();
        assert!(tokens.is_empty());
    }
}
