//! Invoice handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wipay_core::{Invoice, InvoiceId, PlanType};
use wipay_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for invoice listings.
const DEFAULT_PAGE_LIMIT: usize = 50;

/// Maximum page size for invoice listings.
const MAX_PAGE_LIMIT: usize = 200;

/// Invoice creation request.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Customer name or identifier.
    pub customer: String,
    /// Billing arrangement.
    pub plan_type: PlanType,
    /// Base amount in SSP before fees and VAT.
    pub base_amount: i64,
    /// Whether to add the fixed installation fee.
    #[serde(default)]
    pub include_installation: bool,
    /// Whether to add the fixed equipment fee.
    #[serde(default)]
    pub include_equipment: bool,
    /// VAT rate in percent (the dashboard offers 0 and 18).
    pub vat_rate_percent: f64,
    /// When payment is due.
    pub due_date: DateTime<Utc>,
}

/// An invoice in API responses.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: String,
    /// Customer name.
    pub customer: String,
    /// Billing arrangement.
    pub plan_type: PlanType,
    /// Base amount in SSP.
    pub base_amount: i64,
    /// Installation fee applied (0 if not included).
    pub installation_fee: i64,
    /// Equipment fee applied (0 if not included).
    pub equipment_fee: i64,
    /// VAT amount in SSP.
    pub vat_amount: i64,
    /// Grand total in SSP.
    pub total_amount: i64,
    /// Amount received so far.
    pub amount_paid: i64,
    /// Amount still outstanding.
    pub balance_due: i64,
    /// Payment state.
    pub status: String,
    /// When payment is due.
    pub due_date: String,
    /// When the invoice was generated.
    pub generated_date: String,
    /// Reminders recorded so far.
    pub reminders_sent: u32,
    /// Days past due.
    pub days_overdue: u32,
    /// Aging bucket label for the current `days_overdue`.
    pub aging_bucket: &'static str,
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            customer: invoice.customer.clone(),
            plan_type: invoice.plan_type,
            base_amount: invoice.base_amount,
            installation_fee: invoice.installation_fee,
            equipment_fee: invoice.equipment_fee,
            vat_amount: invoice.vat_amount,
            total_amount: invoice.total_amount,
            amount_paid: invoice.amount_paid,
            balance_due: invoice.balance_due(),
            status: format!("{:?}", invoice.status).to_lowercase(),
            due_date: invoice.due_date.to_rfc3339(),
            generated_date: invoice.generated_date.to_rfc3339(),
            reminders_sent: invoice.reminders_sent,
            days_overdue: invoice.days_overdue,
            aging_bucket: invoice.aging_bucket().label(),
        }
    }
}

/// Create a customer invoice.
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    if body.customer.trim().is_empty() {
        return Err(ApiError::BadRequest("customer must not be empty".into()));
    }
    if body.base_amount < 0 {
        return Err(ApiError::BadRequest(
            "base_amount must not be negative".into(),
        ));
    }
    if body.vat_rate_percent < 0.0 {
        return Err(ApiError::BadRequest(
            "vat_rate_percent must not be negative".into(),
        ));
    }

    let invoice = Invoice::new(
        auth.user_id,
        body.customer,
        body.plan_type,
        body.base_amount,
        body.include_installation,
        body.include_equipment,
        body.vat_rate_percent,
        body.due_date,
    );

    state.store.put_invoice(&invoice)?;

    tracing::info!(
        user_id = %auth.user_id,
        invoice_id = %invoice.id,
        total = %invoice.total_amount,
        "Invoice created"
    );

    Ok(Json(InvoiceResponse::from(&invoice)))
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Page size (default 50, max 200).
    pub limit: Option<usize>,
    /// Entries to skip.
    pub offset: Option<usize>,
}

/// Invoice listing response.
#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
    /// Invoices, newest first.
    pub invoices: Vec<InvoiceResponse>,
}

/// List the operator's invoices, newest first.
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<ListInvoicesResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let invoices = state
        .store
        .list_invoices_by_user(&auth.user_id, limit, offset)?;

    Ok(Json(ListInvoicesResponse {
        invoices: invoices.iter().map(InvoiceResponse::from).collect(),
    }))
}

/// Payment recording request.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Amount received in SSP.
    pub amount: i64,
}

/// Record a payment against an invoice.
///
/// A payment covering the outstanding balance moves the invoice to `paid`;
/// anything less moves it to `partial`.
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RecordPaymentRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    if body.amount <= 0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }

    let mut invoice = owned_invoice(&state, &auth, &id)?;

    invoice.record_payment(body.amount);
    state.store.put_invoice(&invoice)?;

    tracing::info!(
        user_id = %auth.user_id,
        invoice_id = %invoice.id,
        amount = %body.amount,
        status = ?invoice.status,
        "Invoice payment recorded"
    );

    Ok(Json(InvoiceResponse::from(&invoice)))
}

/// Record that a payment reminder was sent.
pub async fn record_reminder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let mut invoice = owned_invoice(&state, &auth, &id)?;

    invoice.record_reminder(Utc::now());
    state.store.put_invoice(&invoice)?;

    tracing::info!(
        user_id = %auth.user_id,
        invoice_id = %invoice.id,
        reminders = %invoice.reminders_sent,
        "Invoice reminder recorded"
    );

    Ok(Json(InvoiceResponse::from(&invoice)))
}

/// Fetch an invoice and verify it belongs to the authenticated operator.
fn owned_invoice(state: &AppState, auth: &AuthUser, id: &str) -> Result<Invoice, ApiError> {
    let invoice_id = id
        .parse::<InvoiceId>()
        .map_err(|_| ApiError::BadRequest("invalid invoice id".into()))?;

    let invoice = state
        .store
        .get_invoice(&invoice_id)?
        .ok_or_else(|| ApiError::NotFound("Invoice not found".into()))?;

    if invoice.user_id != auth.user_id {
        return Err(ApiError::NotFound("Invoice not found".into()));
    }

    Ok(invoice)
}
