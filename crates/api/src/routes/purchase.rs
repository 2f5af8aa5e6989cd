//! Purchase endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use common::{CustomerId, ProductId};
use domain::PurchaseService;
use store::Store;

use crate::error::ApiError;

/// Body returned for a successful purchase.
pub const PURCHASE_SUCCESSFUL: &str = "Purchase successful";

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub purchase_service: PurchaseService<S>,
}

/// POST /api/purchase/{customer_id}/{product_id} — buy one product.
///
/// Ids that are not integers are rejected by the path extractor with 400.
#[tracing::instrument(skip(state))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((customer_id, product_id)): Path<(i64, i64)>,
) -> Result<&'static str, ApiError> {
    state
        .purchase_service
        .purchase(CustomerId::new(customer_id), ProductId::new(product_id))
        .await?;

    Ok(PURCHASE_SUCCESSFUL)
}
