//! Defines the endpoint for fetching a single transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Error,
    session::SessionToken,
    transaction::{LedgerService, Transaction, TransactionStore},
};

/// The JSON body returned by [get_transaction_endpoint].
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// The requested transaction.
    pub transaction: Transaction,
}

/// A route handler for getting a transaction by its ID.
///
/// Responds with 404 if the transaction does not exist, belongs to another
/// session or if `transaction_id` is not a UUID, so that clients cannot tell
/// these cases apart.
///
/// Must be mounted behind [session_guard](crate::session_guard).
pub async fn get_transaction_endpoint<T>(
    State(ledger): State<LedgerService<T>>,
    Extension(session): Extension<SessionToken>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, Error>
where
    T: TransactionStore,
{
    let transaction_id = Uuid::parse_str(&transaction_id).map_err(|_| Error::NotFound)?;
    let transaction = ledger.get_by_id(&session, transaction_id)?;

    Ok(Json(TransactionResponse { transaction }))
}
