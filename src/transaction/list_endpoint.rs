//! Defines the endpoint for listing the transactions of the caller's session.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    session::SessionToken,
    transaction::{LedgerService, Transaction, TransactionStore},
};

/// The JSON body returned by [get_transactions_endpoint].
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    /// The session's transactions, oldest first.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing the transactions of the session in the `sessionId` cookie.
///
/// Must be mounted behind [session_guard](crate::session_guard).
pub async fn get_transactions_endpoint<T>(
    State(ledger): State<LedgerService<T>>,
    Extension(session): Extension<SessionToken>,
) -> Result<Json<TransactionsResponse>, Error>
where
    T: TransactionStore,
{
    let transactions = ledger.list_by_session(&session)?;

    Ok(Json(TransactionsResponse { transactions }))
}
