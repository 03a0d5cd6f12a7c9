//! Defines the endpoint for the balance of the caller's session.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    session::SessionToken,
    transaction::{LedgerService, TransactionStore},
};

/// The balance of a session.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    /// The sum of the signed amounts of the session's transactions.
    pub amount: f64,
}

/// The JSON body returned by [get_summary_endpoint].
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// The session's balance.
    pub summary: Summary,
}

/// A route handler for the balance of the session in the `sessionId` cookie.
///
/// Must be mounted behind [session_guard](crate::session_guard).
pub async fn get_summary_endpoint<T>(
    State(ledger): State<LedgerService<T>>,
    Extension(session): Extension<SessionToken>,
) -> Result<Json<SummaryResponse>, Error>
where
    T: TransactionStore,
{
    let amount = ledger.summary(&session)?;

    Ok(Json(SummaryResponse {
        summary: Summary { amount },
    }))
}
