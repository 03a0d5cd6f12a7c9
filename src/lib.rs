//! Tally is a small web service for recording income and expenses.
//!
//! Transactions are scoped to an anonymous session that is identified by a
//! `sessionId` cookie. The first transaction a client creates mints the
//! session, and every read afterwards is restricted to the transactions of
//! that session.
//!
//! This library provides a JSON REST API built on axum and SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod access_gate;
mod app_state;
mod db;
pub mod endpoints;
mod logging;
mod routing;
mod session;
mod transaction;

pub use access_gate::{check as check_session, session_guard};
pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use session::{COOKIE_SESSION_ID, SESSION_COOKIE_MAX_AGE, SessionContext, SessionToken};
pub use transaction::{
    CreateTransactionRequest, CreatedTransaction, LedgerService, NewTransaction,
    SQLiteTransactionStore, Summary, SummaryResponse, Transaction, TransactionBuilder,
    TransactionId, TransactionResponse, TransactionStore, TransactionType, TransactionsResponse,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body was malformed or failed validation, e.g. an empty
    /// title, a non-positive amount or an unknown transaction type.
    ///
    /// The string describes what was wrong and is safe to show to the client.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The request did not carry a session cookie.
    #[error("the session cookie is missing")]
    Unauthorized,

    /// The requested resource was not found.
    ///
    /// Transactions that belong to another session are also reported as not
    /// found so that clients cannot learn whether they exist.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The sum of a session's amounts overflowed to infinity, which cannot be
    /// represented in JSON.
    #[error("the sum of the session's transactions is not a finite number")]
    NonFiniteSum,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => {
                tracing::debug!("Rejected invalid request: {message}");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Validation error.", "message": message })),
                )
                    .into_response()
            }
            Error::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "Unauthorized."),
            Error::NotFound => json_error(StatusCode::NOT_FOUND, "Transaction not found."),
            // Storage errors are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        }
    }
}

/// Build a JSON response of the form `{"error": message}`.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
