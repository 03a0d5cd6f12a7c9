//! Application router configuration with gated and ungated route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post},
};

use crate::{
    AppState,
    access_gate::session_guard,
    endpoints, json_error,
    transaction::{
        TransactionStore, create_transaction_endpoint, get_summary_endpoint,
        get_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Reads require a `sessionId` cookie. Creating a transaction does not,
/// since that is how a client gets a session in the first place.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let unprotected_routes = Router::new()
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint::<T>))
        .route(
            endpoints::TRANSACTIONS_SLASH,
            post(create_transaction_endpoint::<T>),
        );

    let protected_routes = Router::new()
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint::<T>))
        .route(
            endpoints::TRANSACTIONS_SLASH,
            get(get_transactions_endpoint::<T>),
        )
        .route(
            endpoints::TRANSACTIONS_SUMMARY,
            get(get_summary_endpoint::<T>),
        )
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint::<T>))
        .route_layer(middleware::from_fn(session_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not found.")
}
