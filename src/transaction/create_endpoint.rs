//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    session::{SessionContext, set_session_cookie},
    transaction::{LedgerService, NewTransaction, TransactionStore, TransactionType},
};

/// The JSON body for creating a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Text detailing the transaction.
    pub title: String,
    /// The unsigned value of the transaction, must be greater than zero.
    pub amount: f64,
    /// Whether the amount was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl CreateTransactionRequest {
    fn validate(self) -> Result<NewTransaction, Error> {
        NewTransaction::new(self.title, self.amount, self.transaction_type)
    }
}

/// A route handler for creating a new transaction, responds with 201 Created on success.
///
/// If the client did not send a session cookie, a new session is minted and
/// its cookie is set on the response.
pub async fn create_transaction_endpoint<T>(
    State(ledger): State<LedgerService<T>>,
    session: SessionContext,
    jar: CookieJar,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore,
{
    let Json(request) = body.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let new_transaction = request.validate()?;

    let created = ledger.create(new_transaction, &session)?;

    let jar = if created.is_new_session {
        set_session_cookie(jar, &created.session)
    } else {
        jar
    };

    Ok((StatusCode::CREATED, jar))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::CookieJar;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        session::{COOKIE_SESSION_ID, SessionContext, SessionToken},
        transaction::{
            LedgerService, SQLiteTransactionStore, TransactionStore, TransactionType,
            create_endpoint::{CreateTransactionRequest, create_transaction_endpoint},
        },
    };

    fn get_ledger() -> LedgerService<SQLiteTransactionStore> {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        LedgerService::new(SQLiteTransactionStore::new(Arc::new(Mutex::new(conn))))
    }

    fn request(title: &str, amount: f64, transaction_type: TransactionType) -> CreateTransactionRequest {
        CreateTransactionRequest {
            title: title.to_owned(),
            amount,
            transaction_type,
        }
    }

    #[tokio::test]
    async fn sets_cookie_for_new_session() {
        let ledger = get_ledger();

        let response = create_transaction_endpoint(
            State(ledger.clone()),
            SessionContext::default(),
            CookieJar::new(),
            Ok(Json(request("Freelance", 100.0, TransactionType::Income))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("expected a set-cookie header")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with(&format!("{COOKIE_SESSION_ID}=")));
        assert!(set_cookie.contains("Max-Age=604800"));
        assert!(set_cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn does_not_set_cookie_for_existing_session() {
        let ledger = get_ledger();
        let session = SessionToken::new("session-a");

        let response = create_transaction_endpoint(
            State(ledger.clone()),
            SessionContext::with_token(session.clone()),
            CookieJar::new(),
            Ok(Json(request("Car", 500.0, TransactionType::Expense))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get("set-cookie").is_none());
        let transactions = ledger.list_by_session(&session).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, -500.0);
    }

    #[tokio::test]
    async fn rejects_invalid_request_without_storing() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
        let ledger = LedgerService::new(store.clone());

        let response = create_transaction_endpoint(
            State(ledger),
            SessionContext::default(),
            CookieJar::new(),
            Ok(Json(request("", 100.0, TransactionType::Income))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("set-cookie").is_none());
        assert!(store.get_all().unwrap().is_empty());
    }
}
