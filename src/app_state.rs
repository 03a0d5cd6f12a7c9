//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    transaction::{LedgerService, SQLiteTransactionStore, TransactionStore},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<T> {
    /// The service that records and queries transactions.
    pub ledger: LedgerService<T>,
}

impl AppState<SQLiteTransactionStore> {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self::with_store(SQLiteTransactionStore::new(connection)))
    }
}

impl<T> AppState<T>
where
    T: TransactionStore,
{
    /// Create a new [AppState] backed by `transaction_store`.
    pub fn with_store(transaction_store: T) -> Self {
        Self {
            ledger: LedgerService::new(transaction_store),
        }
    }
}

impl<T> FromRef<AppState<T>> for LedgerService<T>
where
    T: Clone,
{
    fn from_ref(state: &AppState<T>) -> Self {
        state.ledger.clone()
    }
}
