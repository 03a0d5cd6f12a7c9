//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, named_params, types::Type};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{
    Error,
    session::SessionToken,
    transaction::{Transaction, TransactionBuilder, TransactionId, TransactionStore},
};

/// Stores transactions in the `transactions` table of a SQLite database.
///
/// The table must be created with [create_transaction_table] (or
/// [initialize](crate::initialize_db)) before the store is used.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire the database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, session_id, title, amount, created_at FROM transactions";

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is some SQL
    /// error, e.g. the ID is already taken.
    fn insert(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        let transaction = connection
            .prepare(
                "INSERT INTO transactions (id, session_id, title, amount)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, session_id, title, amount, created_at",
            )?
            .query_row(
                (
                    builder.id.to_string(),
                    builder.session_id,
                    builder.title,
                    builder.amount,
                ),
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        let transactions = connection
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at ASC, rowid ASC"))?
            .query_map([], map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(transactions)
    }

    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        let transaction = connection
            .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
            .query_row(&[(":id", &id.to_string())], map_transaction_row)?;

        Ok(transaction)
    }

    /// Ownership is part of the query predicate, so a transaction owned by
    /// another session takes the same path as a missing one.
    fn get_owned(&self, id: TransactionId, session: &SessionToken) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        let transaction = connection
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE id = :id AND session_id = :session_id"
            ))?
            .query_row(
                named_params! { ":id": id.to_string(), ":session_id": session },
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    fn get_by_session(&self, session: &SessionToken) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        let transactions = connection
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE session_id = :session_id ORDER BY created_at ASC, rowid ASC"
            ))?
            .query_map(named_params! { ":session_id": session }, map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(transactions)
    }

    /// # Errors
    /// Returns [Error::NonFiniteSum] if the amounts add up to more than an
    /// `f64` can hold.
    fn sum_by_session(&self, session: &SessionToken) -> Result<f64, Error> {
        let connection = self.lock()?;

        let sum: f64 = connection.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM transactions WHERE session_id = :session_id",
            named_params! { ":session_id": session },
            |row| row.get(0),
        )?;

        if !sum.is_finite() {
            tracing::error!("The sum of a session's transactions overflowed to {sum}.");
            return Err(Error::NonFiniteSum);
        }

        Ok(sum)
    }
}

/// Create the transactions table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY NOT NULL,
                session_id TEXT,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_session_id ON transactions(session_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_id).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(error))
    })?;
    let session_id = row.get(1)?;
    let title = row.get(2)?;
    let amount = row.get(3)?;
    let raw_created_at: String = row.get(4)?;
    let created_at = OffsetDateTime::parse(&raw_created_at, &Rfc3339).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id,
        session_id,
        title,
        amount,
        created_at,
    })
}
