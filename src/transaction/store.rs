//! Defines the transaction store trait.

use crate::{
    Error,
    session::SessionToken,
    transaction::{Transaction, TransactionBuilder, TransactionId},
};

/// Handles the creation and retrieval of transactions.
///
/// Every write is a single insert of an independent row, so implementations
/// only need the atomicity of a single statement.
pub trait TransactionStore {
    /// Insert a new transaction into the store.
    ///
    /// The store assigns the creation time.
    fn insert(&self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve every transaction in the store, in insertion order.
    fn get_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Retrieve a transaction from the store by its `id` alone.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no transaction has the ID `id`.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve the transaction with `id` if, and only if, it belongs to `session`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the transaction does not exist or if it
    /// belongs to another session.
    fn get_owned(&self, id: TransactionId, session: &SessionToken) -> Result<Transaction, Error>;

    /// Retrieve the transactions of `session` ordered by creation time, oldest first.
    fn get_by_session(&self, session: &SessionToken) -> Result<Vec<Transaction>, Error>;

    /// The sum of the amounts of the transactions of `session`, zero if it has none.
    fn sum_by_session(&self, session: &SessionToken) -> Result<f64, Error>;
}
