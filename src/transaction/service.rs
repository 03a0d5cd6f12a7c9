//! The ledger operations: recording transactions and querying them per session.

use uuid::Uuid;

use crate::{
    Error,
    session::{SessionContext, SessionToken, ensure},
    transaction::{NewTransaction, Transaction, TransactionId, TransactionStore},
};

/// The result of [LedgerService::create].
///
/// The service does not touch the response; the caller decides how to hand
/// `session` back to the client when `is_new_session` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTransaction {
    /// The transaction as stored.
    pub transaction: Transaction,
    /// The session the transaction was recorded under.
    pub session: SessionToken,
    /// Whether `session` was minted by this call.
    pub is_new_session: bool,
}

/// Records transactions and answers queries scoped to a session.
///
/// The service holds no state of its own besides the store.
#[derive(Debug, Clone)]
pub struct LedgerService<T> {
    store: T,
}

impl<T> LedgerService<T>
where
    T: TransactionStore,
{
    /// Create a service backed by `store`.
    pub fn new(store: T) -> Self {
        Self { store }
    }

    /// Record a new transaction for the session in `context`, minting a
    /// session if the client does not have one yet.
    ///
    /// Every call creates a new transaction, even if it is identical to an
    /// earlier one.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] or [Error::DatabaseLockError] if the
    /// transaction could not be stored.
    pub fn create(
        &self,
        new_transaction: NewTransaction,
        context: &SessionContext,
    ) -> Result<CreatedTransaction, Error> {
        let (session, is_new_session) = ensure(context.token.clone());

        if is_new_session {
            tracing::info!("Minted a new session.");
        }

        let transaction = self.store.insert(
            Transaction::build(
                Uuid::new_v4(),
                new_transaction.title(),
                new_transaction.signed_amount(),
            )
            .session_id(Some(session.clone())),
        )?;

        tracing::info!(
            "Recorded transaction {} ({:?}, {}).",
            transaction.id,
            new_transaction.transaction_type(),
            transaction.amount
        );

        Ok(CreatedTransaction {
            transaction,
            session,
            is_new_session,
        })
    }

    /// Get the transactions of `session`, oldest first.
    ///
    /// An unknown or expired session simply has no transactions.
    pub fn list_by_session(&self, session: &SessionToken) -> Result<Vec<Transaction>, Error> {
        let transactions = self.store.get_by_session(session)?;
        tracing::debug!("Found {} transactions for the session.", transactions.len());

        Ok(transactions)
    }

    /// Get the transaction with `id` if it belongs to `session`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] both when the transaction does not exist and
    /// when it belongs to another session.
    pub fn get_by_id(
        &self,
        session: &SessionToken,
        id: TransactionId,
    ) -> Result<Transaction, Error> {
        tracing::debug!("Fetching transaction {id}.");

        self.store.get_owned(id, session)
    }

    /// The sum of the signed amounts of the transactions of `session`.
    ///
    /// Returns zero if the session has no transactions.
    pub fn summary(&self, session: &SessionToken) -> Result<f64, Error> {
        self.store.sum_by_session(session)
    }
}

#[cfg(test)]
mod ledger_service_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use uuid::Uuid;

    use crate::{
        Error,
        db::initialize,
        session::{SessionContext, SessionToken},
        transaction::{
            LedgerService, NewTransaction, SQLiteTransactionStore, TransactionStore,
            TransactionType,
        },
    };

    fn get_service() -> LedgerService<SQLiteTransactionStore> {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        LedgerService::new(SQLiteTransactionStore::new(Arc::new(Mutex::new(conn))))
    }

    fn new_transaction(title: &str, amount: f64, transaction_type: TransactionType) -> NewTransaction {
        NewTransaction::new(title.to_owned(), amount, transaction_type).unwrap()
    }

    #[test]
    fn create_mints_session_when_absent() {
        let service = get_service();

        let created = service
            .create(
                new_transaction("Freelance", 100.0, TransactionType::Income),
                &SessionContext::default(),
            )
            .unwrap();

        assert!(created.is_new_session);
        assert_eq!(created.transaction.session_id, Some(created.session));
        assert_eq!(created.transaction.amount, 100.0);
    }

    #[test]
    fn create_keeps_existing_session() {
        let service = get_service();
        let session = SessionToken::new("session-a");

        let created = service
            .create(
                new_transaction("Car", 500.0, TransactionType::Expense),
                &SessionContext::with_token(session.clone()),
            )
            .unwrap();

        assert!(!created.is_new_session);
        assert_eq!(created.session, session);
        assert_eq!(created.transaction.amount, -500.0);
    }

    #[test]
    fn create_then_list() {
        let service = get_service();
        let created = service
            .create(
                new_transaction("Keyboard", 100.0, TransactionType::Expense),
                &SessionContext::default(),
            )
            .unwrap();

        let transactions = service.list_by_session(&created.session).unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].title, "Keyboard");
        assert_eq!(transactions[0].amount, -100.0);
    }

    #[test]
    fn identical_creates_are_not_deduplicated() {
        let service = get_service();
        let context = SessionContext::with_token(SessionToken::new("session-a"));

        let first = service
            .create(new_transaction("Coffee", 4.5, TransactionType::Expense), &context)
            .unwrap();
        let second = service
            .create(new_transaction("Coffee", 4.5, TransactionType::Expense), &context)
            .unwrap();

        assert_ne!(first.transaction.id, second.transaction.id);
        assert_eq!(service.list_by_session(&first.session).unwrap().len(), 2);
    }

    #[test]
    fn sessions_are_isolated() {
        let service = get_service();
        let session_a = service
            .create(
                new_transaction("Wage", 1000.0, TransactionType::Income),
                &SessionContext::default(),
            )
            .unwrap();
        let session_b = service
            .create(
                new_transaction("Rent", 400.0, TransactionType::Expense),
                &SessionContext::default(),
            )
            .unwrap();

        assert_ne!(session_a.session, session_b.session);

        let transactions = service.list_by_session(&session_a.session).unwrap();
        assert_eq!(transactions, vec![session_a.transaction]);
    }

    #[test]
    fn get_by_id_returns_own_transaction_repeatedly() {
        let service = get_service();
        let created = service
            .create(
                new_transaction("Car", 500.0, TransactionType::Expense),
                &SessionContext::default(),
            )
            .unwrap();

        let first = service
            .get_by_id(&created.session, created.transaction.id)
            .unwrap();
        let second = service
            .get_by_id(&created.session, created.transaction.id)
            .unwrap();

        assert_eq!(first, created.transaction);
        assert_eq!(first, second);
    }

    #[test]
    fn get_by_id_masks_other_sessions_transaction() {
        let service = get_service();
        let created = service
            .create(
                new_transaction("Car", 500.0, TransactionType::Expense),
                &SessionContext::default(),
            )
            .unwrap();
        let other = SessionToken::new("session-b");

        let foreign = service.get_by_id(&other, created.transaction.id);
        let missing = service.get_by_id(&other, Uuid::new_v4());

        assert_eq!(foreign, Err(Error::NotFound));
        assert_eq!(foreign, missing);
    }

    #[test]
    fn summary_is_sum_of_signed_amounts() {
        let service = get_service();
        let created = service
            .create(
                new_transaction("Wage", 1000.0, TransactionType::Income),
                &SessionContext::default(),
            )
            .unwrap();
        service
            .create(
                new_transaction("Car", 500.0, TransactionType::Expense),
                &SessionContext::with_token(created.session.clone()),
            )
            .unwrap();

        assert_eq!(service.summary(&created.session).unwrap(), 500.0);
    }

    #[test]
    fn summary_is_zero_for_new_session() {
        let service = get_service();

        assert_eq!(service.summary(&SessionToken::new("session-a")).unwrap(), 0.0);
    }

    #[test]
    fn legacy_transactions_are_not_listed() {
        let service = get_service();
        let session = SessionToken::new("session-a");
        service
            .store
            .insert(crate::transaction::Transaction::build(Uuid::new_v4(), "Legacy", 1.0))
            .unwrap();

        assert!(service.list_by_session(&session).unwrap().is_empty());
        assert_eq!(service.store.get_all().unwrap().len(), 1);
    }
}
