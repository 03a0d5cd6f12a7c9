//! Defines the core data models for transactions.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, session::SessionToken};

/// The ID of a transaction, unique across all sessions.
pub type TransactionId = Uuid;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The session that created the transaction.
    ///
    /// `None` for transactions written without a session.
    pub session_id: Option<SessionToken>,
    /// A text description of what the transaction was for.
    pub title: String,
    /// The amount of money earned (positive) or spent (negative).
    pub amount: f64,
    /// When the transaction was recorded, assigned by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(id: TransactionId, title: &str, amount: f64) -> TransactionBuilder {
        TransactionBuilder {
            id,
            title: title.to_owned(),
            amount,
            session_id: None,
        }
    }
}

/// A builder for the fields of a [Transaction] that are chosen before it is stored.
///
/// The store assigns `created_at` when it inserts the transaction.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The ID to store the transaction under.
    pub id: TransactionId,

    /// A human-readable description of the transaction.
    pub title: String,

    /// The signed amount of the transaction.
    ///
    /// Positive values represent income, negative values represent
    /// expenses. The type of the transaction is not stored separately.
    ///
    /// # Examples
    /// - `1000.00` - Wage
    /// - `-500.00` - Car repairs
    pub amount: f64,

    /// The session that owns the transaction.
    pub session_id: Option<SessionToken>,
}

impl TransactionBuilder {
    /// Set the owning session for the transaction.
    pub fn session_id(mut self, session_id: Option<SessionToken>) -> Self {
        self.session_id = session_id;
        self
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// Fold the transaction type into the sign of `amount`.
    pub fn signed_amount(self, amount: f64) -> f64 {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

/// A validated request to record a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    title: String,
    amount: f64,
    transaction_type: TransactionType,
}

impl NewTransaction {
    /// Validate the fields of a new transaction.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if `title` is empty or if `amount` is
    /// not a finite number greater than zero.
    pub fn new(
        title: String,
        amount: f64,
        transaction_type: TransactionType,
    ) -> Result<Self, Error> {
        if title.is_empty() {
            return Err(Error::Validation("title must not be empty".to_owned()));
        }

        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Validation(format!(
                "amount must be a number greater than zero, got {amount}"
            )));
        }

        Ok(Self {
            title,
            amount,
            transaction_type,
        })
    }

    /// The title of the transaction.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The unsigned amount given by the client.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether the transaction is an income or an expense.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// The amount to store: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        self.transaction_type.signed_amount(self.amount)
    }
}

#[cfg(test)]
mod new_transaction_tests {
    use crate::{
        Error,
        transaction::{NewTransaction, TransactionType},
    };

    #[test]
    fn income_keeps_sign() {
        let transaction =
            NewTransaction::new("Wage".to_owned(), 1000.0, TransactionType::Income).unwrap();

        assert_eq!(transaction.signed_amount(), 1000.0);
    }

    #[test]
    fn expense_is_negated() {
        let transaction =
            NewTransaction::new("Keyboard".to_owned(), 100.0, TransactionType::Expense).unwrap();

        assert_eq!(transaction.signed_amount(), -100.0);
    }

    #[test]
    fn rejects_empty_title() {
        let result = NewTransaction::new(String::new(), 1.0, TransactionType::Income);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = NewTransaction::new("Car".to_owned(), amount, TransactionType::Expense);

            assert!(
                matches!(result, Err(Error::Validation(_))),
                "want validation error for amount {amount}, got {result:?}"
            );
        }
    }

    #[test]
    fn transaction_type_uses_lowercase_names() {
        let income: TransactionType = serde_json::from_str("\"income\"").unwrap();
        let expense: TransactionType = serde_json::from_str("\"expense\"").unwrap();

        assert_eq!(income, TransactionType::Income);
        assert_eq!(expense, TransactionType::Expense);
        assert!(serde_json::from_str::<TransactionType>("\"refund\"").is_err());
    }
}
