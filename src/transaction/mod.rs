//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction` request
//! - The `TransactionStore` trait and its SQLite implementation
//! - The `LedgerService` that scopes every operation to a session
//! - The route handlers for the `/transactions` API

mod core;
mod create_endpoint;
mod get_endpoint;
mod list_endpoint;
mod service;
mod sqlite;
mod store;
mod summary_endpoint;

pub use core::{NewTransaction, Transaction, TransactionBuilder, TransactionId, TransactionType};
pub use create_endpoint::{CreateTransactionRequest, create_transaction_endpoint};
pub use get_endpoint::{TransactionResponse, get_transaction_endpoint};
pub use list_endpoint::{TransactionsResponse, get_transactions_endpoint};
pub use service::{CreatedTransaction, LedgerService};
pub use sqlite::{SQLiteTransactionStore, create_transaction_table};
pub use store::TransactionStore;
pub use summary_endpoint::{Summary, SummaryResponse, get_summary_endpoint};
