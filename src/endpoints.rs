//! The API endpoints URIs.

/// The route to create and list transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// [TRANSACTIONS] with a trailing slash, which is served the same way.
pub const TRANSACTIONS_SLASH: &str = "/transactions/";
/// The route for the balance of the caller's session.
pub const TRANSACTIONS_SUMMARY: &str = "/transactions/summary";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
