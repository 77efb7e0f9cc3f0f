pub mod category;
pub mod profile;
pub mod session;
pub mod transaction;

pub use category::{Category, NewCategory};
pub use profile::{NewProfile, Profile};
pub use session::Session;
pub use transaction::{NewTransaction, Transaction, TransactionFields};

/// Identifiers are database-generated `BIGSERIAL` values
pub type ProfileId = i64;
pub type CategoryId = i64;
pub type TransactionId = i64;
