//! # ledgerdb-accounts
//!
//! The account domain on top of the generic mapping layer: the `Account`
//! entity with its movement history, and the business operations callers
//! consume (create, ownership-checked reads, movement booking, deletion).
//! Collaborators never see families, qualifiers, or cells — only accounts.

pub mod account;
pub mod service;

pub use account::{Account, Movement, MOVEMENT_FAMILY, OWNER_EMAIL_QUALIFIER};
pub use service::{AccountError, AccountService};
