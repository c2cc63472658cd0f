//! Account business operations.
//!
//! Every operation that takes a caller email asserts ownership with a
//! filtered key read, so "found" already implies the caller owns the
//! account — no separate read-then-check round trips.

use std::sync::Arc;

use log::{debug, info};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use ledgerdb_store::{
    codec, Entity, Repository, RowFilter, StoreClient, StoreError, DEFAULT_FAMILY,
};

use crate::account::{Account, Movement, OWNER_EMAIL_QUALIFIER};

/// Errors surfaced by account operations.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("account not found")]
    NotFound,

    #[error("caller does not own this account")]
    PermissionDenied,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, AccountError>;

/// Service over one account repository.
pub struct AccountService {
    repository: Repository<Account>,
}

impl AccountService {
    /// Builds the service; fails if the backing schema cannot be ensured.
    pub fn new(client: Arc<dyn StoreClient>) -> Result<Self> {
        Ok(Self {
            repository: Repository::new(client)?,
        })
    }

    /// Opens a new account for the given owner.
    pub fn create_account(&self, owner_email: &str, description: &str) -> Result<Account> {
        if owner_email.is_empty() || !owner_email.contains('@') {
            return Err(AccountError::InvalidRequest(format!(
                "'{}' is not an email address",
                owner_email
            )));
        }
        let account = self
            .repository
            .create(Account::new(owner_email, description))?;
        info!("created account {:?} for {}", account.id(), owner_email);
        Ok(account)
    }

    /// Returns the account's attributes, without its movement history.
    pub fn account_by_id(&self, owner_email: &str, id: Uuid) -> Result<Account> {
        self.assert_owner(owner_email, id)?;
        self.repository
            .find_by_id(id)?
            .ok_or(AccountError::NotFound)
    }

    /// Returns the account's movement history, oldest first.
    ///
    /// An account with no persisted movement cells reads back with an
    /// absent collection; at this boundary that is reported as empty.
    pub fn movements_by_id(&self, owner_email: &str, id: Uuid) -> Result<Vec<Movement>> {
        let account = self.owned_account_with_movements(owner_email, id)?;
        Ok(account.movements.unwrap_or_default())
    }

    /// All accounts owned by the given email, in store-scan order.
    pub fn accounts_by_email(&self, owner_email: &str) -> Result<Vec<Account>> {
        Ok(self.repository.find_by_filter(&RowFilter::when(
            owner_filter(owner_email)?,
            RowFilter::Family(DEFAULT_FAMILY.to_string()),
        ))?)
    }

    /// Books a movement and folds its amount into the balance.
    ///
    /// This is a read followed by a separate atomic row write with no
    /// compare-and-set: concurrent movements on the same account race, and
    /// the write with the greatest cell timestamp wins. Accepted
    /// consistency model, not an oversight.
    pub fn add_movement(
        &self,
        owner_email: &str,
        id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> Result<Account> {
        let mut account = self.owned_account_with_movements(owner_email, id)?;
        account.movements.get_or_insert_with(Vec::new).push(Movement {
            amount,
            description: description.to_string(),
            time: chrono::Utc::now(),
        });
        account.balance = Some(account.balance.unwrap_or(Decimal::ZERO) + amount);
        debug!("booking {} on account {}", amount, id);
        Ok(self.repository.update(account)?)
    }

    /// Removes the account and its whole history.
    pub fn delete_account(&self, owner_email: &str, id: Uuid) -> Result<()> {
        self.assert_owner(owner_email, id)?;
        self.repository.delete_by_id(id)?;
        info!("deleted account {} for {}", id, owner_email);
        Ok(())
    }

    /// Loads the full row (movements included) after the ownership check.
    fn owned_account_with_movements(&self, owner_email: &str, id: Uuid) -> Result<Account> {
        self.assert_owner(owner_email, id)?;
        self.repository
            .find_by_id_with_filter(id, RowFilter::Pass)?
            .ok_or(AccountError::NotFound)
    }

    /// Asserts ownership within the key read itself. A miss is
    /// disambiguated with a plain key lookup: absent row means `NotFound`,
    /// present row means the caller is not the owner.
    fn assert_owner(&self, owner_email: &str, id: Uuid) -> Result<()> {
        if self
            .repository
            .find_by_id_with_filter(id, owner_filter(owner_email)?)?
            .is_some()
        {
            return Ok(());
        }
        if self.repository.find_by_id(id)?.is_none() {
            Err(AccountError::NotFound)
        } else {
            Err(AccountError::PermissionDenied)
        }
    }
}

/// Predicate matching rows whose owner-email column equals `owner_email`.
fn owner_filter(owner_email: &str) -> Result<RowFilter> {
    Ok(RowFilter::Chain(vec![
        RowFilter::Qualifier(OWNER_EMAIL_QUALIFIER.to_string()),
        RowFilter::Value(codec::encode(owner_email)?),
    ]))
}
