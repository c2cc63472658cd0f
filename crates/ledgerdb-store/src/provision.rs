//! Schema provisioning.
//!
//! Runs once per repository construction: ensures the backing table and all
//! required column families exist before first use. Create-if-absent and
//! race-tolerant, so concurrent repositories for the same entity type
//! converge on the same schema instead of erroring.

use log::{debug, info};

use crate::client::StoreClient;
use crate::error::Result;

/// Ensures `table` exists with the given families, creating it if absent.
pub fn ensure_table(client: &dyn StoreClient, table: &str, families: &[String]) -> Result<()> {
    if client.table_exists(table)? {
        debug!("table '{}' already provisioned", table);
        return Ok(());
    }
    info!("provisioning table '{}' with families {:?}", table, families);
    match client.create_table(table, families) {
        Ok(()) => Ok(()),
        // A concurrent provisioner may have won the race; converge.
        Err(err) => {
            if client.table_exists(table).unwrap_or(false) {
                debug!("table '{}' was created concurrently", table);
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}
