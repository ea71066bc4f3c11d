//! Catalog lookup for a single content hash.

use anyhow::Result;

use crate::catalog::DescriptionCatalog;

/// Run the describe command: print what the local catalog knows about a
/// content hash.
pub fn run_describe(catalog: &DescriptionCatalog, hash: &str) -> Result<()> {
    match catalog.lookup(hash) {
        Some(description) => println!("{}", description),
        None => println!("No description on file for {}", hash),
    }
    Ok(())
}
