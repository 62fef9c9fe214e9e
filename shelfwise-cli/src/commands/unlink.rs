use std::path::Path;

use crate::CliError;

use super::open_catalog;

pub(crate) fn run_unlink(db_path: &Path, organization_id: &str, book_id: &str) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    shelfwise_db::set_availability(&conn, organization_id, book_id, false)
        .map_err(|e| CliError::database(e.to_string()))?;
    log::info!("Marked {} unavailable for {}", book_id, organization_id);
    Ok(())
}
