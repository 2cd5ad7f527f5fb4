use crate::{Connection, Result};

embed_migrations!("migrations");

/// Brings the schema up to date. Used by the CLI and by the test harness.
pub fn run(conn: &Connection) -> Result<()> {
    embedded_migrations::run(conn)?;
    Ok(())
}
