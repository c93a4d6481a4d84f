//! `syncbridge root` — print the resolved sync root.

use anyhow::Result;

use super::Session;

pub fn run(session: &Session) -> Result<()> {
    session.warn_if_degraded();
    let root = session.client.refresh_sync_root();
    println!("{}", root.display());
    Ok(())
}
