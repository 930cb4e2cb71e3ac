use std::io::Write;

use anyhow::Result;
use clap::Args;
use tinygit::{LooseStore, ObjectStore, Oid};

#[derive(Args)]
pub struct CatFileArgs {
    /// Print the object's payload bytes (the only mode this build supports).
    #[arg(short = 'p')]
    pretty: bool,

    /// The object to read.
    oid: Oid,
}

pub fn run(args: &CatFileArgs) -> Result<()> {
    if !args.pretty {
        anyhow::bail!("cat-file requires -p");
    }
    let cwd = std::env::current_dir()?;
    let store = LooseStore::open(&cwd)?;
    let (_kind, payload) = store.get(args.oid)?;
    std::io::stdout().write_all(&payload)?;
    Ok(())
}
