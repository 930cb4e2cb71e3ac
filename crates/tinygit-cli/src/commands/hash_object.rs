use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tinygit::object::ObjectType;
use tinygit::{LooseStore, ObjectStore};

#[derive(Args)]
pub struct HashObjectArgs {
    /// Write the object into the store (the only mode this build supports).
    #[arg(short = 'w')]
    write: bool,

    /// Path to the file to hash.
    path: PathBuf,
}

pub fn run(args: &HashObjectArgs) -> Result<()> {
    if !args.write {
        anyhow::bail!("hash-object requires -w");
    }
    let cwd = std::env::current_dir()?;
    let store = LooseStore::open(&cwd)?;
    let contents = std::fs::read(&args.path)?;
    let oid = store.put(ObjectType::Blob, &contents)?;
    println!("{oid}");
    Ok(())
}
