use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct CloneArgs {
    /// The base URL of the remote repository.
    url: String,

    /// Destination directory to create and clone into.
    dir: PathBuf,
}

pub fn run(args: &CloneArgs) -> Result<()> {
    tinygit::pack::clone(&args.url, &args.dir)?;
    Ok(())
}
