use anyhow::Result;
use clap::Args;
use tinygit::tree::{self, Mode};
use tinygit::{LooseStore, ObjectStore, Oid};

#[derive(Args)]
pub struct LsTreeArgs {
    /// Print only entry names.
    #[arg(long = "name-only")]
    name_only: bool,

    /// The tree object to list.
    oid: Oid,
}

pub fn run(args: &LsTreeArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let store = LooseStore::open(&cwd)?;
    let (_kind, payload) = store.get(args.oid)?;
    let entries = tree::decode_entries(&payload)?;

    for entry in entries {
        if args.name_only {
            println!("{}", entry.name);
        } else {
            let type_name = match entry.mode {
                Mode::Tree => "tree",
                Mode::Commit => "commit",
                Mode::Blob | Mode::BlobExecutable | Mode::Link => "blob",
            };
            println!("{} {} {}\t{}", entry.mode.as_str(), type_name, entry.oid, entry.name);
        }
    }
    Ok(())
}
