use anyhow::Result;
use clap::Args;
use tinygit::commit::{self, Clock, Signature, SystemClock};
use tinygit::{LooseStore, Oid};

#[derive(Args)]
pub struct CommitTreeArgs {
    /// The tree object this commit records.
    tree: Oid,

    /// Parent commit(s); may be repeated.
    #[arg(short = 'p')]
    parent: Vec<Oid>,

    /// The commit message.
    #[arg(short = 'm', required = true)]
    message: String,
}

/// The CLI doesn't read identity from the environment (out of scope per spec.md §1); this is
/// the fixed author/committer identity `commit-tree` signs with.
fn ambient_signature() -> Signature {
    Signature {
        name: "tinygit".to_string(),
        email: "tinygit@localhost".to_string(),
        seconds: SystemClock.now_seconds(),
        tz_offset: "+0000".to_string(),
    }
}

pub fn run(args: &CommitTreeArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let store = LooseStore::open(&cwd)?;
    let signature = ambient_signature();
    let oid = commit::commit_tree(&store, args.tree, &args.parent, &signature, &signature, &args.message)?;
    println!("{oid}");
    Ok(())
}
