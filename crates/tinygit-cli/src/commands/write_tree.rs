use anyhow::Result;
use tinygit::tree;
use tinygit::LooseStore;

pub fn run() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let store = LooseStore::open(&cwd)?;
    let oid = tree::write_tree(&store, &cwd)?;
    println!("{oid}");
    Ok(())
}
