use anyhow::Result;
use tinygit::LooseStore;

pub fn run() -> Result<()> {
    let cwd = std::env::current_dir()?;
    LooseStore::init(&cwd)?;
    Ok(())
}
