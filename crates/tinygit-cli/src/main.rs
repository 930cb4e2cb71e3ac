//! `tinygit` — the thin command-line shell around the `tinygit` library (spec.md §6).

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tinygit")]
#[command(version, about = "A minimal content-addressed object store and clone engine")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a .git skeleton in the current directory
    Init,

    /// Write an object's payload bytes to standard output
    #[command(name = "cat-file")]
    CatFile(commands::cat_file::CatFileArgs),

    /// Store a file as a blob and print its oid
    #[command(name = "hash-object")]
    HashObject(commands::hash_object::HashObjectArgs),

    /// Print the entries of a tree object
    #[command(name = "ls-tree")]
    LsTree(commands::ls_tree::LsTreeArgs),

    /// Materialize the current directory as a tree and print its oid
    #[command(name = "write-tree")]
    WriteTree,

    /// Build a commit object and print its oid
    #[command(name = "commit-tree")]
    CommitTree(commands::commit_tree::CommitTreeArgs),

    /// Initialize a directory and fetch refs + pack from a remote
    Clone(commands::clone::CloneArgs),
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::CatFile(args) => commands::cat_file::run(&args),
        Commands::HashObject(args) => commands::hash_object::run(&args),
        Commands::LsTree(args) => commands::ls_tree::run(&args),
        Commands::WriteTree => commands::write_tree::run(),
        Commands::CommitTree(args) => commands::commit_tree::run(&args),
        Commands::Clone(args) => commands::clone::run(&args),
    };

    if let Err(err) = result {
        eprintln!("tinygit: {err}");
        std::process::exit(1);
    }
}
