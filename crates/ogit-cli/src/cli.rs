use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ogit_types::ObjectKind;

#[derive(Parser)]
#[command(name = "ogit", about = "OGit content tracker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new, empty repository
    Init(InitArgs),
    /// Compute an object id and optionally store the object
    HashObject(HashObjectArgs),
    /// Print the payload of a stored object
    CatFile(CatFileArgs),
    /// List the entries of a tree
    LsTree(LsTreeArgs),
    /// Write a commit's or tree's contents into an empty directory
    Checkout(CheckoutArgs),
    /// Print a commit's ancestry as a Graphviz graph
    Log(LogArgs),
    /// Store a directory as a tree
    WriteTree(WriteTreeArgs),
    /// Create a commit object from a tree
    CommitTree(CommitTreeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to create the repository
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Object kind
    #[arg(short = 't', long = "type", default_value = "blob", value_parser = parse_kind)]
    pub kind: ObjectKind,
    /// Write the object into the repository
    #[arg(short, long)]
    pub write: bool,
    /// File to read
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Expected object kind
    #[arg(value_parser = parse_kind)]
    pub kind: ObjectKind,
    /// Full object id
    pub object: String,
}

#[derive(Args)]
pub struct LsTreeArgs {
    /// Tree id
    pub tree: String,
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Commit or tree id
    pub object: String,
    /// Empty (or missing) target directory
    pub path: PathBuf,
}

#[derive(Args)]
pub struct LogArgs {
    /// Commit to start from
    pub commit: String,
}

#[derive(Args)]
pub struct WriteTreeArgs {
    /// Directory to store (defaults to the repository worktree)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CommitTreeArgs {
    /// Tree id
    pub tree: String,
    /// Parent commit id (repeatable)
    #[arg(short = 'p', long = "parent")]
    pub parents: Vec<String>,
    /// Commit message
    #[arg(short, long)]
    pub message: String,
    /// Author as `Name <email>`
    #[arg(long, default_value = "ogit <ogit@localhost>")]
    pub author: String,
}

fn parse_kind(s: &str) -> Result<ObjectKind, String> {
    s.parse().map_err(|e: ogit_types::TypeError| e.to_string())
}
