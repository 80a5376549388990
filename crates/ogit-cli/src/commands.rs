use std::collections::HashSet;
use std::fs;
use std::io::Write;

use anyhow::{bail, Context};
use colored::Colorize;
use ogit_dag::{visit_order, walk};
use ogit_repo::{checkout, write_tree_from_dir, Repository};
use ogit_store::{Commit, Envelope, Object, ObjectStore, StoreError, Tree};
use ogit_types::{ObjectId, ObjectKind};

use crate::cli::*;
use crate::graph::{render_dot, summary_line, LogNode};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::HashObject(args) => cmd_hash_object(args),
        Command::CatFile(args) => cmd_cat_file(args),
        Command::LsTree(args) => cmd_ls_tree(args),
        Command::Checkout(args) => cmd_checkout(args),
        Command::Log(args) => cmd_log(args),
        Command::WriteTree(args) => cmd_write_tree(args),
        Command::CommitTree(args) => cmd_commit_tree(args),
    }
}

fn current_repo() -> anyhow::Result<Repository> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Repository::discover(&cwd).context("not inside an ogit repository")
}

fn parse_id(text: &str) -> anyhow::Result<ObjectId> {
    ObjectId::from_hex(text).with_context(|| format!("invalid object id '{text}'"))
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let repo = Repository::init(&args.path)
        .with_context(|| format!("cannot initialize repository in {}", args.path.display()))?;
    println!(
        "{} Initialized empty OGit repository in {}",
        "✓".green().bold(),
        repo.ogit_dir().display().to_string().bold()
    );
    Ok(())
}

fn cmd_hash_object(args: HashObjectArgs) -> anyhow::Result<()> {
    let data = fs::read(&args.path)
        .with_context(|| format!("cannot read {}", args.path.display()))?;
    // Reject payloads that would not read back as the requested kind.
    Object::deserialize(args.kind, &data)
        .with_context(|| format!("{} is not a valid {}", args.path.display(), args.kind))?;

    let envelope = Envelope::new(args.kind, data);
    let id = if args.write {
        current_repo()?.store().write(&envelope)?
    } else {
        envelope.compute_id()
    };
    println!("{id}");
    Ok(())
}

fn cmd_cat_file(args: CatFileArgs) -> anyhow::Result<()> {
    let repo = current_repo()?;
    let id = parse_id(&args.object)?;
    let envelope = repo.store().read(&id)?;
    if envelope.kind != args.kind {
        return Err(StoreError::KindMismatch {
            id,
            expected: args.kind,
            actual: envelope.kind,
        }
        .into());
    }
    let mut out = std::io::stdout().lock();
    out.write_all(&envelope.payload)?;
    out.flush()?;
    Ok(())
}

fn cmd_ls_tree(args: LsTreeArgs) -> anyhow::Result<()> {
    let repo = current_repo()?;
    let tree = repo.store().read_tree(&parse_id(&args.tree)?)?;
    let mut out = std::io::stdout().lock();
    for line in ls_tree_lines(&tree) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn cmd_checkout(args: CheckoutArgs) -> anyhow::Result<()> {
    let repo = current_repo()?;
    let store = repo.store();
    let tree = resolve_tree(&store, parse_id(&args.object)?)?;
    checkout(&store, &tree, &args.path)
        .with_context(|| format!("cannot check out into {}", args.path.display()))?;
    println!(
        "{} Checked out {} into {}",
        "✓".green().bold(),
        args.object.yellow(),
        args.path.display()
    );
    Ok(())
}

fn cmd_log(args: LogArgs) -> anyhow::Result<()> {
    let repo = current_repo()?;
    let dot = log_graph(&repo.store(), parse_id(&args.commit)?)?;
    print!("{dot}");
    Ok(())
}

fn cmd_write_tree(args: WriteTreeArgs) -> anyhow::Result<()> {
    let repo = current_repo()?;
    let dir = args.path.unwrap_or_else(|| repo.worktree().to_path_buf());
    let id = write_tree_from_dir(&repo.store(), &dir)
        .with_context(|| format!("cannot store {}", dir.display()))?;
    println!("{id}");
    Ok(())
}

fn cmd_commit_tree(args: CommitTreeArgs) -> anyhow::Result<()> {
    let repo = current_repo()?;
    let store = repo.store();

    let tree = parse_id(&args.tree)?;
    store
        .read_tree(&tree)
        .with_context(|| format!("{} is not a stored tree", args.tree))?;

    let now = chrono::Local::now();
    let signature = format!("{} {} {}", args.author, now.timestamp(), now.format("%z"));
    let mut builder = Commit::builder(tree).author(signature);
    for parent in &args.parents {
        builder = builder.parent(parse_id(parent)?);
    }

    let mut message = args.message;
    if !message.ends_with('\n') {
        message.push('\n');
    }
    let commit = builder.build(message)?;
    let id = store.write_typed(&commit)?;
    println!("{id}");
    Ok(())
}

/// The tree named by `id`, following a commit to its root tree.
fn resolve_tree<S: ObjectStore>(store: &S, id: ObjectId) -> anyhow::Result<Tree> {
    match store.read_object(&id)? {
        Object::Tree(tree) => Ok(tree),
        Object::Commit(commit) => Ok(store.read_tree(&commit.tree()?)?),
        Object::Blob(_) => bail!("{id} is a blob, expected a commit or tree"),
    }
}

fn ls_tree_lines(tree: &Tree) -> Vec<String> {
    tree.iter()
        .map(|entry| {
            let kind = match entry.mode.bits() & 0o170000 {
                0o040000 => "tree",
                0o160000 => "commit",
                _ => ObjectKind::Blob.as_str(),
            };
            format!("{:0>6} {kind} {}\t{}", entry.mode.to_string(), entry.id, entry.name_lossy())
        })
        .collect()
}

fn log_graph<S: ObjectStore>(store: &S, start: ObjectId) -> anyhow::Result<String> {
    let mut visited = HashSet::new();
    let edges = walk(store, start, &mut visited)?;

    let order = visit_order(start, &edges);
    let mut nodes = Vec::with_capacity(order.len());
    for id in order {
        let commit = store.read_commit(&id)?;
        nodes.push(LogNode {
            id,
            summary: summary_line(commit.message()),
        });
    }
    Ok(render_dot(&nodes, &edges))
}
