//! cairn CLI - Command line interface for the cairn object store

use anyhow::Context;
use cairn::{Encode, Object, ObjectId, Repository};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cairn")]
#[command(about = "A write-once, content-addressed object store")]
#[command(version)]
struct Cli {
    /// Path to the workspace containing .cairn
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// Output format (json or text)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository
    Init,

    /// Compute the id of a file as a blob
    HashObject {
        /// File to hash
        file: PathBuf,
        /// Also store the blob
        #[arg(short, long)]
        write: bool,
    },

    /// Store the workspace as trees and print the root tree id
    WriteTree,

    /// Snapshot the workspace and record a commit
    Commit {
        /// Commit message (read from stdin when omitted)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Print a stored object
    CatFile {
        /// Object id
        id: String,
    },

    /// Print the current HEAD commit
    Head,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("CAIRN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let repo = Repository::init(&cli.repo)?;
            let path = repo.meta_dir().display().to_string();
            match cli.format {
                OutputFormat::Json => output_json(&serde_json::json!({
                    "status": "ok",
                    "path": path
                }))?,
                OutputFormat::Text => println!("Initialized empty cairn repository in {}", path),
            }
        }

        Commands::HashObject { file, write } => {
            let repo = open_repo(&cli.repo)?;
            let id = repo.hash_object(&file, write)?;
            match cli.format {
                OutputFormat::Json => output_json(&serde_json::json!({
                    "id": id.to_hex(),
                    "written": write
                }))?,
                OutputFormat::Text => println!("{}", id),
            }
        }

        Commands::WriteTree => {
            let repo = open_repo(&cli.repo)?;
            let id = repo.write_tree()?;
            match cli.format {
                OutputFormat::Json => output_json(&serde_json::json!({ "tree": id.to_hex() }))?,
                OutputFormat::Text => println!("{}", id),
            }
        }

        Commands::Commit { message } => {
            let repo = open_repo(&cli.repo)?;
            let message = match message {
                Some(m) => m,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read commit message from stdin")?;
                    buf
                }
            };
            if message.trim().is_empty() {
                anyhow::bail!("Aborting commit due to empty commit message");
            }

            let summary = repo.commit(&message)?;
            match cli.format {
                OutputFormat::Json => output_json(&serde_json::json!({
                    "status": "ok",
                    "id": summary.id.to_hex(),
                    "tree": summary.tree.to_hex(),
                    "root": summary.root,
                    "author": summary.commit.author,
                    "timestamp": summary.commit.timestamp,
                    "title": summary.commit.title()
                }))?,
                OutputFormat::Text => {
                    let prefix = if summary.root { "(root-commit) " } else { "" };
                    println!("[{}{}] {}", prefix, summary.id, summary.commit.title());
                }
            }
        }

        Commands::CatFile { id } => {
            let repo = open_repo(&cli.repo)?;
            let id: ObjectId = id.parse()?;
            let object = repo.cat_object(&id)?;
            match cli.format {
                OutputFormat::Json => output_json(&object_json(&id, &object)?)?,
                OutputFormat::Text => print_object(&object)?,
            }
        }

        Commands::Head => {
            let repo = open_repo(&cli.repo)?;
            let head = repo.head()?;
            match cli.format {
                OutputFormat::Json => output_json(&serde_json::json!({
                    "head": head.map(|id| id.to_hex())
                }))?,
                OutputFormat::Text => match head {
                    Some(id) => println!("{}", id),
                    None => println!("(no commits)"),
                },
            }
        }
    }

    Ok(())
}

fn open_repo(path: &Path) -> anyhow::Result<Repository> {
    Repository::open(path)
        .with_context(|| format!("Not a cairn repository: {}", path.display()))
}

fn output_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn object_json(id: &ObjectId, object: &Object) -> anyhow::Result<serde_json::Value> {
    let mut value = match object {
        Object::Blob(blob) => serde_json::json!({
            "size": blob.len(),
            "content": String::from_utf8_lossy(blob.data())
        }),
        Object::Tree(tree) => serde_json::json!({
            "entries": tree.entries().collect::<Vec<_>>()
        }),
        Object::Commit(commit) => serde_json::json!({
            "tree": commit.tree.to_hex(),
            "author": commit.author,
            "timestamp": commit.timestamp,
            "message": commit.message
        }),
    };
    value["id"] = serde_json::json!(id.to_hex());
    value["type"] = serde_json::json!(object.kind().as_str());
    Ok(value)
}

fn print_object(object: &Object) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match object {
        Object::Blob(blob) => out.write_all(blob.data())?,
        Object::Tree(tree) => {
            for entry in tree.entries() {
                let kind = if entry.mode.is_tree() { "tree" } else { "blob" };
                writeln!(out, "{:0>6} {} {}\t{}", entry.mode, kind, entry.id, entry.name)?;
            }
        }
        Object::Commit(_) => out.write_all(&object.encode_payload()?)?,
    }
    out.flush()?;
    Ok(())
}
