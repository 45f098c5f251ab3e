use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use fragments::{Conversion, Fragment, FragmentRequest, FragmentStore, NewFragment};
use tokio::io::AsyncReadExt;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "fragments", version, about = "Store and render owner-scoped fragments")]
pub struct Cli {
    /// Owner whose fragments are addressed.
    #[arg(long, env = "FRAGMENTS_OWNER")]
    pub owner: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a fragment from FILE (or stdin) and print its metadata.
    Create {
        /// Content type, e.g. "text/markdown" or "text/plain; charset=utf-8".
        #[arg(long = "type")]
        content_type: String,
        file: Option<PathBuf>,
    },
    /// Print a fragment's data; `ID.EXT` converts it to the extension's type.
    Get { id: String },
    /// Print a fragment's metadata.
    Info { id: String },
    /// List the owner's fragment ids, or full metadata with --expand.
    List {
        #[arg(long)]
        expand: bool,
    },
    /// Replace a fragment's data. The type must match the fragment's own.
    Update {
        id: String,
        #[arg(long = "type")]
        content_type: String,
        file: Option<PathBuf>,
    },
    /// Delete a fragment's metadata and data.
    Delete { id: String },
    /// Check that stored data matches the recorded size.
    Verify { id: String },
}

async fn read_input(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json(out: &mut dyn Write, value: &impl serde::Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub async fn run(cli: Cli, store: &dyn FragmentStore, out: &mut dyn Write) -> anyhow::Result<()> {
    let owner = cli.owner.as_str();
    match cli.command {
        Command::Create { content_type, file } => {
            let data = read_input(file.as_deref()).await?;
            let mut fragment = Fragment::new(NewFragment::new(owner, content_type))?;
            fragment.set_data(store, &data).await?;
            info!(id = %fragment.id(), size = fragment.size(), "Fragment created");
            print_json(out, &fragment)
        }
        Command::Get { id } => {
            let request = FragmentRequest::parse(&id)?;
            let fragment = Fragment::by_id(store, owner, &request.id).await?;
            match fragment
                .render(store, request.desired_type.as_deref())
                .await?
            {
                Conversion::Converted(data) => {
                    out.write_all(&data)?;
                    Ok(())
                }
                Conversion::Unsupported => bail!(
                    "A {} fragment cannot be converted to {}",
                    fragment.mime_type(),
                    request.response_type(&fragment)
                ),
            }
        }
        Command::Info { id } => {
            let fragment = Fragment::by_id(store, owner, &id).await?;
            print_json(out, &fragment)
        }
        Command::List { expand } => {
            let listing = Fragment::by_user(store, owner, expand).await?;
            print_json(out, &listing)
        }
        Command::Update {
            id,
            content_type,
            file,
        } => {
            let data = read_input(file.as_deref()).await?;
            let mut fragment = Fragment::by_id(store, owner, &id).await?;
            fragment.update_data(store, &content_type, &data).await?;
            info!(id = %fragment.id(), size = fragment.size(), "Fragment updated");
            print_json(out, &fragment)
        }
        Command::Delete { id } => {
            Fragment::delete(store, owner, &id).await?;
            info!(%id, "Fragment deleted");
            Ok(())
        }
        Command::Verify { id } => {
            let fragment = Fragment::by_id(store, owner, &id).await?;
            fragment.verify(store).await?;
            writeln!(out, "ok")?;
            Ok(())
        }
    }
}
