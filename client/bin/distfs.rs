//! `distfs` — a command-line wrapper over [`distfs_client::Client`],
//! supplementing the spec's "thin client library" with the interactive
//! entry point `original_source`'s `dfs.py` scripts provided.

use clap::{Parser, Subcommand};
use distfs_client::Client;

#[derive(Debug, Parser)]
#[command(name = "distfs", about = "distfs control-plane client")]
struct Cli {
	/// Router address to send requests to.
	#[arg(long, default_value = "127.0.0.1:8000")]
	router: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Read a file and print its bytes to stdout.
	Get { path: String },
	/// Write stdin (or --data) to a path.
	Put {
		path: String,
		#[arg(long)]
		data: Option<String>,
	},
	/// Delete a path.
	Rm { path: String },
	/// Copy src to dst.
	Cp { src: String, dst: String },
	/// Rename old to new.
	Mv { old: String, new: String },
	/// Check whether a path exists.
	Exists { path: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
		.init();

	let cli = Cli::parse();
	let client = Client::new(cli.router);

	match cli.command {
		Command::Get { path } => {
			let bytes = client.read(&path).await?;
			use std::io::Write;
			std::io::stdout().write_all(&bytes)?;
		}
		Command::Put { path, data } => {
			let bytes = match data {
				Some(text) => text.into_bytes(),
				None => {
					use std::io::Read;
					let mut buf = Vec::new();
					std::io::stdin().read_to_end(&mut buf)?;
					buf
				}
			};
			client.write(&path, &bytes).await?;
		}
		Command::Rm { path } => client.delete(&path).await?,
		Command::Cp { src, dst } => client.copy(&src, &dst).await?,
		Command::Mv { old, new } => client.rename(&old, &new).await?,
		Command::Exists { path } => {
			let exists = client.exists(&path).await?;
			println!("{exists}");
		}
	}

	Ok(())
}
