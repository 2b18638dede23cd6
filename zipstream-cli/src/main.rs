//! zipstream CLI
//!
//! Streams files into uncompressed ZIP archives whose exact size is known
//! before the first byte is written.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{StreamArgs, cmd_bundle, cmd_create, cmd_list, cmd_size, cmd_test};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "zipstream")]
#[command(author, version, about = "Streaming ZIP assembler with exact size prediction")]
#[command(long_about = "
zipstream writes stored (uncompressed) ZIP archives as a stream. The archive
size is computed from file names and sizes alone, so it can be announced
(e.g. as Content-Length) before any data is read.

Examples:
  zipstream create out.zip report.pdf photo.jpg
  zipstream create - *.log > logs.zip
  zipstream bundle --manifest files.json --source data.bin out.zip
  zipstream size files.json
  zipstream size --files report.pdf photo.jpg
  zipstream list out.zip
  zipstream test out.zip

Set RUST_LOG to override the log filter.
")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream files from disk into an archive
    #[command(alias = "c")]
    Create {
        /// Output archive file, or - for stdout
        archive: PathBuf,

        /// Files to add, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Build an archive from a manifest and one concatenated data source
    #[command(alias = "b")]
    Bundle {
        /// JSON manifest: {"files":[{"name":"a.txt","size":5}]}
        #[arg(short, long)]
        manifest: PathBuf,

        /// Concatenated file contents, or - for stdin
        #[arg(short, long)]
        source: PathBuf,

        /// Output archive file, or - for stdout
        archive: PathBuf,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Print the exact archive size for a manifest or a set of files
    Size {
        /// JSON manifest
        #[arg(conflicts_with = "files", required_unless_present = "files")]
        manifest: Option<PathBuf>,

        /// Files on disk to size instead of a manifest
        #[arg(short, long, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only entries matching pattern (glob syntax: *.txt)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Verify every entry's checksum and data descriptor
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Create {
            archive,
            files,
            stream,
        } => cmd_create(&archive, &files, &stream).await,
        Commands::Bundle {
            manifest,
            source,
            archive,
            stream,
        } => cmd_bundle(&manifest, &source, &archive, &stream).await,
        Commands::Size {
            manifest,
            files,
            json,
        } => cmd_size(manifest.as_deref(), &files, json),
        Commands::List {
            archive,
            json,
            include,
            exclude,
        } => cmd_list(&archive, json, &include, &exclude, cli.verbose),
        Commands::Test { archive } => cmd_test(&archive, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
