#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use commands::resolve::ResolveAction;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nobundle")]
#[command(
    author,
    version,
    about = "Inspect how the nobundle dev server resolves modules",
    long_about = None
)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Config file, relative to the project root unless absolute
    #[arg(long, global = true, value_name = "FILE", env = "NOBUNDLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Map a request path to the file it serves
    Resolve {
        /// Request path, e.g. `/src/main` or `/@modules/vue`
        public_path: String,
    },

    /// Map a file to the request path a browser should use
    Request {
        /// File path, relative to the project root unless absolute
        file: PathBuf,
    },

    /// Canonicalize a request path
    Normalize {
        /// Request path, query and fragment are preserved
        public_path: String,
    },

    /// Resolve an import specifier relative to its importer
    Relative {
        /// Request path of the importing module
        importer: String,
        /// Import specifier, e.g. `../utils?raw`
        importee: String,
    },

    /// Check whether a request path is served from the public directory
    Public {
        /// Request path
        public_path: String,
    },

    /// Rewrite a bare import into the id served under `/@modules/`
    Bare {
        /// Request path of the importing module
        importer: String,
        /// Bare module id, e.g. `lodash/fp`
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let action = match cli.command {
        Some(Commands::Version) | None => return commands::version::run(cli.json),
        Some(Commands::Resolve { public_path }) => ResolveAction::RequestToFile { public_path },
        Some(Commands::Request { file }) => ResolveAction::FileToRequest { file },
        Some(Commands::Normalize { public_path }) => ResolveAction::Normalize { public_path },
        Some(Commands::Relative { importer, importee }) => {
            ResolveAction::Relative { importer, importee }
        }
        Some(Commands::Public { public_path }) => ResolveAction::Public { public_path },
        Some(Commands::Bare { importer, id }) => ResolveAction::Bare { importer, id },
    };

    logging::init(cli.verbose, cli.json);
    let span = tracing::info_span!("resolve", cmd = action.name(), cwd = %cwd.display());
    let _guard = span.enter();

    commands::resolve::run(&cwd, cli.config.as_deref(), action, cli.json)
}
