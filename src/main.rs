use clap::{Parser, Subcommand};
use hg_scc::commands::*;
use hg_scc::core::{
    error::{HgSccError, Result},
    print_error,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hgscc")]
#[command(about = "Mercurial repository status client")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show file statuses, for the whole tree or the given files
    Status {
        paths: Vec<PathBuf>,
    },
    /// Schedule files for addition
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Schedule files for removal
    Remove {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Restore files to their committed state
    Revert {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Record a rename
    Rename {
        from: PathBuf,
        to: PathBuf,
        /// The file was already moved on disk
        #[arg(short = 'A', long)]
        after: bool,
    },
    /// Commit the given files, or all pending changes
    Commit {
        #[arg(short, long)]
        message: String,
        paths: Vec<PathBuf>,
    },
    /// Show history of the repository or of one file
    Log {
        path: Option<PathBuf>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Compare a file between revisions or against the working copy
    Diff {
        path: PathBuf,
        /// Base revision (default: working directory parent)
        #[arg(short, long)]
        rev: Option<String>,
        /// Revision to compare against (default: working copy)
        #[arg(long)]
        to: Option<String>,
        /// Open the configured diff tool when the file differs
        #[arg(long)]
        tool: bool,
    },
    /// Search tracked files
    Grep {
        pattern: String,
        paths: Vec<PathBuf>,
    },
    /// List merge state, or mark files resolved
    Resolve {
        /// Files to mark resolved
        #[arg(short, long = "mark")]
        mark: Vec<PathBuf>,
    },
    /// List tags
    Tags,
    /// List named branches
    Branches,
    /// List bookmarks
    Bookmarks,
    /// List tracked files
    Files,
    /// Create a repository unless one already exists
    Init {
        path: Option<PathBuf>,
    },
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        match e {
            HgSccError::NoRepository { .. } => print_error("Not in a Mercurial repository"),
            e => print_error(&e.to_string()),
        }
        std::process::exit(1);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let json = cli.json;
    let result = match cli.command {
        Commands::Status { paths } => execute_status(paths, json),
        Commands::Add { paths } => execute_add(paths),
        Commands::Remove { paths } => execute_remove(paths),
        Commands::Revert { paths } => execute_revert(paths),
        Commands::Rename { from, to, after } => execute_rename(from, to, after),
        Commands::Commit { message, paths } => execute_commit(message, paths),
        Commands::Log { path, limit } => execute_log(path, limit, json),
        Commands::Diff {
            path,
            rev,
            to,
            tool,
        } => execute_diff(path, rev, to, tool, json),
        Commands::Grep { pattern, paths } => execute_grep(pattern, paths, json),
        Commands::Resolve { mark } => execute_resolve(mark, json),
        Commands::Tags => execute_tags(json),
        Commands::Branches => execute_branches(json),
        Commands::Bookmarks => execute_bookmarks(json),
        Commands::Files => execute_files(json),
        Commands::Init { path } => execute_init(path),
    };
    report(result);

    Ok(())
}
