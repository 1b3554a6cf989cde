pub mod add;
pub mod commit;
pub mod diff;
pub mod grep;
pub mod history;
pub mod init;
pub mod refs;
pub mod rename;
pub mod resolve;
pub mod status;

pub use add::*;
pub use commit::*;
pub use diff::*;
pub use grep::*;
pub use history::*;
pub use init::*;
pub use refs::*;
pub use rename::*;
pub use resolve::*;
pub use status::*;

use crate::core::{config::ClientConfig, error::Result, repository::Repository};
use std::env;
use std::path::{Path, PathBuf};

/// Open the repository containing the current directory
pub(crate) fn open_current() -> Result<Repository> {
    let config = ClientConfig::load()?;
    Repository::open(env::current_dir()?, false, config)
}

/// Resolve command-line paths against the current directory, since the
/// repository resolves relative paths against its root
pub(crate) fn from_current_dir(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let current = env::current_dir()?;
    Ok(paths.iter().map(|path| absolute(&current, path)).collect())
}

fn absolute(current: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        current.join(path)
    }
}
