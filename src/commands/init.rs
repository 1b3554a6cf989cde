use crate::core::{config::ClientConfig, error::Result, print_success, repository::Repository};
use std::env;
use std::path::PathBuf;

/// Open the repository at `path`, creating it when there is none
pub fn execute_init(path: Option<PathBuf>) -> Result<()> {
    let current = env::current_dir()?;
    let target = match path {
        Some(path) if path.is_absolute() => path,
        Some(path) => current.join(path),
        None => current,
    };

    let config = ClientConfig::load()?;
    let repository = Repository::open(&target, true, config)?;
    print_success(&format!(
        "Repository ready at {}",
        repository.root().display()
    ));
    Ok(())
}
