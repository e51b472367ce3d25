pub mod find;
pub mod list;
pub mod resolve;
pub mod shell;
pub mod which;

use std::{ffi::OsString, path::PathBuf};

use pyfinder::{FinderOptions, PathPlacement, PythonFinder};

/// Options shared by every command that performs interpreter discovery.
#[derive(Debug, clap::Args)]
pub struct FinderArgs {
    /// Search this PATH-style list of directories instead of the PATH
    /// environment variable
    #[clap(long)]
    path: Option<OsString>,

    /// An extra directory to join into the search order
    #[clap(long)]
    extra_dir: Option<PathBuf>,

    /// Append the extra directory instead of prepending it, and search the
    /// directory of this executable first
    #[clap(long)]
    append: bool,

    /// A virtual environment root whose interpreter wins over everything
    /// else
    #[clap(long)]
    venv: Option<PathBuf>,

    /// The version manager root to scan for installed interpreters
    #[clap(long)]
    pyenv_root: Option<PathBuf>,
}

impl FinderArgs {
    pub fn finder(&self) -> anyhow::Result<PythonFinder> {
        let options = FinderOptions {
            path: self.path.clone(),
            extra_dir: self.extra_dir.clone(),
            placement: if self.append {
                PathPlacement::Append
            } else {
                PathPlacement::Prepend
            },
            venv: self.venv.clone(),
            pyenv_root: self.pyenv_root.clone(),
        };
        Ok(PythonFinder::new(options)?)
    }
}
