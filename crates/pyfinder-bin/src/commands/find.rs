use pyfinder::Architecture;

use super::FinderArgs;

#[derive(Debug, clap::Parser)]
pub struct Opt {
    #[clap(flatten)]
    finder: FinderArgs,

    /// The version to find, e.g. `3`, `3.6` or `3.6.9`
    version: String,

    /// Only accept interpreters built for this architecture
    #[clap(long)]
    architecture: Option<Architecture>,
}

pub fn find(opt: Opt) -> anyhow::Result<()> {
    let finder = opt.finder.finder()?;
    match finder.find_version(&opt.version, opt.architecture) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => anyhow::bail!(
            "no interpreter found for version {}",
            console::style(&opt.version).yellow()
        ),
    }
}
