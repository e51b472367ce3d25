use super::FinderArgs;

#[derive(Debug, clap::Parser)]
pub struct Opt {
    #[clap(flatten)]
    finder: FinderArgs,

    /// The executable name to locate
    name: String,
}

pub fn which(opt: Opt) -> anyhow::Result<()> {
    let finder = opt.finder.finder()?;
    match finder.which(&opt.name) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => anyhow::bail!(
            "{} is not on the search order",
            console::style(&opt.name).yellow()
        ),
    }
}
