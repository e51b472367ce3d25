use super::FinderArgs;

#[derive(Debug, clap::Parser)]
pub struct Opt {
    #[clap(flatten)]
    finder: FinderArgs,

    /// The request line, e.g. `python3`, `py -3.6` or an absolute path
    line: String,
}

pub fn resolve(opt: Opt) -> anyhow::Result<()> {
    let finder = opt.finder.finder()?;
    match finder.resolve_line(&opt.line) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => anyhow::bail!(
            "could not resolve {} to an interpreter",
            console::style(&opt.line).yellow()
        ),
    }
}
