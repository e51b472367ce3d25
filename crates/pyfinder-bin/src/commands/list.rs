use super::FinderArgs;

#[derive(Debug, clap::Parser)]
pub struct Opt {
    #[clap(flatten)]
    finder: FinderArgs,

    /// Emit the discovered interpreters as JSON
    #[clap(long)]
    json: bool,
}

pub fn list(opt: Opt) -> anyhow::Result<()> {
    let finder = opt.finder.finder()?;
    let candidates = finder.candidates();

    if opt.json {
        println!("{}", serde_json::to_string_pretty(candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("no interpreters found");
        return Ok(());
    }
    for candidate in candidates {
        println!(
            "{} {:<6} {:<8} {}",
            console::style(format!("{:<12}", candidate.reported)).green(),
            candidate.architecture,
            candidate.origin,
            candidate.executable.display()
        );
    }
    Ok(())
}
