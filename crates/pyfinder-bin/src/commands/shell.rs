#[derive(Debug, clap::Parser)]
pub struct Opt {
    /// Inspect this process id instead of the current process
    #[clap(long)]
    pid: Option<u32>,
}

pub fn shell(opt: Opt) -> anyhow::Result<()> {
    let ancestry = match opt.pid {
        Some(pid) => pyfinder::detect_shell_of(pid),
        None => pyfinder::detect_shell(),
    };
    match &ancestry.shell {
        Some(shell) => println!("shell: {}", console::style(shell).green()),
        None => println!("shell: {}", console::style("not detected").dim()),
    }
    if let Some(emulator) = &ancestry.emulator {
        println!("emulator: {}", console::style(emulator).green());
    }
    Ok(())
}
