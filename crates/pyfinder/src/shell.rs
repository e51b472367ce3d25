use std::ffi::OsStr;

use sysinfo::{Pid, System};

/// Process names that count as shells.
const SHELL_NAMES: [&str; 11] = [
    "bash", "cmd", "csh", "dash", "fish", "ksh", "powershell", "pwsh", "sh", "tcsh", "zsh",
];

/// Process names that count as terminal emulators wrapping a shell.
const EMULATOR_NAMES: [&str; 1] = ["cmder"];

/// How many ancestors are examined before giving up.
const MAX_DEPTH: usize = 6;

/// The shell and terminal emulator found among a process's ancestors.
///
/// Either field can be absent: a process started from a service manager has
/// no shell above it, and emulators only exist on some setups.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ShellAncestry {
    /// The reported process name of the nearest ancestor that is a known
    /// shell, in its original spelling.
    pub shell: Option<String>,
    /// The reported process name of the nearest ancestor that is a known
    /// terminal emulator.
    pub emulator: Option<String>,
}

/// Detects the shell the current process is running under.
///
/// Walks up the process tree from the current process, comparing each
/// ancestor's name against the known shell and emulator names. The walk is
/// bounded and stops early once both a shell and an emulator were seen.
pub fn detect_shell() -> ShellAncestry {
    detect_shell_of(std::process::id())
}

/// Detects the shell an arbitrary process is running under.
///
/// An unknown process id yields an empty [`ShellAncestry`].
pub fn detect_shell_of(pid: u32) -> ShellAncestry {
    let mut system = System::new_all();
    system.refresh_processes(sysinfo::ProcessesToUpdate::All, false);

    let mut ancestry = ShellAncestry::default();
    let mut pid = Pid::from_u32(pid);
    for _ in 0..MAX_DEPTH {
        let Some(process) = system.process(pid) else {
            break;
        };
        let name = normalized_name(process.name());
        if ancestry.shell.is_none() && SHELL_NAMES.contains(&name.as_str()) {
            ancestry.shell = Some(process.name().to_string_lossy().into_owned());
        }
        if ancestry.emulator.is_none() && EMULATOR_NAMES.contains(&name.as_str()) {
            ancestry.emulator = Some(process.name().to_string_lossy().into_owned());
        }
        if ancestry.shell.is_some() && ancestry.emulator.is_some() {
            break;
        }
        match process.parent() {
            Some(parent) => pid = parent,
            None => break,
        }
    }
    ancestry
}

/// Lowercases a process name and strips its last extension, so `Cmd.EXE`
/// compares equal to `cmd`.
fn normalized_name(name: &OsStr) -> String {
    let name = name.to_string_lossy().to_lowercase();
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
        _ => name,
    }
}
