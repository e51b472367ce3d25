use std::{
    io::Read,
    path::Path,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

/// The argument passed to a candidate interpreter to make it print its
/// version as a single line on stdout.
const VERSION_SCRIPT: &str = "import sys; print(sys.version.split()[0])";

/// Asks a candidate executable for its version string.
///
/// Enumeration is generic over this trait so discovery can be exercised in
/// tests without spawning real interpreters.
pub trait VersionProbe {
    /// Returns the version string the executable reports, or `None` when the
    /// process cannot be started, prints nothing usable, or takes too long.
    fn probe(&self, executable: &Path) -> Option<String>;
}

/// A [`VersionProbe`] that runs the candidate with a short version-printing
/// script and a bounded timeout.
///
/// The subprocess is polled rather than waited on so a hanging candidate can
/// be killed once the timeout elapses. A timeout marks the candidate as
/// unusable; it never fails the surrounding scan.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    timeout: Duration,
}

impl CommandProbe {
    /// Creates a probe with the given per-candidate timeout.
    pub fn new(timeout: Duration) -> CommandProbe {
        CommandProbe { timeout }
    }
}

impl Default for CommandProbe {
    fn default() -> Self {
        CommandProbe::new(Duration::from_secs(5))
    }
}

impl VersionProbe for CommandProbe {
    fn probe(&self, executable: &Path) -> Option<String> {
        let mut child = match Command::new(executable)
            .args(["-c", VERSION_SCRIPT])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::debug!("could not spawn {}: {}", executable.display(), err);
                return None;
            }
        };

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    tracing::debug!(
                        "version probe of {} timed out after {:?}",
                        executable.display(),
                        self.timeout
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(err) => {
                    tracing::debug!(
                        "version probe of {} failed: {}",
                        executable.display(),
                        err
                    );
                    let _ = child.kill();
                    return None;
                }
            }
        };

        if !status.success() {
            tracing::debug!(
                "version probe of {} exited with {}",
                executable.display(),
                status
            );
            return None;
        }

        let mut output = String::new();
        if child.stdout.take()?.read_to_string(&mut output).is_err() {
            return None;
        }
        let version = output.trim();
        if version.is_empty() {
            None
        } else {
            Some(version.to_owned())
        }
    }
}
