use std::path::PathBuf;

use pyfinder_types::{Architecture, Candidate, DiscoveryOrigin, PythonVersion};
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
use winreg::RegKey;

/// Reads interpreter registrations from the Windows registry.
///
/// The per-user hive and the machine hive are both scanned, the latter in
/// its 64-bit and its 32-bit view. Registrations follow the `Company\Tag`
/// layout: every tag contributes one candidate carrying the version and
/// architecture its values declare and an executable of `python.exe` below
/// the recorded install path. The launcher's reserved company key is not an
/// interpreter and is skipped.
pub fn scan_windows_registry() -> Vec<Candidate> {
    let roots = [
        (RegKey::predef(HKEY_CURRENT_USER), r"Software\Python"),
        (RegKey::predef(HKEY_LOCAL_MACHINE), r"Software\Python"),
        (
            RegKey::predef(HKEY_LOCAL_MACHINE),
            r"Software\WOW6432Node\Python",
        ),
    ];

    let mut candidates = Vec::new();
    for (hive, path) in roots {
        let python_key = match hive.open_subkey(path) {
            Ok(key) => key,
            Err(err) => {
                tracing::debug!("no registry key {}: {}", path, err);
                continue;
            }
        };
        for company in python_key.enum_keys().filter_map(Result::ok) {
            if company == "PyLauncher" {
                continue;
            }
            let Ok(company_key) = python_key.open_subkey(&company) else {
                continue;
            };
            for tag in company_key.enum_keys().filter_map(Result::ok) {
                let Ok(tag_key) = company_key.open_subkey(&tag) else {
                    continue;
                };
                if let Some(candidate) = read_registration(&tag_key, &tag) {
                    candidates.push(candidate);
                }
            }
        }
    }
    candidates
}

/// Turns one `Company\Tag` key into a candidate. Registrations without an
/// install path or without any parseable version information are dropped.
fn read_registration(tag_key: &RegKey, tag: &str) -> Option<Candidate> {
    let install_path: String = tag_key
        .open_subkey("InstallPath")
        .and_then(|key| key.get_value(""))
        .ok()?;
    let reported = tag_key
        .get_value::<String, _>("Version")
        .or_else(|_| tag_key.get_value("SysVersion"))
        .unwrap_or_else(|_| tag.to_owned());
    let architecture = tag_key
        .get_value::<String, _>("SysArchitecture")
        .ok()
        .and_then(|arch| arch.parse().ok())
        .unwrap_or(Architecture::native());
    let version = match PythonVersion::parse(&reported) {
        Ok(version) => version,
        Err(err) => {
            tracing::debug!("ignoring registration {}: {}", tag, err);
            return None;
        }
    };
    Some(Candidate {
        executable: PathBuf::from(install_path).join("python.exe"),
        reported,
        version,
        architecture,
        origin: DiscoveryOrigin::WindowsRegistry,
    })
}
