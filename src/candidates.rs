use std::collections::BTreeSet;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use log::{debug, info};

/// Commands the shell interprets itself.
pub const BUILTINS: [&str; 2] = ["cd", "exit"];

/// Every name the hint engine may suggest. Built once at startup and only
/// read afterwards.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    names: BTreeSet<String>,
}

impl CandidateSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Built-ins plus every executable file found in the directories of
    /// `search_path`. A directory that can't be read is skipped.
    pub fn discover(search_path: Option<&OsStr>) -> Self {
        let mut names: BTreeSet<String> = BUILTINS.iter().map(|b| b.to_string()).collect();

        if let Some(search_path) = search_path {
            for dir in env::split_paths(search_path) {
                scan_dir(&dir, &mut names);
            }
        }

        info!("discovered {} command candidates", names.len());
        Self { names }
    }

    /// Same as [`CandidateSet::discover`] over the process `PATH`.
    pub fn from_env() -> Self {
        let path = env::var_os("PATH");
        Self::discover(path.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

fn scan_dir(dir: &Path, names: &mut BTreeSet<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("skipping {}: {}", dir.display(), err);
            return;
        }
    };

    for entry in entries.flatten() {
        let Ok(metadata) = fs::metadata(entry.path()) else {
            continue;
        };
        if !metadata.is_file() || !is_executable(&metadata) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.insert(name.to_string());
        }
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs::File;

    #[cfg(unix)]
    fn touch(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn builtins_always_present() {
        let set = CandidateSet::discover(None);
        assert!(set.contains("cd"));
        assert!(set.contains("exit"));
        assert_eq!(set.iter().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn picks_up_executables_only() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(first.path(), "runme", 0o755);
        touch(first.path(), "notes.txt", 0o644);
        touch(second.path(), "runme", 0o700);
        touch(second.path(), "other", 0o711);
        fs::create_dir(second.path().join("subdir")).unwrap();

        let path = env::join_paths([first.path(), second.path()]).unwrap();
        let set = CandidateSet::discover(Some(path.as_os_str()));

        assert!(set.contains("runme"));
        assert!(set.contains("other"));
        assert!(!set.contains("notes.txt"));
        assert!(!set.contains("subdir"));
        assert_eq!(set.iter().count(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut path = OsString::from("/definitely/not/a/dir");
        path.push(":");
        path.push(dir.path());
        let set = CandidateSet::discover(Some(path.as_os_str()));
        assert!(set.contains("cd"));
    }
}
