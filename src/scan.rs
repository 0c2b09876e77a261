use crate::error::{Error, Result};
use std::{
    collections::BTreeSet,
    fs, io,
    path::{self, Component, Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Directory name fragments whose contents are never scanned. A directory is skipped when its
/// full path contains any of these as a substring, so `my_venv_backup` is skipped as well.
pub const IGNORED_DIR_FRAGMENTS: [&str; 3] = ["node_modules", "venv", "__pycache__"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Collect files from nested directories, not just from the roots themselves.
    pub recursive: bool,
    /// Collect files whose name starts with a dot.
    pub include_hidden: bool,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |name| name.to_string_lossy().starts_with('.'))
}

fn is_ignored_dir(dir: &Path) -> bool {
    let dir = dir.to_string_lossy();
    IGNORED_DIR_FRAGMENTS
        .iter()
        .any(|fragment| dir.contains(fragment))
}

impl ScanOptions {
    /// Filter applied to every entry of the walk.
    ///
    /// Directories are kept unless their path hits the ignore list. Files are kept unless they are
    /// hidden (and hidden files are excluded) or the directory containing them hits the ignore
    /// list. Hidden directories are not pruned; only file names are tested for the dot prefix.
    pub fn should_include(&self, path: &Path, is_dir: bool) -> bool {
        if is_dir {
            return !is_ignored_dir(path);
        }
        if !self.include_hidden && is_hidden(path) {
            return false;
        }
        path.parent().map_or(true, |parent| !is_ignored_dir(parent))
    }
}

/// `dir` made absolute against the working directory, with `.` and `..` removed lexically.
/// Symlinks are left in place so the ignore list sees the path the user typed.
fn lexical_absolute(dir: &Path) -> io::Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path::absolute(dir)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Make each of `dirs` absolute, so overlapping roots given in different spellings yield the same
/// file paths.
///
/// # Returns
///
/// Absolute roots in the order given, or an error for the first one that does not exist or is not
/// a directory.
pub fn resolve_roots<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<PathBuf>> {
    dirs.iter()
        .map(|dir| -> Result<PathBuf> {
            let dir = dir.as_ref();
            let root_error = |source: io::Error| match source.kind() {
                io::ErrorKind::NotFound => Error::RootNotFound(dir.to_path_buf()),
                _ => Error::Root {
                    path: dir.to_path_buf(),
                    source,
                },
            };

            let root = lexical_absolute(dir).map_err(root_error)?;
            if !fs::metadata(&root).map_err(root_error)?.is_dir() {
                return Err(Error::NotADirectory(dir.to_path_buf()));
            }
            Ok(root)
        })
        .collect()
}

/// Whether `entry` is hashed at all. Regular files and links to them are; directories, links to
/// directories, FIFOs, sockets and devices are not. A broken link is kept so the failure to read it
/// shows up in the report.
fn is_collectable(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        return fs::metadata(entry.path()).map_or(true, |meta| meta.is_file());
    }
    file_type.is_file()
}

/// # Returns
///
/// Every file under `roots` that passes `options`, deduplicated and in lexicographic order.
/// Directories that cannot be read are logged and skipped.
pub fn scan<P: AsRef<Path>>(roots: &[P], options: &ScanOptions) -> BTreeSet<PathBuf> {
    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut files = BTreeSet::new();

    for root in roots {
        let root = root.as_ref();
        log::debug!("scanning {}", root.display());

        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir() || options.should_include(entry.path(), true)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).display().to_string();
                    log::warn!("skipping {}: {}", path, err);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }
            if !is_collectable(&entry) {
                log::debug!("skipping non-regular file {}", entry.path().display());
                continue;
            }
            if !options.should_include(entry.path(), false) {
                continue;
            }
            log::trace!("found {}", entry.path().display());
            files.insert(entry.into_path());
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir_all, write};
    use tempfile::{tempdir, TempDir};

    // Lay out `files` under a fresh temporary directory, creating parents as needed.
    fn tree(files: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            create_dir_all(path.parent().unwrap()).unwrap();
            write(path, content).unwrap();
        }
        dir
    }

    fn scan_root(root: &Path, recursive: bool, include_hidden: bool) -> Vec<PathBuf> {
        let roots = resolve_roots(&[root]).unwrap();
        let options = ScanOptions {
            recursive,
            include_hidden,
        };
        scan(&roots, &options).into_iter().collect()
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn should_include_hidden_files_only_when_asked() {
        let default = ScanOptions::default();
        let hidden = ScanOptions {
            include_hidden: true,
            ..ScanOptions::default()
        };

        assert!(!default.should_include(Path::new("/a/.env"), false));
        assert!(hidden.should_include(Path::new("/a/.env"), false));
        assert!(default.should_include(Path::new("/a/env"), false));
        // hidden directories are walked; only file names are tested
        assert!(default.should_include(Path::new("/a/.git"), true));
        assert!(default.should_include(Path::new("/a/.git/config"), false));
    }

    #[test]
    fn should_include_rejects_ignored_fragments_anywhere() {
        let options = ScanOptions {
            recursive: true,
            include_hidden: true,
        };

        for dir in [
            "/p/node_modules",
            "/p/venv",
            "/p/src/__pycache__",
            "/p/my_venv_backup",
            "/p/node_modules/pkg/lib",
        ] {
            assert!(!options.should_include(Path::new(dir), true), "{}", dir);
            assert!(
                !options.should_include(&Path::new(dir).join("file.txt"), false),
                "{}",
                dir
            );
        }

        assert!(options.should_include(Path::new("/p/src"), true));
        // only the containing directory is matched, not the file name
        assert!(options.should_include(Path::new("/p/venv.txt"), false));
    }

    #[test]
    fn default_flags_exclude_hidden_and_ignored() {
        let dir = tree(&[
            ("keep.txt", "a"),
            (".hidden", "b"),
            ("node_modules/dep.js", "c"),
            ("src/__pycache__/mod.pyc", "d"),
            ("src/main.py", "e"),
        ]);

        let found = relative(dir.path(), scan_root(dir.path(), true, false));
        assert_eq!(vec!["keep.txt", "src/main.py"], found);
    }

    #[test]
    fn include_hidden_never_brings_back_ignored_dirs() {
        let dir = tree(&[
            ("keep.txt", "a"),
            (".hidden", "b"),
            ("venv/.hidden", "c"),
            ("venv/lib.py", "d"),
        ]);

        let found = relative(dir.path(), scan_root(dir.path(), true, true));
        assert_eq!(vec![".hidden", "keep.txt"], found);
    }

    #[test]
    fn files_in_hidden_directories_are_collected() {
        let dir = tree(&[(".config/settings.toml", "a")]);

        let found = relative(dir.path(), scan_root(dir.path(), true, false));
        assert_eq!(vec![".config/settings.toml"], found);
    }

    #[test]
    fn non_recursive_only_collects_direct_children() {
        let dir = tree(&[("x.txt", "x"), ("sub/y.txt", "y")]);

        assert_eq!(
            vec!["x.txt"],
            relative(dir.path(), scan_root(dir.path(), false, false))
        );
        assert_eq!(
            vec!["sub/y.txt", "x.txt"],
            relative(dir.path(), scan_root(dir.path(), true, false))
        );
    }

    #[test]
    fn root_inside_ignored_path_yields_nothing() {
        let dir = tree(&[("venv_project/a.txt", "a")]);

        assert!(scan_root(&dir.path().join("venv_project"), true, true).is_empty());
    }

    #[test]
    fn overlapping_roots_collapse() {
        let dir = tree(&[("a.txt", "a"), ("sub/b.txt", "b")]);
        let sub = dir.path().join("sub");
        let spelled_differently = sub.join("..").join("sub");

        let roots =
            resolve_roots(&[dir.path(), sub.as_path(), spelled_differently.as_path()]).unwrap();
        let options = ScanOptions {
            recursive: true,
            include_hidden: false,
        };
        let found = relative(dir.path(), scan(&roots, &options).into_iter().collect());
        assert_eq!(vec!["a.txt", "sub/b.txt"], found);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_collected() {
        let dir = tree(&[("real/a.txt", "a")]);
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real/a.txt"), dir.path().join("a_link"))
            .unwrap();

        let found = relative(dir.path(), scan_root(dir.path(), true, false));
        assert_eq!(vec!["a_link", "real/a.txt"], found);
    }

    #[test]
    fn resolve_roots_rejects_missing_and_non_directories() {
        let dir = tree(&[("file.txt", "a")]);

        assert!(matches!(
            resolve_roots(&[dir.path().join("missing")]),
            Err(Error::RootNotFound(_))
        ));
        assert!(matches!(
            resolve_roots(&[dir.path().join("file.txt")]),
            Err(Error::NotADirectory(_))
        ));

        let roots = resolve_roots(&[dir.path()]).unwrap();
        assert!(roots[0].is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_is_matched_by_the_path_given() {
        let dir = tree(&[
            ("venv_store/data/a.txt", "same"),
            ("venv_store/data/b.txt", "same"),
        ]);
        let project = dir.path().join("project");
        std::os::unix::fs::symlink(dir.path().join("venv_store/data"), &project).unwrap();

        let roots = resolve_roots(&[&project]).unwrap();
        assert_eq!(vec![project.clone()], roots);

        let found = relative(&project, scan_root(&project, true, false));
        assert_eq!(vec!["a.txt", "b.txt"], found);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_skipped_and_the_walk_continues() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree(&[("a.txt", "a"), ("locked/secret.txt", "s"), ("z/b.txt", "b")]);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // privileged users read through the mode bits
        let enforced = fs::read_dir(&locked).is_err();

        let found = relative(dir.path(), scan_root(dir.path(), true, false));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(found.contains(&"a.txt".to_string()), "{:?}", found);
        assert!(found.contains(&"z/b.txt".to_string()), "{:?}", found);
        if enforced {
            assert_eq!(vec!["a.txt", "z/b.txt"], found);
        }
    }

    #[cfg(unix)]
    #[test]
    fn fifos_are_not_collected() {
        let dir = tree(&[("a.txt", "a")]);
        let fifo = dir.path().join("pipe");
        let made = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .map_or(false, |status| status.success());
        if !made {
            return;
        }
        std::os::unix::fs::symlink(&fifo, dir.path().join("pipe_link")).unwrap();

        let found = relative(dir.path(), scan_root(dir.path(), true, false));
        assert_eq!(vec!["a.txt"], found);
    }

    #[cfg(unix)]
    #[test]
    fn broken_links_are_collected() {
        let dir = tree(&[("a.txt", "a")]);
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("broken")).unwrap();

        let found = relative(dir.path(), scan_root(dir.path(), true, false));
        assert_eq!(vec!["a.txt", "broken"], found);
    }

    #[test]
    fn lexical_absolute_drops_dot_segments() {
        let dir = tree(&[("sub/a.txt", "a")]);
        let messy = dir.path().join("sub").join(".").join("..").join("sub");

        assert_eq!(dir.path().join("sub"), lexical_absolute(&messy).unwrap());
    }
}
