//! Read-only access to the files bundled with a plugin package.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::PluginResult;
use crate::resources::archive::{self, ArchiveCompression};
use crate::resources::path::{RESOURCES_DIR, from_relative_path, normalize, to_relative_path};

/// Physical layout of a plugin package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// A plain directory; resources live in `<root>/resources/`.
    Directory,
    /// A single tar file; resources are the entries under `resources/`.
    Archive(ArchiveCompression),
}

impl PackageKind {
    /// Detect the layout of `root`. Anything that is not an existing archive
    /// file is treated as a directory.
    #[must_use]
    pub fn detect(root: &Path) -> Self {
        match ArchiveCompression::detect(root) {
            Some(compression) if root.is_file() => Self::Archive(compression),
            _ => Self::Directory,
        }
    }
}

/// An open resource stream.
///
/// The underlying file handle (if any) is released when the value is
/// dropped, so early returns and `?` paths cannot leak it.
pub struct Resource {
    logical_path: String,
    reader: Box<dyn Read + Send>,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("logical_path", &self.logical_path)
            .finish_non_exhaustive()
    }
}

impl Resource {
    fn from_file(logical_path: String, file: File) -> Self {
        Self {
            logical_path,
            reader: Box::new(BufReader::new(file)),
        }
    }

    fn from_bytes(logical_path: String, bytes: Vec<u8>) -> Self {
        Self {
            logical_path,
            reader: Box::new(Cursor::new(bytes)),
        }
    }

    /// The normalized logical path this stream was opened for.
    #[must_use]
    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    /// Read the remaining bytes and release the stream.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Resolves logical resource paths against one package root.
///
/// The store holds no open handles between calls.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    package_root: PathBuf,
    kind: PackageKind,
}

impl ResourceStore {
    /// Create a store for `package_root`, detecting its layout.
    #[must_use]
    pub fn new(package_root: impl Into<PathBuf>) -> Self {
        let package_root = package_root.into();
        let kind = PackageKind::detect(&package_root);
        Self { package_root, kind }
    }

    /// The package root this store reads from.
    #[must_use]
    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    /// The detected package layout.
    #[must_use]
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Open a bundled resource.
    ///
    /// Returns `Ok(None)` when the path is invalid or nothing is stored there.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O faults while locating or reading the
    /// resource.
    pub fn open(&self, logical: &str) -> PluginResult<Option<Resource>> {
        let normalized = match normalize(logical) {
            Ok(n) => n,
            Err(e) => {
                debug!(error = %e, "rejecting resource lookup");
                return Ok(None);
            },
        };

        match self.kind {
            PackageKind::Directory => {
                let path = self
                    .package_root
                    .join(RESOURCES_DIR)
                    .join(to_relative_path(&normalized));
                let file = match File::open(&path) {
                    Ok(f) => f,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                if !file.metadata()?.is_file() {
                    return Ok(None);
                }
                Ok(Some(Resource::from_file(normalized, file)))
            },
            PackageKind::Archive(compression) => {
                let bytes = archive::read_entry(&self.package_root, compression, &normalized)?;
                Ok(bytes.map(|b| Resource::from_bytes(normalized, b)))
            },
        }
    }

    /// Whether a resource exists at `logical`.
    #[must_use]
    pub fn exists(&self, logical: &str) -> bool {
        matches!(self.open(logical), Ok(Some(_)))
    }

    /// Copy a bundled resource to `destination_folder/<logical>`.
    ///
    /// Intermediate directories are created. Returns `false` when the
    /// resource does not exist, when the destination already exists and
    /// `overwrite` is off, or when an I/O fault interrupts the copy.
    pub fn save(&self, logical: &str, destination_folder: &Path, overwrite: bool) -> bool {
        match self.try_save(logical, destination_folder, overwrite) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(
                    resource = logical,
                    destination = %destination_folder.display(),
                    error = %e,
                    "failed to save resource"
                );
                false
            },
        }
    }

    fn try_save(
        &self,
        logical: &str,
        destination_folder: &Path,
        overwrite: bool,
    ) -> PluginResult<bool> {
        let Some(mut resource) = self.open(logical)? else {
            debug!(resource = logical, "resource not found, nothing to save");
            return Ok(false);
        };

        let out = destination_folder.join(to_relative_path(resource.logical_path()));
        if out.exists() && !overwrite {
            debug!(path = %out.display(), "destination exists, not overwriting");
            return Ok(false);
        }

        let copied = write_atomically(&out, &mut resource)?;
        debug!(path = %out.display(), bytes = copied, "saved resource");
        Ok(true)
    }

    /// Iterate over the logical paths of all bundled resources.
    ///
    /// Each call starts a fresh traversal. Directory packages are walked
    /// lazily; archive packages are scanned once when the iterator is built.
    #[must_use]
    pub fn list(&self) -> ResourceIter {
        match self.kind {
            PackageKind::Directory => {
                let root = self.package_root.join(RESOURCES_DIR);
                if !root.is_dir() {
                    return ResourceIter::empty();
                }
                ResourceIter {
                    inner: IterInner::Walk {
                        walker: WalkDir::new(&root)
                            .follow_links(false)
                            .sort_by_file_name()
                            .into_iter(),
                        root,
                    },
                }
            },
            PackageKind::Archive(compression) => {
                match archive::list_entries(&self.package_root, compression) {
                    Ok(paths) => ResourceIter {
                        inner: IterInner::Listed(paths.into_iter()),
                    },
                    Err(e) => {
                        warn!(
                            package = %self.package_root.display(),
                            error = %e,
                            "failed to list archive resources"
                        );
                        ResourceIter::empty()
                    },
                }
            },
        }
    }
}

/// Copy `reader` into a temp file next to `out`, then move it into place.
///
/// An existing file at `out` is left untouched unless the whole copy
/// succeeds.
fn write_atomically(out: &Path, reader: &mut impl Read) -> io::Result<u64> {
    let parent = out.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    let copied = io::copy(reader, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(out).map_err(|e| e.error)?;
    Ok(copied)
}

/// Iterator over logical resource paths. See [`ResourceStore::list`].
pub struct ResourceIter {
    inner: IterInner,
}

enum IterInner {
    Walk {
        root: PathBuf,
        walker: walkdir::IntoIter,
    },
    Listed(std::vec::IntoIter<String>),
}

impl ResourceIter {
    fn empty() -> Self {
        Self {
            inner: IterInner::Listed(Vec::new().into_iter()),
        }
    }
}

impl fmt::Debug for ResourceIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceIter").finish_non_exhaustive()
    }
}

impl Iterator for ResourceIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match &mut self.inner {
            IterInner::Listed(paths) => paths.next(),
            IterInner::Walk { root, walker } => loop {
                let entry = match walker.next()? {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable resource entry");
                        continue;
                    },
                };
                // Follows symlinks, matching what `open` will serve.
                if !entry.path().is_file() {
                    continue;
                }
                let logical = entry
                    .path()
                    .strip_prefix(&*root)
                    .ok()
                    .and_then(from_relative_path);
                if logical.is_some() {
                    return logical;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = tmp.path().join(RESOURCES_DIR).join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        tmp
    }

    #[test]
    fn detect_directory_package() {
        let pkg = package_with(&[]);
        let store = ResourceStore::new(pkg.path());
        assert_eq!(store.kind(), PackageKind::Directory);
    }

    #[test]
    fn nonexistent_archive_name_is_directory() {
        assert_eq!(
            PackageKind::detect(Path::new("/nonexistent/plugin.tar.gz")),
            PackageKind::Directory
        );
    }

    #[test]
    fn open_existing_and_missing() {
        let pkg = package_with(&[("config.yml", "a: 1\n"), ("lang/en.yml", "hi: there\n")]);
        let store = ResourceStore::new(pkg.path());

        let res = store.open("lang\\en.yml").unwrap().unwrap();
        assert_eq!(res.logical_path(), "lang/en.yml");
        assert_eq!(res.into_bytes().unwrap(), b"hi: there\n");

        assert!(store.open("missing.yml").unwrap().is_none());
        assert!(store.open("../escape").unwrap().is_none());
        assert!(store.open("lang").unwrap().is_none());
        assert!(store.exists("config.yml/"));
    }

    #[test]
    fn save_copies_bytes_and_creates_dirs() {
        let pkg = package_with(&[("lang/en.yml", "hi: there\n")]);
        let store = ResourceStore::new(pkg.path());
        let dest = tempfile::tempdir().unwrap();

        assert!(store.save("lang/en.yml", dest.path(), false));
        let copied = std::fs::read(dest.path().join("lang").join("en.yml")).unwrap();
        assert_eq!(copied, b"hi: there\n");
    }

    #[test]
    fn save_without_overwrite_keeps_existing() {
        let pkg = package_with(&[("x.txt", "bundled")]);
        let store = ResourceStore::new(pkg.path());
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(dest.path().join("x.txt"), "user edit").unwrap();

        assert!(!store.save("x.txt", dest.path(), false));
        assert_eq!(
            std::fs::read_to_string(dest.path().join("x.txt")).unwrap(),
            "user edit"
        );

        assert!(store.save("x.txt", dest.path(), true));
        assert_eq!(
            std::fs::read_to_string(dest.path().join("x.txt")).unwrap(),
            "bundled"
        );
    }

    #[test]
    fn save_missing_resource_fails() {
        let pkg = package_with(&[]);
        let store = ResourceStore::new(pkg.path());
        let dest = tempfile::tempdir().unwrap();
        assert!(!store.save("nope.txt", dest.path(), true));
        assert!(!dest.path().join("nope.txt").exists());
    }

    #[test]
    fn save_empty_resource_succeeds() {
        let pkg = package_with(&[("empty.txt", "")]);
        let store = ResourceStore::new(pkg.path());
        let dest = tempfile::tempdir().unwrap();
        assert!(store.save("empty.txt", dest.path(), false));
        assert!(dest.path().join("empty.txt").is_file());
    }

    #[test]
    fn list_is_recursive_and_restartable() {
        let pkg = package_with(&[
            ("config.yml", "a: 1\n"),
            ("lang/en.yml", "x"),
            ("lang/de.yml", "y"),
        ]);
        let store = ResourceStore::new(pkg.path());

        let mut first: Vec<String> = store.list().collect();
        first.sort();
        assert_eq!(first, vec!["config.yml", "lang/de.yml", "lang/en.yml"]);

        let mut second: Vec<String> = store.list().collect();
        second.sort();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn list_includes_symlinked_files() {
        let pkg = package_with(&[("real.txt", "data")]);
        let dir = pkg.path().join(RESOURCES_DIR);
        std::os::unix::fs::symlink(dir.join("real.txt"), dir.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(dir.join("gone.txt"), dir.join("dangling.txt")).unwrap();
        let store = ResourceStore::new(pkg.path());

        let mut listed: Vec<String> = store.list().collect();
        listed.sort();
        assert_eq!(listed, vec!["link.txt", "real.txt"]);
        for path in &listed {
            assert!(store.exists(path));
        }
        assert!(!store.exists("dangling.txt"));
    }

    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::other("device full"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"part");
            Ok(4)
        }
    }

    #[test]
    fn interrupted_copy_keeps_existing_file() {
        let dest = tempfile::tempdir().unwrap();
        let out = dest.path().join("x.txt");
        std::fs::write(&out, "user edit").unwrap();

        let err = write_atomically(&out, &mut FailingReader { sent: false }).unwrap_err();
        assert_eq!(err.to_string(), "device full");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "user edit");
        let leftovers = std::fs::read_dir(dest.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dest = tempfile::tempdir().unwrap();
        let out = dest.path().join("nested").join("x.txt");
        assert_eq!(write_atomically(&out, &mut &b"first"[..]).unwrap(), 5);
        assert_eq!(write_atomically(&out, &mut &b"second"[..]).unwrap(), 6);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "second");
    }

    #[test]
    fn list_without_resources_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResourceStore::new(tmp.path());
        assert_eq!(store.list().count(), 0);
    }
}
