//! Tar-packaged plugin support.
//!
//! A plugin package may be a single `.tar`, `.tar.gz` or `.tgz` file. The
//! archive is read sequentially on every lookup; nothing is cached and no file
//! handle outlives the call.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

use crate::error::{PluginError, PluginResult};
use crate::resources::path::{RESOURCES_DIR, from_relative_path};

/// Maximum size of a single resource read out of an archive (64 MiB).
const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Compression applied to a packaged archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveCompression {
    /// Plain tar.
    None,
    /// Gzip-compressed tar.
    Gzip,
}

impl ArchiveCompression {
    /// Detect the compression from the file name, or `None` if the file is
    /// not a recognised archive.
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::Gzip)
        } else if name.ends_with(".tar") {
            Some(Self::None)
        } else {
            None
        }
    }
}

fn archive_err(path: &Path, e: impl std::fmt::Display) -> PluginError {
    PluginError::Archive {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn open_archive(
    path: &Path,
    compression: ArchiveCompression,
) -> PluginResult<Archive<Box<dyn Read>>> {
    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = match compression {
        ArchiveCompression::None => Box::new(file),
        ArchiveCompression::Gzip => Box::new(GzDecoder::new(file)),
    };
    Ok(Archive::new(reader))
}

/// Map an archive entry path to a logical resource path, if it lives under
/// `resources/`.
fn logical_path_of(entry_path: &Path) -> Option<String> {
    let full = from_relative_path(entry_path)?;
    let rest = full.strip_prefix(RESOURCES_DIR)?.strip_prefix('/')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_owned())
    }
}

/// Read one resource out of an archive.
///
/// Returns `Ok(None)` if no regular file is stored under
/// `resources/<logical>`. When the path appears more than once the last
/// entry wins, as it would on extraction.
///
/// # Errors
///
/// Returns [`PluginError::Archive`] if the archive is unreadable or the entry
/// exceeds the size limit, [`PluginError::Io`] if the file cannot be opened.
pub fn read_entry(
    path: &Path,
    compression: ArchiveCompression,
    logical: &str,
) -> PluginResult<Option<Vec<u8>>> {
    let mut archive = open_archive(path, compression)?;
    let mut found = None;
    for entry in archive.entries().map_err(|e| archive_err(path, e))? {
        let mut entry = entry.map_err(|e| archive_err(path, e))?;
        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }
        let entry_path = entry.path().map_err(|e| archive_err(path, e))?.into_owned();
        if logical_path_of(&entry_path).as_deref() != Some(logical) {
            continue;
        }

        let size = entry.header().size().map_err(|e| archive_err(path, e))?;
        if size > MAX_ENTRY_SIZE {
            return Err(archive_err(
                path,
                format!(
                    "resource {logical} is {size} bytes, exceeding the {MAX_ENTRY_SIZE} byte limit"
                ),
            ));
        }
        let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
        entry.read_to_end(&mut buf)?;
        found = Some(buf);
    }
    Ok(found)
}

/// List the logical paths of every regular file under `resources/`, in
/// order of first appearance. Repeated entries are listed once.
///
/// # Errors
///
/// Returns [`PluginError::Archive`] if the archive is unreadable.
pub fn list_entries(path: &Path, compression: ArchiveCompression) -> PluginResult<Vec<String>> {
    let mut archive = open_archive(path, compression)?;
    let mut seen = HashSet::new();
    let mut logical_paths = Vec::new();
    for entry in archive.entries().map_err(|e| archive_err(path, e))? {
        let entry = entry.map_err(|e| archive_err(path, e))?;
        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }
        let entry_path = entry.path().map_err(|e| archive_err(path, e))?;
        let Some(logical) = logical_path_of(&entry_path) else {
            continue;
        };
        if seen.insert(logical.clone()) {
            logical_paths.push(logical);
        }
    }
    Ok(logical_paths)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn write_tar(dest: &Path, gzip: bool, files: &[(&str, &[u8])]) {
        let file = File::create(dest).unwrap();
        let writer: Box<dyn std::io::Write> = if gzip {
            Box::new(flate2::write::GzEncoder::new(
                file,
                flate2::Compression::default(),
            ))
        } else {
            Box::new(file)
        };
        let mut builder = tar::Builder::new(writer);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_entry_type(EntryType::Regular);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().flush().unwrap();
    }

    #[test]
    fn detect_compression() {
        assert_eq!(
            ArchiveCompression::detect(Path::new("p.tar")),
            Some(ArchiveCompression::None)
        );
        assert_eq!(
            ArchiveCompression::detect(Path::new("p.TAR.GZ")),
            Some(ArchiveCompression::Gzip)
        );
        assert_eq!(
            ArchiveCompression::detect(Path::new("p.tgz")),
            Some(ArchiveCompression::Gzip)
        );
        assert_eq!(ArchiveCompression::detect(Path::new("p.zip")), None);
        assert_eq!(ArchiveCompression::detect(&PathBuf::from("dir")), None);
    }

    #[test]
    fn logical_path_strips_resources_prefix() {
        assert_eq!(
            logical_path_of(Path::new("resources/lang/en.yml")).as_deref(),
            Some("lang/en.yml")
        );
        assert_eq!(
            logical_path_of(Path::new("./resources/config.yml")).as_deref(),
            Some("config.yml")
        );
        assert!(logical_path_of(Path::new("src/lib.rs")).is_none());
        assert!(logical_path_of(Path::new("resources")).is_none());
        assert!(logical_path_of(Path::new("resourcesx/a")).is_none());
    }

    #[test]
    fn read_and_list_gzip_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("plugin.tar.gz");
        write_tar(
            &pkg,
            true,
            &[
                ("plugin.yml", &b"name: x\nversion: 1\n"[..]),
                ("resources/config.yml", &b"a: 1\n"[..]),
                ("resources/lang/en.yml", &b"hello: Hello\n"[..]),
            ],
        );

        let data = read_entry(&pkg, ArchiveCompression::Gzip, "lang/en.yml").unwrap();
        assert_eq!(data.as_deref(), Some(&b"hello: Hello\n"[..]));
        assert!(
            read_entry(&pkg, ArchiveCompression::Gzip, "missing.yml")
                .unwrap()
                .is_none()
        );

        let listed = list_entries(&pkg, ArchiveCompression::Gzip).unwrap();
        assert_eq!(listed, vec!["config.yml", "lang/en.yml"]);
    }

    #[test]
    fn plain_tar_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("plugin.tar");
        write_tar(&pkg, false, &[("resources/a.txt", &b"abc"[..])]);
        let data = read_entry(&pkg, ArchiveCompression::None, "a.txt").unwrap();
        assert_eq!(data.as_deref(), Some(&b"abc"[..]));
    }

    #[test]
    fn repeated_entry_resolves_to_last_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("plugin.tar");
        write_tar(
            &pkg,
            false,
            &[
                ("resources/a.txt", &b"old"[..]),
                ("resources/b.txt", &b"b"[..]),
                ("resources/a.txt", &b"new"[..]),
            ],
        );

        let data = read_entry(&pkg, ArchiveCompression::None, "a.txt").unwrap();
        assert_eq!(data.as_deref(), Some(&b"new"[..]));
        let listed = list_entries(&pkg, ArchiveCompression::None).unwrap();
        assert_eq!(listed, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("plugin.tar.gz");
        std::fs::write(&pkg, b"definitely not gzip").unwrap();
        assert!(list_entries(&pkg, ArchiveCompression::Gzip).is_err());
    }
}
