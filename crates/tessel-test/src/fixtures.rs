//! Plugin package fixtures.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tessel_plugins::PluginDescription;

/// Create a test plugin description with version `1.0.0`.
///
/// # Panics
///
/// Panics if `name` is not a valid plugin name.
#[must_use]
pub fn test_description(name: &str) -> PluginDescription {
    PluginDescription::new(name, "1.0.0").expect("invalid test plugin name")
}

/// Collects bundled resources, then writes them out as a plugin package.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    resources: Vec<(String, Vec<u8>)>,
}

impl PackageBuilder {
    /// Start an empty package.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle `content` at logical path `path` (under `resources/`).
    #[must_use]
    pub fn resource(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.resources
            .push((path.to_owned(), content.as_ref().to_vec()));
        self
    }

    /// Write a directory package.
    ///
    /// # Panics
    ///
    /// Panics if the files cannot be written.
    #[must_use]
    pub fn directory(self) -> PackageFixture {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = dir.path().join("package");
        for (path, content) in &self.resources {
            let file = root.join("resources").join(path);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create resource directory");
            }
            std::fs::write(&file, content).expect("Failed to write resource");
        }
        std::fs::create_dir_all(&root).expect("Failed to create package directory");
        PackageFixture::new(dir, root)
    }

    /// Write an uncompressed `.tar` package.
    ///
    /// # Panics
    ///
    /// Panics if the archive cannot be written.
    #[must_use]
    pub fn tar(self) -> PackageFixture {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = dir.path().join("package.tar");
        let file = File::create(&root).expect("Failed to create archive");
        let file = self.append_all(file);
        file.sync_all().expect("Failed to sync archive");
        PackageFixture::new(dir, root)
    }

    /// Write a gzip-compressed `.tar.gz` package.
    ///
    /// # Panics
    ///
    /// Panics if the archive cannot be written.
    #[must_use]
    pub fn tar_gz(self) -> PackageFixture {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = dir.path().join("package.tar.gz");
        let file = File::create(&root).expect("Failed to create archive");
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let encoder = self.append_all(encoder);
        encoder.finish().expect("Failed to finish gzip stream");
        PackageFixture::new(dir, root)
    }

    fn append_all<W: std::io::Write>(&self, writer: W) -> W {
        let mut builder = tar::Builder::new(writer);
        for (path, content) in &self.resources {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_entry_type(tar::EntryType::Regular);
            builder
                .append_data(&mut header, format!("resources/{path}"), content.as_slice())
                .expect("Failed to append archive entry");
        }
        builder.into_inner().expect("Failed to finish archive")
    }
}

/// A plugin package on disk plus an empty data folder next to it.
///
/// Both are removed when the fixture is dropped.
#[derive(Debug)]
pub struct PackageFixture {
    dir: TempDir,
    root: PathBuf,
}

impl PackageFixture {
    fn new(dir: TempDir, root: PathBuf) -> Self {
        Self { dir, root }
    }

    /// The package root (directory or archive file).
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A data folder for the plugin. Not created until something writes it.
    #[must_use]
    pub fn data_folder(&self) -> PathBuf {
        self.dir.path().join("data")
    }
}

#[cfg(test)]
mod tests {
    use tessel_plugins::{ArchiveCompression, PackageKind, ResourceStore};

    use super::*;

    fn builder() -> PackageBuilder {
        PackageBuilder::new()
            .resource("config.yml", "a: 1\n")
            .resource("lang/en.yml", b"hi: there\n")
    }

    #[test]
    fn directory_package() {
        let pkg = builder().directory();
        let store = ResourceStore::new(pkg.root());
        assert_eq!(store.kind(), PackageKind::Directory);
        assert!(store.exists("lang/en.yml"));
        assert!(!pkg.data_folder().exists());
    }

    #[test]
    fn archive_packages() {
        for (pkg, compression) in [
            (builder().tar(), ArchiveCompression::None),
            (builder().tar_gz(), ArchiveCompression::Gzip),
        ] {
            let store = ResourceStore::new(pkg.root());
            assert_eq!(store.kind(), PackageKind::Archive(compression));
            let mut listed: Vec<String> = store.list().collect();
            listed.sort();
            assert_eq!(listed, vec!["config.yml", "lang/en.yml"]);
        }
    }

    #[test]
    fn description_fixture() {
        assert_eq!(test_description("Greeter").full_name(), "Greeter v1.0.0");
    }
}
