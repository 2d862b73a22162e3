//! Access to files read by `\input`.

use std::path::Path;

pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// The file system of the host.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// An in-memory file system.
    #[derive(Debug, Default)]
    pub struct InMemoryFileSystem(pub HashMap<String, String>);

    impl FileSystem for InMemoryFileSystem {
        fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            path.to_str()
                .and_then(|p| self.0.get(p))
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }
    }
}
