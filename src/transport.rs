use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote path does not exist on the feed. For state feeds this
    /// usually means a bad postal code; for national feeds, a bad date.
    #[error("the requested file does not exist on the feed: {0}")]
    NotFound(String),
    #[error("the username and password were rejected by the feed")]
    BadCredentials,
    #[error("connection failure: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Supplies raw bytes for a named remote path.
///
/// Implementations own the session: they connect lazily, re-establish a
/// connection found closed between fetches, and release it in `close`.
/// The parsing engine never reinterprets transport failures; they pass
/// through to the caller unchanged.
pub trait FileTransport {
    fn fetch(&mut self, path: &str) -> Result<Vec<u8>>;

    /// Explicitly end the session. A no-op by default.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A transport backed by a path-to-bytes map.
///
/// Used by the test suites, and by callers who have staged feed files on
/// disk and want to replay them through the regular client.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), body.into());
    }
}

impl FileTransport for MemoryTransport {
    fn fetch(&mut self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_transport_returns_staged_bytes() {
        let mut transport = MemoryTransport::new();
        transport.insert("/inits/IA/IA_race.txt", "data");
        assert_eq!(transport.fetch("/inits/IA/IA_race.txt").unwrap(), b"data");
    }

    #[test]
    fn memory_transport_misses_are_not_found() {
        let mut transport = MemoryTransport::new();
        match transport.fetch("/inits/ZZ/ZZ_race.txt") {
            Err(TransportError::NotFound(path)) => assert_eq!(path, "/inits/ZZ/ZZ_race.txt"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
