//! Dataset loader
//!
//! Reads the item dataset on a worker thread so the UI keeps drawing while
//! the file is read and parsed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use super::{CatalogError, Item};

/// Result of a dataset load
pub type LoadOutcome = Result<Vec<Item>, CatalogError>;

/// Parse a dataset document into items
pub fn parse_items(content: &str) -> Result<Vec<Item>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Read and parse the dataset at `path`
pub fn load_items(path: &Path) -> LoadOutcome {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_items(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Handle to an in-flight dataset load
pub struct Loader {
    receiver: Option<Receiver<LoadOutcome>>,
}

impl Loader {
    /// Start loading `path` in the background
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("itemdex-loader".to_string())
            .spawn(move || {
                // Receiver may already be gone if the UI quit early
                let _ = sender.send(load_items(&path));
            });

        // A thread that never started drops the sender with its closure, so
        // the first poll reports the worker as gone.
        if let Err(e) = spawned {
            log::error!("Failed to start loader thread: {}", e);
        }

        Self::from_receiver(receiver)
    }

    fn from_receiver(receiver: Receiver<LoadOutcome>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Whether the outcome has not been collected yet
    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }

    /// Non-blocking check for the outcome. Yields it once, then `None`.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let receiver = self.receiver.as_ref()?;
        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(CatalogError::WorkerGone),
        };
        self.receiver = None;
        Some(outcome)
    }

    /// Block until the outcome arrives
    pub fn wait(mut self) -> LoadOutcome {
        match self.receiver.take() {
            Some(receiver) => receiver.recv().unwrap_or(Err(CatalogError::WorkerGone)),
            None => Err(CatalogError::WorkerGone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, Instant};

    fn write_dataset(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_items_in_order() {
        let items = parse_items(r#"[{"itemID": 2, "description": "B"}, {"itemID": 1, "description": "A"}]"#)
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "B");
        assert_eq!(items[1].description, "A");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_items(r#"{"itemID": 1}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_items(Path::new("definitely/not/here/itemData.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let file = write_dataset("[{\"itemID\": 1,");
        let err = load_items(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn test_background_load_yields_once() {
        let file = write_dataset(r#"[{"itemID": 101, "description": "Sword"}]"#);
        let mut loader = Loader::spawn(file.path());

        let deadline = Instant::now() + Duration::from_secs(5);
        let outcome = loop {
            if let Some(outcome) = loader.poll() {
                break outcome;
            }
            assert!(Instant::now() < deadline, "loader never finished");
            std::thread::sleep(Duration::from_millis(5));
        };

        assert_eq!(outcome.unwrap()[0].description, "Sword");
        assert!(!loader.is_pending());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_vanished_worker_fails_once() {
        let (sender, receiver) = mpsc::channel::<LoadOutcome>();
        drop(sender);
        let mut loader = Loader::from_receiver(receiver);

        assert!(matches!(loader.poll(), Some(Err(CatalogError::WorkerGone))));
        assert!(!loader.is_pending());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_wait_reports_failure() {
        let loader = Loader::spawn("definitely/not/here/itemData.json");
        assert!(loader.wait().is_err());
    }
}
