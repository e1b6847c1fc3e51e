//! Versioned file storage used for the login audit document.
//!
//! Writes are optimistic: every write names the revision it was computed from and the
//! store rejects it when the file has moved on, so two concurrent logins can't silently
//! overwrite each other.

use async_trait::async_trait;

use crate::error::Error;

/// A file read from the store together with its revision marker.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub content: Vec<u8>,
    /// Opaque revision (a blob sha for the GitHub contents API).
    pub revision: String,
}

/// Trait for reading and conditionally writing whole files.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the file at `path`. Returns `Ok(None)` when it does not exist.
    async fn fetch(&self, path: &str) -> Result<Option<StoredFile>, Error>;

    /// Replace the file at `path` with `content` if its current revision is
    /// `expected_revision`. `None` means the file is expected not to exist yet.
    ///
    /// # Returns
    ///
    /// The new revision on success, or an `ExternalErrorKind::Conflict` error when the
    /// store rejected the write because the revision no longer matches.
    async fn compare_and_swap(
        &self,
        path: &str,
        content: &[u8],
        expected_revision: Option<&str>,
        message: &str,
    ) -> Result<String, Error>;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store with the same conditional-write semantics, for tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind};

    #[derive(Default)]
    pub(crate) struct MemoryContentStore {
        files: Mutex<HashMap<String, StoredFile>>,
        next_revision: Mutex<u64>,
        pub(crate) messages: Mutex<Vec<String>>,
        /// Number of upcoming writes to reject as if another writer got there first.
        pub(crate) conflicts_to_inject: Mutex<u32>,
        fail_reads: bool,
    }

    impl MemoryContentStore {
        pub(crate) fn with_file(path: &str, content: &str) -> Self {
            let store = Self::default();
            store.files.lock().unwrap().insert(
                path.to_string(),
                StoredFile {
                    content: content.as_bytes().to_vec(),
                    revision: "rev-0".to_string(),
                },
            );
            store
        }

        /// A store whose reads fail as if the backend were unreachable.
        pub(crate) fn unreachable() -> Self {
            Self {
                fail_reads: true,
                ..Default::default()
            }
        }

        pub(crate) fn content(&self, path: &str) -> Option<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .map(|f| String::from_utf8(f.content.clone()).unwrap())
        }

        pub(crate) fn revision(&self, path: &str) -> Option<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .map(|f| f.revision.clone())
        }
    }

    fn conflict() -> Error {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Conflict),
        }
    }

    #[async_trait]
    impl ContentStore for MemoryContentStore {
        async fn fetch(&self, path: &str) -> Result<Option<StoredFile>, Error> {
            if self.fail_reads {
                return Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                });
            }
            Ok(self.files.lock().unwrap().get(path).cloned())
        }

        async fn compare_and_swap(
            &self,
            path: &str,
            content: &[u8],
            expected_revision: Option<&str>,
            message: &str,
        ) -> Result<String, Error> {
            {
                let mut pending = self.conflicts_to_inject.lock().unwrap();
                if *pending > 0 {
                    *pending -= 1;
                    // Simulate a concurrent writer landing first.
                    let mut files = self.files.lock().unwrap();
                    if let Some(file) = files.get_mut(path) {
                        file.revision = format!("{}-concurrent", file.revision);
                    }
                    return Err(conflict());
                }
            }

            let mut files = self.files.lock().unwrap();
            let current = files.get(path).map(|f| f.revision.as_str());
            if current != expected_revision {
                return Err(conflict());
            }

            let mut counter = self.next_revision.lock().unwrap();
            *counter += 1;
            let revision = format!("rev-{}", *counter);
            files.insert(
                path.to_string(),
                StoredFile {
                    content: content.to_vec(),
                    revision: revision.clone(),
                },
            );
            self.messages.lock().unwrap().push(message.to_string());
            Ok(revision)
        }
    }

    #[tokio::test]
    async fn test_rejects_stale_revision() {
        let store = MemoryContentStore::with_file("a.json", "{}");
        let err = store
            .compare_and_swap("a.json", b"{}", Some("stale"), "msg")
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_rejects_create_when_file_exists() {
        let store = MemoryContentStore::with_file("a.json", "{}");
        let err = store
            .compare_and_swap("a.json", b"{}", None, "msg")
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_accepts_current_revision() {
        let store = MemoryContentStore::with_file("a.json", "{}");
        let revision = store
            .compare_and_swap("a.json", b"[]", Some("rev-0"), "msg")
            .await
            .unwrap();
        assert_eq!(store.revision("a.json"), Some(revision));
        assert_eq!(store.content("a.json").as_deref(), Some("[]"));
    }
}
