//! Shared handle to the live page.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::document::Document;

/// Cloneable handle to the live page, shared between the host and the
/// agent's plugins. The foreground is single-threaded cooperative, so the
/// lock is uncontended in practice; it exists so the handle crosses task
/// boundaries safely.
#[derive(Clone)]
pub struct PageHandle {
    inner: Arc<Mutex<Document>>,
}

impl PageHandle {
    pub fn new(document: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(document)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Document> {
        self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_shares_one_document() {
        let page = PageHandle::new(Document::new("https://example.test/"));
        let clone = page.clone();
        let div = {
            let mut doc = page.lock();
            let root = doc.root();
            let div = doc.create_element("div");
            doc.append_child(root, div);
            div
        };
        assert!(clone.lock().is_attached(div));
    }
}
