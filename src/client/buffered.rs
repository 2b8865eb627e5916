//! Auto-flushing write buffer.

use log::debug;

use crate::client::traits::{ClientResult, Endpoint, SearchClient, UpdateBatch, WriteBuffer};
use crate::document::TargetDocument;

/// A [`WriteBuffer`] that submits one update batch per `capacity` documents.
///
/// A failed submission is reported to the caller and the documents it carried
/// are not kept in the buffer.
#[derive(Debug)]
pub struct BufferedWriter<'a, C: SearchClient + ?Sized> {
    client: &'a C,
    endpoint: Option<Endpoint>,
    capacity: usize,
    documents: Vec<TargetDocument>,
    submissions: usize,
}

impl<'a, C: SearchClient + ?Sized> BufferedWriter<'a, C> {
    /// Create a buffer. A capacity of zero is treated as one.
    pub fn new(client: &'a C, endpoint: Option<Endpoint>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        BufferedWriter {
            client,
            endpoint,
            capacity,
            documents: Vec::with_capacity(capacity),
            submissions: 0,
        }
    }
}

impl<C: SearchClient + ?Sized> WriteBuffer for BufferedWriter<'_, C> {
    fn add_document(&mut self, document: TargetDocument) -> ClientResult<()> {
        self.documents.push(document);
        if self.documents.len() >= self.capacity {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> ClientResult<usize> {
        if self.documents.is_empty() {
            return Ok(0);
        }

        let documents = std::mem::replace(&mut self.documents, Vec::with_capacity(self.capacity));
        let count = documents.len();
        self.client
            .update(UpdateBatch::from_documents(documents), self.endpoint.as_ref())?;
        self.submissions += 1;

        debug!("flushed {count} buffered documents");
        Ok(count)
    }

    fn commit(&mut self) -> ClientResult<usize> {
        let flushed = self.flush()?;
        self.client
            .update(UpdateBatch::commit_only(), self.endpoint.as_ref())?;
        Ok(flushed)
    }

    fn len(&self) -> usize {
        self.documents.len()
    }

    fn submissions(&self) -> usize {
        self.submissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{ClientEvent, MemoryClient};

    fn doc(id: i64) -> TargetDocument {
        TargetDocument::builder().add_integer("id", id).build()
    }

    #[test]
    fn test_auto_flush_at_capacity() {
        let client = MemoryClient::new();
        let mut buffer = BufferedWriter::new(&client, None, 2);

        buffer.add_document(doc(1)).unwrap();
        assert_eq!(buffer.len(), 1);
        assert!(client.journal().is_empty());

        buffer.add_document(doc(2)).unwrap();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.submissions(), 1);
        assert_eq!(client.pending_documents(None).len(), 2);
    }

    #[test]
    fn test_flush_empty_submits_nothing() {
        let client = MemoryClient::new();
        let mut buffer = BufferedWriter::new(&client, None, 10);

        assert_eq!(buffer.flush().unwrap(), 0);
        assert!(client.journal().is_empty());
    }

    #[test]
    fn test_commit_flushes_first() {
        let client = MemoryClient::new();
        let mut buffer = BufferedWriter::new(&client, None, 10);
        buffer.add_document(doc(1)).unwrap();

        assert_eq!(buffer.commit().unwrap(), 1);
        assert_eq!(client.num_docs(None), 1);
        assert_eq!(
            client.journal().last(),
            Some(&ClientEvent::Update {
                endpoint: "default".into(),
                documents: 0,
                commit: true,
            })
        );
    }
}
