use super::{NumericSource, ValueCursor, ValueSource};
use crate::aggregations::DocId;
use crate::table::{HashedBytes, TermKey};
use std::io;

/// Term values held in memory, one list per document id.
#[derive(Debug, Clone, Default)]
pub struct MemoryValues {
    docs: Vec<Vec<TermKey>>,
}

impl MemoryValues {
    pub fn from_docs<D, V>(docs: impl IntoIterator<Item = D>) -> Self
    where
        D: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let docs = docs
            .into_iter()
            .map(|values| {
                values
                    .into_iter()
                    .map(|value| TermKey::new(value.as_ref()))
                    .collect()
            })
            .collect();
        Self { docs }
    }

    /// One value per document.
    pub fn single<V: AsRef<[u8]>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::from_docs(values.into_iter().map(std::iter::once))
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    fn doc(&self, doc: DocId) -> &[TermKey] {
        self.docs.get(doc as usize).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ValueSource for MemoryValues {
    type Cursor<'a> = MemoryCursor<'a>;

    fn has_value(&self, doc: DocId) -> bool {
        !self.doc(doc).is_empty()
    }

    fn is_multivalued(&self, doc: DocId) -> bool {
        self.doc(doc).len() > 1
    }

    fn single_value(&mut self, doc: DocId) -> io::Result<HashedBytes<'_>> {
        let key = self.doc(doc).first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("doc {} has no value", doc))
        })?;
        Ok(HashedBytes::with_hash(key.as_bytes(), key.hash_value()))
    }

    fn values(&mut self, doc: DocId) -> io::Result<Self::Cursor<'_>> {
        Ok(MemoryCursor {
            values: self.doc(doc).iter(),
        })
    }
}

pub struct MemoryCursor<'a> {
    values: std::slice::Iter<'a, TermKey>,
}

impl ValueCursor for MemoryCursor<'_> {
    fn next_value(&mut self) -> io::Result<Option<HashedBytes<'_>>> {
        Ok(self
            .values
            .next()
            .map(|key| HashedBytes::with_hash(key.as_bytes(), key.hash_value())))
    }
}

/// Numeric values held in memory, one list per document id.
#[derive(Debug, Clone, Default)]
pub struct MemoryNumbers {
    docs: Vec<Vec<f64>>,
}

impl MemoryNumbers {
    pub fn new(docs: Vec<Vec<f64>>) -> Self {
        Self { docs }
    }
}

impl NumericSource for MemoryNumbers {
    fn values(&self, doc: DocId, out: &mut Vec<f64>) -> io::Result<()> {
        if let Some(values) = self.docs.get(doc as usize) {
            out.extend_from_slice(values);
        }
        Ok(())
    }
}
