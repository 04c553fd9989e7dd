//! Value sources backed by tantivy fast fields of a single segment

use super::{NumericSource, ValueCursor, ValueSource};
use crate::aggregations::DocId;
use crate::table::HashedBytes;
use crate::{Error, Result};
use std::io;
use tantivy::columnar::{Column, StrColumn};
use tantivy::SegmentReader;

/// Terms of a string fast field. Values are resolved from term ordinals
/// through the column dictionary into a reused buffer.
pub struct FastFieldValues {
    column: StrColumn,
    ords: Vec<u64>,
    buffer: Vec<u8>,
}

impl FastFieldValues {
    pub fn open(reader: &SegmentReader, field: &str) -> Result<Self> {
        let column = reader
            .fast_fields()
            .str(field)?
            .ok_or_else(|| Error::FieldNotFound(field.to_string()))?;
        Ok(Self::new(column))
    }

    pub fn new(column: StrColumn) -> Self {
        Self {
            column,
            ords: Vec::new(),
            buffer: Vec::new(),
        }
    }
}

fn load_term(column: &StrColumn, ord: u64, buffer: &mut Vec<u8>) -> io::Result<()> {
    buffer.clear();
    if !column.ord_to_bytes(ord, buffer)? {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("term ordinal {} missing from dictionary", ord),
        ));
    }
    Ok(())
}

impl ValueSource for FastFieldValues {
    type Cursor<'a> = FastFieldCursor<'a>;

    fn has_value(&self, doc: DocId) -> bool {
        self.column.ords().values_for_doc(doc).next().is_some()
    }

    fn is_multivalued(&self, doc: DocId) -> bool {
        self.column.ords().values_for_doc(doc).nth(1).is_some()
    }

    fn single_value(&mut self, doc: DocId) -> io::Result<HashedBytes<'_>> {
        let ord = self.column.ords().first(doc).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("doc {} has no value", doc))
        })?;
        load_term(&self.column, ord, &mut self.buffer)?;
        Ok(HashedBytes::new(&self.buffer))
    }

    fn values(&mut self, doc: DocId) -> io::Result<Self::Cursor<'_>> {
        self.ords.clear();
        self.ords.extend(self.column.ords().values_for_doc(doc));
        Ok(FastFieldCursor {
            column: &self.column,
            ords: self.ords.iter(),
            buffer: &mut self.buffer,
        })
    }
}

pub struct FastFieldCursor<'a> {
    column: &'a StrColumn,
    ords: std::slice::Iter<'a, u64>,
    buffer: &'a mut Vec<u8>,
}

impl ValueCursor for FastFieldCursor<'_> {
    fn next_value(&mut self) -> io::Result<Option<HashedBytes<'_>>> {
        let Some(&ord) = self.ords.next() else {
            return Ok(None);
        };
        load_term(self.column, ord, self.buffer)?;
        Ok(Some(HashedBytes::new(self.buffer.as_slice())))
    }
}

/// Values of an `f64` fast field.
#[derive(Clone)]
pub struct FastFieldNumbers {
    column: Column<f64>,
}

impl FastFieldNumbers {
    pub fn open(reader: &SegmentReader, field: &str) -> Result<Self> {
        let column = reader.fast_fields().f64(field)?;
        Ok(Self { column })
    }
}

impl NumericSource for FastFieldNumbers {
    fn values(&self, doc: DocId, out: &mut Vec<f64>) -> io::Result<()> {
        out.extend(self.column.values_for_doc(doc));
        Ok(())
    }
}
