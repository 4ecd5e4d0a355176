//! Content streams of a page
//!
//! A page owns one or more ordered content streams; exactly one of them is
//! "current" and receives everything the page builder emits.

use crate::errors::{Error, Result};
use crate::ops::Op;

/// An ordered list of operations
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContentStream {
    ops: Vec<Op>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn extend<I: IntoIterator<Item = Op>>(&mut self, ops: I) {
        self.ops.extend(ops);
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// The content streams of one page. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContents {
    streams: Vec<ContentStream>,
    current: usize,
}

impl Default for PageContents {
    fn default() -> Self {
        Self {
            streams: vec![ContentStream::new()],
            current: 0,
        }
    }
}

impl PageContents {
    pub fn count(&self) -> usize {
        self.streams.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &ContentStream {
        &self.streams[self.current]
    }

    pub fn current_mut(&mut self) -> &mut ContentStream {
        &mut self.streams[self.current]
    }

    pub fn streams(&self) -> &[ContentStream] {
        &self.streams
    }

    /// Inserts an empty stream before the current one and selects it
    pub fn new_stream_before(&mut self) -> usize {
        self.streams.insert(self.current, ContentStream::new());
        self.current
    }

    /// Inserts an empty stream after the current one and selects it
    pub fn new_stream_after(&mut self) -> usize {
        self.current += 1;
        self.streams.insert(self.current, ContentStream::new());
        self.current
    }

    pub fn select(&mut self, index: isize) -> Result<()> {
        if index < 0 || index as usize >= self.streams.len() {
            return Err(Error::index_out_of_range(
                "content stream",
                index as i64,
                self.streams.len(),
            ));
        }
        log::trace!("selecting content stream {index} of {}", self.streams.len());
        self.current = index as usize;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_streams_are_selected() {
        let mut c = PageContents::default();
        c.current_mut().push(Op::StrokePath);

        assert_eq!(c.new_stream_after(), 1);
        assert!(c.current().is_empty());
        assert_eq!(c.new_stream_before(), 1);
        assert_eq!(c.count(), 3);
        assert_eq!(c.streams()[0].ops(), &[Op::StrokePath]);
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut c = PageContents::default();
        c.new_stream_after();
        assert!(c.select(-1).is_err());
        assert!(c.select(2).is_err());
        assert_eq!(c.current_index(), 1);
        c.select(0).unwrap();
        assert_eq!(c.current_index(), 0);
    }
}
