//! Growable buffer with a single mutation: splice a region, get the new cursor.

use tracing::trace;

/// A caller-owned string being rewritten.
///
/// The only way to change the text is [`SpliceBuffer::splice`], which
/// returns the cursor to continue from, so no position is carried across a
/// mutation by accident.
#[derive(Debug)]
pub struct SpliceBuffer<'b> {
    buf: &'b mut String,
}

impl<'b> SpliceBuffer<'b> {
    /// Wrap `buf` for splicing.
    pub fn new(buf: &'b mut String) -> Self {
        Self { buf }
    }

    /// Current text.
    pub fn as_str(&self) -> &str {
        self.buf
    }

    /// Byte at `pos`, or `None` past the end.
    pub fn byte(&self, pos: usize) -> Option<u8> {
        self.buf.as_bytes().get(pos).copied()
    }

    /// Replace `[start, end)` with `replacement` and return the position just
    /// past the inserted text.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or not on `char` boundaries.
    pub fn splice(&mut self, start: usize, end: usize, replacement: &str) -> usize {
        self.buf.replace_range(start..end, replacement);
        trace!(start, end, inserted = replacement.len(), "spliced");
        start + replacement.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_grows_and_returns_cursor() {
        let mut s = String::from("key[a,b]");
        let mut buf = SpliceBuffer::new(&mut s);
        let cursor = buf.splice(4, 5, "xyz");
        assert_eq!(cursor, 7);
        assert_eq!(buf.byte(cursor), Some(b','));
        assert_eq!(buf.as_str(), "key[xyz,b]");
        assert_eq!(s, "key[xyz,b]");
    }

    #[test]
    fn splice_into_empty_region_inserts() {
        let mut s = String::from("[,]");
        let mut buf = SpliceBuffer::new(&mut s);
        let cursor = buf.splice(1, 1, "\"\"");
        assert_eq!(cursor, 3);
        assert_eq!(buf.as_str(), "[\"\",]");
        assert_eq!(buf.byte(4), Some(b']'));
    }

    #[test]
    fn splice_can_shrink() {
        let mut s = String::from("k[long]");
        let mut buf = SpliceBuffer::new(&mut s);
        assert_eq!(buf.splice(2, 6, "s"), 3);
        assert_eq!(buf.as_str(), "k[s]");
        assert_eq!(buf.byte(4), None);
    }
}
