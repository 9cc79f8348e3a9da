//! Byte cursor over the selector source.
//!
//! Reads past the end return `0x00`, which no classification predicate
//! accepts, so scanning loops stop at EOF without extra checks.

#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Cursor {
            buf: source.as_bytes(),
            pos: 0,
        }
    }

    /// Byte at the current position, or `0x00` at EOF.
    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.buf.get(self.pos).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.buf.get(self.pos + 1).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    #[inline]
    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Advance past one UTF-8 character.
    #[inline]
    pub(crate) fn advance_char(&mut self) {
        let width = match self.current() {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        self.set_pos(self.pos + width);
    }

    /// Bytes from the current position to the end.
    #[inline]
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos.min(self.buf.len())..]
    }
}
