//! Byte classification table.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub(crate) struct CharClass: u8 {
        /// Space, tab, newline, carriage return, form feed.
        const SPACE = 1 << 0;
        /// `+ > ~ |`
        const COMBINATOR = 1 << 1;
        /// Ends a word token.
        const WORD_DELIMITER = 1 << 2;
        const HEX = 1 << 3;
    }
}

const fn build_table() -> [CharClass; 256] {
    let mut table = [CharClass::empty(); 256];

    let spaces = [b' ', b'\t', b'\n', b'\r', 0x0c];
    let mut i = 0;
    while i < spaces.len() {
        table[spaces[i] as usize] = CharClass::SPACE.union(CharClass::WORD_DELIMITER);
        i += 1;
    }

    let combinators = [b'+', b'>', b'~', b'|'];
    i = 0;
    while i < combinators.len() {
        table[combinators[i] as usize] = CharClass::COMBINATOR.union(CharClass::WORD_DELIMITER);
        i += 1;
    }

    let delimiters = [
        b'&', b'*', b'!', b',', b':', b';', b'(', b')', b'[', b']', b'\'', b'"', b'=', b'$',
        b'^', b'/',
    ];
    i = 0;
    while i < delimiters.len() {
        table[delimiters[i] as usize] = CharClass::WORD_DELIMITER;
        i += 1;
    }

    let mut b = b'0';
    while b <= b'9' {
        table[b as usize] = CharClass::HEX;
        b += 1;
    }
    b = b'a';
    while b <= b'f' {
        table[b as usize] = CharClass::HEX;
        table[(b - 32) as usize] = CharClass::HEX;
        b += 1;
    }

    table
}

static TABLE: [CharClass; 256] = build_table();

#[inline]
pub(crate) fn class(b: u8) -> CharClass {
    TABLE[b as usize]
}

#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    class(b).contains(CharClass::SPACE)
}

#[inline]
pub(crate) fn is_combinator(b: u8) -> bool {
    class(b).contains(CharClass::COMBINATOR)
}

#[inline]
pub(crate) fn is_word_delimiter(b: u8) -> bool {
    class(b).contains(CharClass::WORD_DELIMITER)
}

#[inline]
pub(crate) fn is_hex(b: u8) -> bool {
    class(b).contains(CharClass::HEX)
}
