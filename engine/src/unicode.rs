//! Minimal Unicode classification used by the lexer.
//!
//! A from-scratch ID_Start/ID_Continue table is out of scope for a `no_std`
//! engine with no external Unicode data crate; `char`'s own classification
//! methods (baked into `core`, not `std`) stand in for the real tables. This
//! is close enough for every identifier a test or embedder is likely to
//! throw at the engine, though it is not byte-for-byte UAX #31.

/// Can this code point start an identifier?
pub fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

/// Can this code point continue an identifier after the first?
pub fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric()
}

/// ECMAScript `WhiteSpace` production (subset: the common cases).
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}') || (ch.is_whitespace() && !is_line_terminator(ch))
}

/// ECMAScript `LineTerminator` production.
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
