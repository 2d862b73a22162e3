//! The character reader that feeds the lexer.
//!
//! The reader is a stack of sources.
//! Characters are read from the top source; when it is exhausted it is popped
//! and reading continues in the source below.
//! Pushing a source inserts it at the current read position, which is how
//! file inclusion works.

use super::trace;

#[derive(Debug)]
struct Source {
    chars: Vec<char>,
    pos: usize,
    keys: trace::KeyRange,
}

/// A stack of character sources.
#[derive(Debug, Default)]
pub struct Reader {
    sources: Vec<Source>,
}

impl Reader {
    /// Inserts a source at the current read position.
    ///
    /// A last line without a trailing newline gets one, so every line ends
    /// with the end of line character.
    pub fn push_source(&mut self, content: &str, keys: trace::KeyRange) {
        let mut chars: Vec<char> = content.chars().collect();
        if chars.last().is_some_and(|c| *c != '\n') {
            chars.push('\n');
        }
        self.sources.push(Source {
            chars,
            pos: 0,
            keys,
        });
    }

    fn current(&mut self) -> Option<&mut Source> {
        while let Some(source) = self.sources.last() {
            if source.pos < source.chars.len() {
                break;
            }
            self.sources.pop();
        }
        self.sources.last_mut()
    }

    /// Returns the next character without consuming it.
    pub fn peek(&mut self) -> Option<(char, trace::Key)> {
        let source = self.current()?;
        let c = *source.chars.get(source.pos)?;
        Some((c, source.keys.key(source.pos)))
    }

    /// Returns the character `offset` positions after the next one in the current source.
    pub fn peek_ahead(&mut self, offset: usize) -> Option<char> {
        let source = self.current()?;
        source.chars.get(source.pos + offset).copied()
    }

    /// Consumes the next character.
    pub fn advance(&mut self) {
        if let Some(source) = self.current() {
            source.pos += 1;
        }
    }

    /// Consumes characters up to and including the next newline of the current source.
    pub fn skip_line(&mut self) {
        if let Some(source) = self.current() {
            while let Some(c) = source.chars.get(source.pos) {
                source.pos += 1;
                if *c == '\n' {
                    break;
                }
            }
        }
    }

    /// Decodes a superscript trio starting at the next character, if there is one.
    ///
    /// The caller has checked that the next character has the superscript category.
    /// The trio `^^xy` with two lowercase hexadecimal digits is replaced by the character
    /// with code `0xxy`; otherwise `^^c` is replaced by `c` plus or minus 64.
    /// The replacement becomes the next character so that it can itself start a trio.
    /// Returns whether a replacement was made.
    pub fn decode_trio(&mut self) -> bool {
        let source = match self.current() {
            None => return false,
            Some(source) => source,
        };
        let at = |i: usize| source.chars.get(source.pos + i).copied();
        let (first, second, third) = match (at(0), at(1), at(2)) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return false,
        };
        if first != second || third == '\n' {
            return false;
        }
        let (consumed, replacement) = match (hex_digit(third), at(3).and_then(hex_digit)) {
            (Some(high), Some(low)) => (3, char::from(high * 16 + low)),
            _ => {
                let u = third as u32;
                let replacement = match u {
                    0x00..=0x3F => u + 0x40,
                    0x40..=0x7F => u - 0x40,
                    _ => return false,
                };
                match char::from_u32(replacement) {
                    None => return false,
                    Some(c) => (2, c),
                }
            }
        };
        source.pos += consumed;
        source.chars[source.pos] = replacement;
        true
    }
}

fn hex_digit(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'a'..='f' => Some(c as u8 - b'a' + 10),
        _ => None,
    }
}
