//! Expandable primitives other than conditionals.

use super::Banisher;
use crate::error::{Error, Result};
use crate::instruction::Instruction;
use crate::parse::{self, InternalValue, Parsable};
use crate::primitive::Primitive;
use crate::router::Route;
use crate::state::parameters::IntegerParameter;
use crate::token::lexer;
use crate::token::trace::{self, Origin};
use crate::token::{CommandRef, Frozen, Token, Value};
use std::path::Path;
use texfront_stdext::collections::groupingmap::Scope;

impl Banisher {
    /// Expands a primitive.
    ///
    /// If the expansion fails, its trigger and every token it read are returned to the input
    /// so it can be retried. A conditional is only restored if its condition could not be read.
    pub(super) fn expand_primitive(&mut self, token: Token, p: Primitive) -> Result<()> {
        if let Err(err) = self.count_expansion(token) {
            self.unread(token);
            return Err(err);
        }
        log::trace!("expanding \\{}", p.name());
        // Tokens read by the primitive are not part of the command being parsed.
        let mark = self.mark();
        let result = match p {
            Primitive::ExpandAfter => self.expand_after(),
            Primitive::NoExpand => self.no_expand(),
            Primitive::CsName => self.cs_name(token),
            Primitive::String => self.string(),
            Primitive::Number => i32::parse(self).map(|n| {
                self.unread_all(string_to_tokens(&n.to_string(), token.trace_key()));
            }),
            Primitive::RomanNumeral => i32::parse(self).map(|n| {
                self.unread_all(string_to_tokens(&roman_numeral(n), token.trace_key()));
            }),
            Primitive::The => self.the(token).map(|tokens| self.unread_all(tokens)),
            Primitive::Input => self.input_file(token),
            Primitive::Else | Primitive::Or | Primitive::Fi => {
                let result = self.conditional_end(token, p);
                self.truncate_window(mark);
                return result;
            }
            _ => {
                let result = self.conditional_start(token, p, mark);
                self.truncate_window(mark);
                return result;
            }
        };
        match result {
            Ok(()) => self.truncate_window(mark),
            Err(_) => self.restore(token, mark),
        }
        result
    }

    /// Expands the token after the next one once.
    fn expand_after(&mut self) -> Result<()> {
        let first = self.next_raw_or_err("reading the first token after \\expandafter")?;
        let second = match self.next_raw()? {
            None => {
                self.unread(first);
                return Err(Error::end_of_input("reading the second token after \\expandafter"));
            }
            Some(second) => second,
        };
        let result = match self.state.router.classify(second) {
            Instruction::Macro(m) => self.expand_macro(second, &m),
            Instruction::Primitive(p) if p.is_expandable() => self.expand_primitive(second, p),
            _ => {
                self.unread(second);
                Ok(())
            }
        };
        self.unread(first);
        result
    }

    fn no_expand(&mut self) -> Result<()> {
        let next = self.next_raw_or_err("reading the token after \\noexpand")?;
        let expandable = match self.state.router.classify(next) {
            Instruction::Macro(_) => true,
            Instruction::Primitive(p) => p.is_expandable(),
            _ => false,
        };
        if expandable {
            self.protected.push(self.input.len());
        }
        self.unread(next);
        Ok(())
    }

    fn cs_name(&mut self, token: Token) -> Result<()> {
        let mut name = String::new();
        loop {
            let it = self.next_expanded_or_err("reading the name in \\csname")?;
            if it.token.command_ref().is_none() {
                if let Some(c) = it.token.char() {
                    name.push(c);
                }
                continue;
            }
            if let Instruction::Primitive(Primitive::EndCsName) = it.instruction {
                break;
            }
            let got = it.token;
            self.push_back(it);
            return Err(self.syntax_error(
                "a character or \\endcsname",
                Some(got),
                "the name built by \\csname can only contain characters",
            ));
        }
        let cs_name = lexer::intern(&mut self.interner, &name)?;
        let command_ref = CommandRef::ControlSequence(cs_name);
        if self.config.csname_defines_relax && self.state.router.lookup(command_ref).is_none() {
            self.state
                .router
                .set_route(command_ref, Route::Primitive(Primitive::Relax), Scope::Local);
        }
        self.unread(Token::new_control_sequence(cs_name, token.trace_key()));
        Ok(())
    }

    fn string(&mut self) -> Result<()> {
        let next = self.next_raw_or_err("reading the token after \\string")?;
        let s = match next.value() {
            Value::CommandRef(CommandRef::ActiveCharacter(c)) => c.to_string(),
            Value::CommandRef(CommandRef::ControlSequence(cs_name)) => {
                let mut s = self.escape_char().map(String::from).unwrap_or_default();
                s.push_str(self.interner.resolve(cs_name).unwrap_or_default());
                s
            }
            Value::CommandRef(CommandRef::Frozen(frozen)) => {
                let mut s = self.escape_char().map(String::from).unwrap_or_default();
                s.push_str(match frozen {
                    Frozen::Relax => "relax",
                    Frozen::EndTemplate => "endtemplate",
                });
                s
            }
            _ => next.char().map(String::from).unwrap_or_default(),
        };
        self.unread_all(string_to_tokens(&s, next.trace_key()));
        Ok(())
    }

    fn escape_char(&self) -> Option<char> {
        let raw = self.state.parameters.integer(IntegerParameter::EscapeChar);
        u32::try_from(raw).ok().and_then(char::from_u32)
    }

    /// Returns the tokens that `\the` expands to.
    pub(super) fn the(&mut self, token: Token) -> Result<Vec<Token>> {
        let it = self.next_expanded_or_err("reading the quantity after \\the")?;
        let value = match parse::internal_value(self, &it)? {
            Some(value) => value,
            None => {
                let got = it.token;
                self.push_back(it);
                return Err(self.syntax_error(
                    "an internal quantity after \\the",
                    Some(got),
                    "\\the can be applied to registers, parameters, codes, character constants and fonts",
                ));
            }
        };
        let key = token.trace_key();
        Ok(match value {
            InternalValue::Integer(n) => string_to_tokens(&n.to_string(), key),
            InternalValue::Dimension(d) => string_to_tokens(&d.to_string(), key),
            InternalValue::Glue(g) => string_to_tokens(&g.to_string(), key),
            InternalValue::TokenList(tokens) => tokens,
            InternalValue::Font(id) => {
                let identifier = self.state.fonts.get(id).and_then(|font| font.identifier);
                let command_ref = match identifier {
                    Some(command_ref) => command_ref,
                    None => CommandRef::ControlSequence(lexer::intern(&mut self.interner, "nullfont")?),
                };
                vec![Token::new_from_value(Value::CommandRef(command_ref), key)]
            }
        })
    }

    fn input_file(&mut self, token: Token) -> Result<()> {
        let name = self.read_file_name()?;
        let path = if Path::new(&name).extension().is_none() {
            format!["{name}.tex"]
        } else {
            name
        };
        match self.file_system.read_to_string(Path::new(&path)) {
            Ok(content) => {
                log::debug!("reading {path}");
                self.push_source(Origin::File(path.into()), &content);
                Ok(())
            }
            Err(source) => Err(Box::new(Error::Io {
                token,
                path,
                source,
            })),
        }
    }

    /// Reads a file name: expanded characters up to a space or a non-character.
    pub(crate) fn read_file_name(&mut self) -> Result<String> {
        let mut name = String::new();
        loop {
            let it = match self.next_expanded()? {
                None => break,
                Some(it) => it,
            };
            match it.token.value() {
                Value::Space(_) if name.is_empty() => {}
                Value::Space(_) => break,
                Value::CommandRef(_) => {
                    self.push_back(it);
                    break;
                }
                _ => {
                    if let Some(c) = it.token.char() {
                        name.push(c);
                    }
                }
            }
        }
        if name.is_empty() {
            return Err(self.syntax_error("a file name", None, ""));
        }
        Ok(name)
    }
}

/// Converts a string to tokens the way TeX does for `\string` and `\the`:
/// space characters become spaces and everything else is an other character.
pub(crate) fn string_to_tokens(s: &str, key: trace::Key) -> Vec<Token> {
    s.chars()
        .map(|c| {
            if c == ' ' {
                Token::new_space(c, key)
            } else {
                Token::new_other(c, key)
            }
        })
        .collect()
}

/// TeX.2021.69. Non-positive numbers produce the empty string.
fn roman_numeral(mut n: i32) -> String {
    const TABLE: [(i32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut s = String::new();
    for (value, numeral) in TABLE {
        while n >= value {
            s.push_str(numeral);
            n -= value;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roman_numerals() {
        assert_eq!(roman_numeral(1984), "mcmlxxxiv");
        assert_eq!(roman_numeral(4), "iv");
        assert_eq!(roman_numeral(0), "");
        assert_eq!(roman_numeral(-5), "");
    }
}
