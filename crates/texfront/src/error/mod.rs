//! Error handling.
//!
//! Every fallible operation returns [Result], whose error type is a boxed [Error].
//! Errors carry the token they are about; [TracedError] pairs an error with the
//! [SourceCodeTrace](crate::token::trace::SourceCodeTrace) of that token so it can be
//! displayed with the offending line of source code.

mod display;

use crate::codes::CodeKind;
use crate::token::{trace, CsNameInterner, Token};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// An error raised by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input ended in the middle of a construct.
    ///
    /// This is control flow rather than a fatal error: more input can be pushed
    /// and the construct retried.
    #[error("unexpected end of input while {doing}")]
    EndOfInput { doing: String },

    #[error("undefined control sequence {name}")]
    NoSuchControlSequence {
        token: Token,
        name: String,
        close_names: Vec<String>,
    },

    /// A code was looked up for a character that has no code, even globally.
    #[error("no {kind} is defined for the character {character:?}")]
    NotInScope { kind: CodeKind, character: char },

    #[error("{message}")]
    MalformedMacro { token: Token, message: String },

    #[error("expected {}, instead found {}", .0.expected, .0.got_description)]
    Syntax(Box<SyntaxError>),

    #[error("invalid character {character:?} in the input")]
    InvalidCharacter { character: char, key: trace::Key },

    #[error("{message}")]
    UnbalancedGroup {
        token: Option<Token>,
        message: String,
    },

    #[error("{message}")]
    Overflow {
        token: Option<Token>,
        message: String,
    },

    #[error("extra {name}")]
    ExtraConditionalToken { token: Token, name: String },

    /// The input ended while a conditional branch was being skipped (TeX.2021.336).
    #[error("incomplete {name}; all text was ignored after it")]
    IncompleteConditional { token: Token, name: String },

    #[error("could not read the file {path}")]
    Io {
        token: Token,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A token did not match the grammar.
#[derive(Debug)]
pub struct SyntaxError {
    pub expected: String,
    /// The offending token, or [None] if the input ended.
    pub got: Option<Token>,
    pub got_description: String,
    pub guidance: String,
}

impl Error {
    /// Builds a syntax error.
    pub fn syntax<S: Into<String>, T: Into<String>>(
        interner: &CsNameInterner,
        expected: S,
        got: Option<Token>,
        guidance: T,
    ) -> Box<Error> {
        let got_description = match got {
            None => "the end of the input".to_string(),
            Some(token) => token.describe(interner),
        };
        Box::new(Error::Syntax(Box::new(SyntaxError {
            expected: expected.into(),
            got,
            got_description,
            guidance: guidance.into(),
        })))
    }

    pub fn end_of_input<S: Into<String>>(doing: S) -> Box<Error> {
        Box::new(Error::EndOfInput {
            doing: doing.into(),
        })
    }

    pub fn unbalanced<S: Into<String>>(token: Option<Token>, message: S) -> Box<Error> {
        Box::new(Error::UnbalancedGroup {
            token,
            message: message.into(),
        })
    }

    pub fn overflow<S: Into<String>>(token: Option<Token>, message: S) -> Box<Error> {
        Box::new(Error::Overflow {
            token,
            message: message.into(),
        })
    }

    /// The token this error is about, if any.
    pub fn token(&self) -> Option<Token> {
        match self {
            Error::EndOfInput { .. } | Error::NotInScope { .. } => None,
            Error::NoSuchControlSequence { token, .. }
            | Error::MalformedMacro { token, .. }
            | Error::ExtraConditionalToken { token, .. }
            | Error::IncompleteConditional { token, .. }
            | Error::Io { token, .. } => Some(*token),
            Error::Syntax(err) => err.got,
            Error::Overflow { token, .. } | Error::UnbalancedGroup { token, .. } => *token,
            Error::InvalidCharacter { character, key } => Some(Token::new_other(*character, *key)),
        }
    }

    /// Whether this is a recoverable syntax error.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }

    pub fn is_end_of_input(&self) -> bool {
        match self {
            Error::EndOfInput { .. } => true,
            Error::Syntax(err) => err.got.is_none(),
            _ => false,
        }
    }

    /// Notes shown below the source code snippet.
    fn notes(&self) -> Vec<String> {
        match self {
            Error::NoSuchControlSequence { close_names, .. } if !close_names.is_empty() => {
                vec![format!["did you mean {}?", close_names.join(" or ")]]
            }
            Error::Syntax(err) if !err.guidance.is_empty() => vec![err.guidance.clone()],
            Error::EndOfInput { .. } => {
                vec!["more input can be provided and the command retried".to_string()]
            }
            _ => vec![],
        }
    }
}

/// An error together with the trace of the source code that caused it.
#[derive(Debug)]
pub struct TracedError {
    pub error: Box<Error>,
    pub trace: trace::SourceCodeTrace,
    pub notes: Vec<String>,
}

impl TracedError {
    /// Traces an error.
    ///
    /// Errors without a token of their own are traced to `fallback`,
    /// or to the end of the input if there is no fallback.
    pub fn new(
        error: Box<Error>,
        fallback: Option<Token>,
        tracer: &trace::Tracer,
        interner: &CsNameInterner,
    ) -> TracedError {
        let token = match *error {
            Error::EndOfInput { .. } => None,
            _ => error.token().or(fallback),
        };
        let trace = match token {
            None => tracer.trace_end_of_input(),
            Some(token) => tracer.trace(token, interner),
        };
        let notes = error.notes();
        TracedError {
            error,
            trace,
            notes,
        }
    }

    /// Adds a note to the error message.
    pub fn with_note<S: Into<String>>(mut self, note: S) -> TracedError {
        self.notes.push(note.into());
        self
    }
}

impl std::fmt::Display for TracedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display::format_error(f, self)
    }
}

impl std::error::Error for TracedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}
