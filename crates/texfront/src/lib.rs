//! # Texfront: the front end of a TeX engine.
//!
//! This crate turns TeX source code into a stream of fully resolved [Command]s.
//! Lexing, macro expansion, conditionals and the parsing of command arguments all happen
//! here; assignments are applied to the scoped [state::State] by the [executor].
//! What is left over (characters, glue, boxes, rules and so on) is handed to the caller,
//! which is typically a typesetting engine.
//!
//! The simplest entry point is the [Engine].

extern crate texfront_stdext;

pub mod banisher;
pub mod codes;
pub mod command;
pub mod config;
mod engine;
pub mod error;
pub mod executor;
pub mod filesystem;
pub mod font;
pub mod instruction;
pub mod parse;
pub mod primitive;
pub mod router;
pub mod state;
pub mod texmacro;
pub mod token;
pub mod variable;

#[cfg(test)]
mod testing;

pub use command::Command;
pub use config::Config;
pub use engine::Engine;
pub use error::{Error, Result, TracedError};
