//! The banisher: expansion and aggregation.
//!
//! The banisher sits between the lexer and the parser. It offers two views of the input:
//!
//! - [Banisher::next_expanded] returns the next unexpandable instruction, expanding
//!   macros, conditionals and the other expandable primitives on the way.
//!   This is the view used while reading the arguments of a command.
//!
//! - [Banisher::next_terminal] is used at the start of each command. On top of expansion it
//!   packages definitions, `\let` and balanced texts into single aggregate instructions,
//!   runs nested pipelines for boxes, and tracks the syntactic groups that decide which
//!   end group character closes what.
//!
//! Tokens flow through three layers, read in this order: instructions pushed back by the
//! parser, raw tokens produced by expansion, and finally the lexer.
//! Every instruction returned to the parser is also recorded in the current parse window
//! so that a failed optional continuation can be rewound.

mod conditional;
mod definition;
mod expansion;
mod pipeline;

use crate::command::{BoxKind, Direction};
use crate::config::Config;
use crate::error::{Error, Result, TracedError};
use crate::filesystem::{FileSystem, RealFileSystem};
use crate::font::{FontLoader, NullFontLoader};
use crate::instruction::{self, Instruction, InstructionToken};
use crate::primitive::Primitive;
use crate::state::parameters::IntegerParameter;
use crate::state::State;
use crate::texmacro::{Macro, TokenSource};
use crate::token::lexer::Lexer;
use crate::token::trace::{self, Origin, Tracer};
use crate::token::{CommandRef, CsNameInterner, Token, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// What the banisher is waiting for at the start of the next terminal instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    Normal,
    /// A braced text, returned as [Instruction::BalancedText].
    AwaitingBalancedText { expanded: bool },
    /// A braced text or a token list variable, as after `\toks0=`.
    AwaitingBalancedTextOrVariable,
    /// The `{` that starts a box or similar nested list.
    AwaitingBoxStart(SubPipeline),
}

/// A nested list that is built by its own run of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPipeline {
    Box(BoxKind),
    Discretionary,
    AlignCell(Direction),
}

impl SubPipeline {
    fn mode(&self) -> Mode {
        match self {
            SubPipeline::Box(BoxKind::Horizontal)
            | SubPipeline::Discretionary
            | SubPipeline::AlignCell(Direction::Horizontal) => Mode::RestrictedHorizontal,
            SubPipeline::Box(_) | SubPipeline::AlignCell(Direction::Vertical) => {
                Mode::InternalVertical
            }
        }
    }
}

impl std::fmt::Display for SubPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubPipeline::Box(BoxKind::Horizontal) => "hbox",
            SubPipeline::Box(BoxKind::Vertical) => "vbox",
            SubPipeline::Box(BoxKind::VTop) => "vtop",
            SubPipeline::Discretionary => "discretionary",
            SubPipeline::AlignCell(_) => "alignment cell",
        };
        write!(f, "{s}")
    }
}

/// A syntactic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Opened by `{`.
    Plain,
    /// Opened by `\begingroup`.
    SemiSimple,
    SubPipeline(SubPipeline),
}

/// TeX's modes, minus math. Math shift characters are passed through to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Vertical,
    /// Building a paragraph.
    Horizontal,
    InternalVertical,
    RestrictedHorizontal,
}

impl Mode {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Mode::Vertical | Mode::InternalVertical)
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Mode::Horizontal | Mode::RestrictedHorizontal)
    }

    pub fn is_inner(&self) -> bool {
        matches!(self, Mode::InternalVertical | Mode::RestrictedHorizontal)
    }
}

pub struct Banisher {
    pub state: State,
    pub interner: CsNameInterner,
    pub tracer: Tracer,
    pub config: Config,
    lexer: Lexer,
    input: Vec<Token>,
    pushback: Vec<InstructionToken>,
    // Indices in the input stack of tokens protected by \noexpand, in increasing order.
    protected: Vec<usize>,
    contexts: Vec<ContextMode>,
    conditionals: Vec<conditional::Conditional>,
    groups: Vec<GroupKind>,
    modes: Vec<Mode>,
    windows: Vec<Vec<InstructionToken>>,
    consecutive_expansions: usize,
    ancestry: HashMap<trace::Key, Token>,
    last_token: Option<Token>,
    pub(crate) font_loader: Box<dyn FontLoader>,
    file_system: Box<dyn FileSystem>,
}

impl Banisher {
    pub fn new(config: Config) -> Banisher {
        let mut interner = CsNameInterner::default();
        let state = State::new(&config, &mut interner);
        Banisher {
            state,
            interner,
            tracer: Default::default(),
            config,
            lexer: Default::default(),
            input: vec![],
            pushback: vec![],
            protected: vec![],
            contexts: vec![ContextMode::Normal],
            conditionals: vec![],
            groups: vec![],
            modes: vec![Mode::Vertical],
            windows: vec![vec![]],
            consecutive_expansions: 0,
            ancestry: Default::default(),
            last_token: None,
            font_loader: Box::new(NullFontLoader),
            file_system: Box::new(RealFileSystem),
        }
    }

    pub fn set_font_loader(&mut self, font_loader: Box<dyn FontLoader>) {
        self.font_loader = font_loader;
    }

    pub fn set_file_system(&mut self, file_system: Box<dyn FileSystem>) {
        self.file_system = file_system;
    }

    /// Inserts source code at the current read position of the lexer.
    pub fn push_source(&mut self, origin: Origin, content: &str) {
        let keys = self.tracer.register_source_code(origin, content);
        self.lexer.push_source(content, keys);
    }

    /// Returns the next token without expanding it.
    pub fn next_raw(&mut self) -> Result<Option<Token>> {
        Ok(self.next_raw_with_protection()?.map(|(token, _)| token))
    }

    // The boolean is true if the token was protected by \noexpand.
    fn next_raw_with_protection(&mut self) -> Result<Option<(Token, bool)>> {
        if let Some(it) = self.pushback.pop() {
            let protected = matches!(it.instruction, Instruction::NoExpand);
            return Ok(Some((it.token, protected)));
        }
        if let Some(token) = self.input.pop() {
            let protected = self.protected.last() == Some(&self.input.len());
            if protected {
                self.protected.pop();
            }
            return Ok(Some((token, protected)));
        }
        let end_line_char = self
            .state
            .parameters
            .integer(IntegerParameter::EndLineChar);
        let token = self
            .lexer
            .next(&self.state.codes, end_line_char, &mut self.interner)?;
        Ok(token.map(|token| (token, false)))
    }

    /// Puts a raw token back at the front of the input.
    pub(crate) fn unread(&mut self, token: Token) {
        self.input.push(token);
    }

    /// Puts raw tokens at the front of the input, so that the first token is read next.
    pub(crate) fn unread_all(&mut self, tokens: Vec<Token>) {
        self.input.extend(tokens.into_iter().rev());
    }

    /// Returns the next unexpandable instruction.
    pub fn next_expanded(&mut self) -> Result<Option<InstructionToken>> {
        loop {
            if let Some(it) = self.pushback.pop() {
                if self.still_means(&it) {
                    return Ok(Some(self.record(it)));
                }
                // An assignment changed the meaning of the token after it was read.
                self.unread(it.token);
                continue;
            }
            let (token, protected) = match self.next_raw_with_protection()? {
                None => return Ok(None),
                Some(next) => next,
            };
            if protected {
                return Ok(Some(
                    self.record(InstructionToken::new(Instruction::NoExpand, token)),
                ));
            }
            match self.state.router.classify(token) {
                Instruction::Macro(m) => self.expand_macro(token, &m)?,
                Instruction::Primitive(p) if p.is_expandable() => self.expand_primitive(token, p)?,
                Instruction::Undefined => {
                    self.unread(token);
                    return Err(self.undefined_error(token));
                }
                instruction => {
                    self.consecutive_expansions = 0;
                    return Ok(Some(self.record(InstructionToken::new(instruction, token))));
                }
            }
        }
    }

    fn still_means(&self, it: &InstructionToken) -> bool {
        match &it.instruction {
            Instruction::NoExpand
            | Instruction::EndTemplate
            | Instruction::BalancedText(_)
            | Instruction::BoxContents(_)
            | Instruction::MacroDefinition(_)
            | Instruction::LetTarget(_)
            | Instruction::EndOfSubPipeline => true,
            other => instruction::same_meaning(other, &self.state.router.classify(it.token)),
        }
    }

    /// Returns the next unexpandable instruction, or an end of input error.
    pub fn next_expanded_or_err(&mut self, doing: &str) -> Result<InstructionToken> {
        match self.next_expanded()? {
            None => Err(Error::end_of_input(doing)),
            Some(it) => Ok(it),
        }
    }

    /// Returns the next instruction at the start of a command.
    pub fn next_terminal(&mut self) -> Result<Option<InstructionToken>> {
        loop {
            let it = match self.next_expanded()? {
                None => return Ok(None),
                Some(it) => it,
            };
            let context = self.contexts.last().copied().unwrap_or(ContextMode::Normal);
            if context != ContextMode::Normal {
                let is_begin_group = matches!(it.instruction, Instruction::Character(Value::BeginGroup(_)));
                let is_filler = matches!(
                    it.instruction,
                    Instruction::Character(Value::Space(_))
                        | Instruction::Primitive(Primitive::Relax)
                        | Instruction::NoExpand
                );
                if is_filler {
                    continue;
                }
                self.contexts.pop();
                if !is_begin_group {
                    return Ok(Some(it));
                }
                self.forget_recorded();
                let aggregate = match context {
                    ContextMode::AwaitingBalancedText { expanded: true } => {
                        Instruction::BalancedText(self.read_expanded_balanced()?)
                    }
                    ContextMode::AwaitingBalancedText { expanded: false }
                    | ContextMode::AwaitingBalancedTextOrVariable => match self.read_balanced_raw() {
                        Ok(text) => Instruction::BalancedText(text),
                        Err(err) => {
                            self.unread(it.token);
                            self.contexts.push(context);
                            return Err(err);
                        }
                    },
                    ContextMode::AwaitingBoxStart(kind) => {
                        Instruction::BoxContents(self.run_sub_pipeline(kind)?)
                    }
                    ContextMode::Normal => it.instruction,
                };
                return Ok(Some(self.record(InstructionToken::new(aggregate, it.token))));
            }
            match &it.instruction {
                Instruction::Primitive(p @ (Primitive::Def | Primitive::GDef | Primitive::EDef | Primitive::XDef)) => {
                    let p = *p;
                    self.forget_recorded();
                    let aggregate = self.read_definition(it.token, p)?;
                    return Ok(Some(self.record(aggregate)));
                }
                Instruction::Primitive(p @ (Primitive::Let | Primitive::FutureLet)) => {
                    let future = *p == Primitive::FutureLet;
                    self.forget_recorded();
                    let aggregate = self.read_let(it.token, future)?;
                    return Ok(Some(self.record(aggregate)));
                }
                Instruction::Primitive(p @ (Primitive::Uppercase | Primitive::Lowercase)) => {
                    let upper = *p == Primitive::Uppercase;
                    self.forget_recorded();
                    self.shift_case(it.token, upper)?;
                    continue;
                }
                Instruction::Character(Value::BeginGroup(_)) => {
                    self.groups.push(GroupKind::Plain);
                }
                Instruction::Primitive(Primitive::BeginGroup) => {
                    self.groups.push(GroupKind::SemiSimple);
                }
                Instruction::Character(Value::EndGroup(_)) => match self.groups.last().copied() {
                    Some(GroupKind::Plain) => {
                        self.groups.pop();
                    }
                    Some(GroupKind::SubPipeline(SubPipeline::AlignCell(_)))
                    | Some(GroupKind::SemiSimple)
                    | None => {
                        return Err(Error::unbalanced(Some(it.token), "there is no group to end"));
                    }
                    Some(GroupKind::SubPipeline(_)) => {
                        self.forget_recorded();
                        return Ok(Some(InstructionToken::new(
                            Instruction::EndOfSubPipeline,
                            it.token,
                        )));
                    }
                },
                Instruction::Primitive(Primitive::EndGroup) => {
                    if self.groups.last() != Some(&GroupKind::SemiSimple) {
                        return Err(Error::unbalanced(
                            Some(it.token),
                            "\\endgroup does not match a \\begingroup",
                        ));
                    }
                    self.groups.pop();
                }
                Instruction::EndTemplate => match self.groups.last().copied() {
                    Some(GroupKind::SubPipeline(SubPipeline::AlignCell(_))) => {
                        self.forget_recorded();
                        return Ok(Some(InstructionToken::new(
                            Instruction::EndOfSubPipeline,
                            it.token,
                        )));
                    }
                    _ => {
                        return Err(Error::unbalanced(
                            Some(it.token),
                            "an alignment cell ended inside an unclosed group",
                        ));
                    }
                },
                _ => {}
            }
            return Ok(Some(it));
        }
    }

    /// Returns an instruction to the front of the input.
    ///
    /// Instructions must be pushed back in the reverse order they were read.
    pub fn push_back(&mut self, it: InstructionToken) {
        if let Some(window) = self.windows.last_mut() {
            window.pop();
        }
        self.pushback.push(it);
    }

    fn record(&mut self, it: InstructionToken) -> InstructionToken {
        self.last_token = Some(it.token);
        if let Some(window) = self.windows.last_mut() {
            window.push(it.clone());
        }
        it
    }

    // Removes the last recorded instruction, which is being replaced by an aggregate.
    fn forget_recorded(&mut self) {
        if let Some(window) = self.windows.last_mut() {
            window.pop();
        }
    }

    fn truncate_window(&mut self, mark: usize) {
        if let Some(window) = self.windows.last_mut() {
            window.truncate(mark);
        }
    }

    /// Position in the current parse window, for later use with [Banisher::rewind].
    pub(crate) fn mark(&self) -> usize {
        self.windows.last().map(Vec::len).unwrap_or_default()
    }

    /// Returns every instruction read since the mark to the input.
    pub(crate) fn rewind(&mut self, mark: usize) {
        let tail = match self.windows.last_mut() {
            None => return,
            Some(window) if window.len() <= mark => return,
            Some(window) => window.split_off(mark),
        };
        self.pushback.extend(tail.into_iter().rev());
    }

    /// Returns a failed expansion to the input so that it can be retried: first its trigger,
    /// then everything read since the mark.
    fn restore(&mut self, trigger: Token, mark: usize) {
        let mut read = match self.windows.last_mut() {
            Some(window) if window.len() > mark => window.split_off(mark),
            _ => vec![],
        };
        // Pushed back instructions were read after the ones still in the window.
        while let Some(it) = self.pushback.pop() {
            read.push(it);
        }
        for it in read.into_iter().rev() {
            self.unread_instruction(it);
        }
        self.unread(trigger);
    }

    /// Returns an instruction to the raw input, keeping its `\noexpand` protection.
    fn unread_instruction(&mut self, it: InstructionToken) {
        if let Instruction::NoExpand = it.instruction {
            self.protected.push(self.input.len());
        }
        self.unread(it.token);
    }

    /// Forgets the instructions recorded for the previous command.
    pub(crate) fn clear_window(&mut self) {
        if let Some(window) = self.windows.last_mut() {
            window.clear();
        }
    }

    pub(crate) fn set_context(&mut self, context: ContextMode) {
        self.contexts.push(context);
    }

    /// Removes a context that was set but not consumed because of an error.
    pub(crate) fn reset_context(&mut self, len: usize) {
        self.contexts.truncate(len.max(1));
    }

    pub(crate) fn num_contexts(&self) -> usize {
        self.contexts.len()
    }

    pub fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Vertical)
    }

    pub(crate) fn start_paragraph(&mut self) {
        log::trace!("starting a paragraph");
        self.modes.push(Mode::Horizontal);
    }

    pub(crate) fn end_paragraph(&mut self) {
        if self.mode() == Mode::Horizontal && self.modes.len() > 1 {
            self.modes.pop();
        }
    }

    /// Number of open syntactic groups.
    pub fn group_depth(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn describe(&self, token: Token) -> String {
        match token.command_ref() {
            Some(command_ref) => command_ref.to_string(&self.interner),
            None => token.describe(&self.interner),
        }
    }

    pub(crate) fn syntax_error(&self, expected: &str, got: Option<Token>, guidance: &str) -> Box<Error> {
        Error::syntax(&self.interner, expected, got, guidance)
    }

    pub(crate) fn undefined_error(&self, token: Token) -> Box<Error> {
        let close_names = match token.command_ref() {
            Some(CommandRef::ControlSequence(cs_name)) => match self.interner.resolve(cs_name) {
                None => vec![],
                Some(name) => self.state.router.close_names(name, &self.interner),
            },
            _ => vec![],
        };
        Box::new(Error::NoSuchControlSequence {
            token,
            name: self.describe(token),
            close_names,
        })
    }

    fn count_expansion(&mut self, token: Token) -> Result<()> {
        self.consecutive_expansions += 1;
        if self.consecutive_expansions > self.config.max_expansion_depth {
            self.consecutive_expansions = 0;
            return Err(Error::overflow(
                Some(token),
                format![
                    "more than {} expansions without producing a command; is there an infinite loop?",
                    self.config.max_expansion_depth
                ],
            ));
        }
        Ok(())
    }

    /// Expands a macro, pushing its replacement text onto the input.
    ///
    /// If the arguments cannot be read, every token consumed is returned to the input
    /// so the call can be retried.
    pub(crate) fn expand_macro(&mut self, token: Token, m: &Rc<Macro>) -> Result<()> {
        if let Err(err) = self.count_expansion(token) {
            self.unread(token);
            return Err(err);
        }
        let mut consumed = vec![];
        let result = m.read_arguments(
            token,
            &mut Recorder {
                banisher: self,
                consumed: &mut consumed,
            },
        );
        let arguments = match result {
            Ok(arguments) => arguments,
            Err(err) => {
                self.unread_all(consumed);
                self.unread(token);
                return Err(err);
            }
        };
        let output = m.substitute(&arguments);
        log::trace!(
            "expanded {} into {} tokens",
            self.describe(token),
            output.len()
        );
        if self.config.trace_expansions {
            for t in &output {
                self.ancestry.insert(t.trace_key(), token);
            }
        }
        self.unread_all(output);
        Ok(())
    }

    /// Traces an error to the source code that caused it.
    pub fn trace_error(&self, error: Box<Error>) -> TracedError {
        let token = error.token();
        let traced = TracedError::new(error, self.last_token, &self.tracer, &self.interner);
        let parent = token.and_then(|token| self.ancestry.get(&token.trace_key()).copied());
        match parent {
            None => traced,
            Some(parent) => {
                let trace = self.tracer.trace(parent, &self.interner);
                traced.with_note(format![
                    "the token was produced by expanding {} on line {}",
                    self.describe(parent),
                    trace.line_number
                ])
            }
        }
    }
}

/// Reads raw tokens for a macro call, remembering them so they can be returned on failure.
struct Recorder<'a> {
    banisher: &'a mut Banisher,
    consumed: &'a mut Vec<Token>,
}

impl TokenSource for Recorder<'_> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        let token = self.banisher.next_raw()?;
        if let Some(token) = token {
            self.consumed.push(token);
        }
        Ok(token)
    }

    fn interner(&self) -> &CsNameInterner {
        &self.banisher.interner
    }
}

#[cfg(test)]
mod tests;
