//! Commands emitted by the pipeline.
//!
//! A [Command] is the result of parsing one TeX command with all of its arguments.
//! Assignments and grouping commands are consumed by the executor; everything
//! else is handed to the caller, which is typically a typesetting engine.

use crate::font::{FontId, FontSize};
use crate::router::Route;
use crate::texmacro::Macro;
use crate::token::{CommandRef, Token};
use crate::variable::{DimensionVariable, GlueVariable, IntegerVariable, TokenListVariable, Variable};
use std::rc::Rc;
use texfront_core::{Glue, Scaled};

/// A horizontal or vertical list element direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoxKind {
    /// `\hbox`
    Horizontal,
    /// `\vbox`
    Vertical,
    /// `\vtop`
    VTop,
}

/// The `to` or `spread` specification of a box or alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoxSpec {
    #[default]
    Natural,
    To(Scaled),
    Spread(Scaled),
}

/// A box together with the commands inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct TexBox {
    pub kind: BoxKind,
    pub spec: BoxSpec,
    pub list: Vec<Command>,
}

/// Where the contents of a box command come from.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxSource {
    Built(TexBox),
    /// `\box` or `\copy`. The executor replaces this with the register contents.
    Register { index: usize, copy: bool },
}

/// A rule. Dimensions that were not specified are [None].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub direction: Direction,
    pub width: Option<Scaled>,
    pub height: Option<Scaled>,
    pub depth: Option<Scaled>,
}

/// An `\halign` or `\valign`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub direction: Direction,
    pub spec: BoxSpec,
    /// For each row, the commands of each cell.
    pub rows: Vec<Vec<Vec<Command>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Assignment(Assignment),
    BeginGroup,
    EndGroup,
    Character(char),
    Space,
    MathShift(char),
    Superscript(char),
    Subscript(char),
    Box(BoxSource),
    Rule(Rule),
    Glue(Direction, Glue),
    Kern(Scaled),
    Penalty(i32),
    /// `\message`, with its argument fully expanded.
    Message(String),
    /// `\write`, with its argument unexpanded.
    Write {
        stream: i32,
        tokens: Vec<Token>,
    },
    Accent(i32),
    Discretionary {
        pre_break: Vec<Command>,
        post_break: Vec<Command>,
        no_break: Vec<Command>,
    },
    DiscretionaryHyphen,
    Alignment(Alignment),
    Par,
    Indent,
    NoIndent,
    Relax,
    End,
    ControlSpace,
}

impl Command {
    /// Whether this command starts a paragraph when it appears in vertical mode.
    pub(crate) fn is_horizontal(&self) -> bool {
        matches!(
            self,
            Command::Character(_)
                | Command::Accent(_)
                | Command::Indent
                | Command::NoIndent
                | Command::Glue(Direction::Horizontal, _)
                | Command::Rule(Rule {
                    direction: Direction::Vertical,
                    ..
                })
                | Command::Discretionary { .. }
                | Command::DiscretionaryHyphen
                | Command::ControlSpace
                | Command::MathShift(_)
                | Command::Alignment(Alignment {
                    direction: Direction::Vertical,
                    ..
                })
        )
    }

    /// Whether this command ends a paragraph.
    pub(crate) fn is_vertical(&self) -> bool {
        matches!(
            self,
            Command::Par
                | Command::End
                | Command::Glue(Direction::Vertical, _)
                | Command::Rule(Rule {
                    direction: Direction::Horizontal,
                    ..
                })
                | Command::Alignment(Alignment {
                    direction: Direction::Horizontal,
                    ..
                })
        )
    }
}

/// An assignment, with the `\global` prefix resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub global: bool,
    pub kind: AssignmentKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentKind {
    Integer(IntegerVariable, i32),
    Dimension(DimensionVariable, Scaled),
    Glue(GlueVariable, Glue),
    TokenList(TokenListVariable, Vec<Token>),
    Arithmetic(Arithmetic),
    /// `\chardef` and friends.
    ShortHand {
        name: CommandRef,
        route: Route,
    },
    Macro {
        name: CommandRef,
        definition: Rc<Macro>,
        /// Set for `\gdef` and `\xdef`.
        force_global: bool,
    },
    /// `\let` and `\futurelet`.
    Let {
        name: CommandRef,
        target: Token,
    },
    Font {
        name: CommandRef,
        file: String,
        size: FontSize,
    },
    SelectFont(FontId),
    SetBox {
        index: usize,
        source: BoxSource,
    },
}

/// `\advance`, `\multiply` and `\divide`.
#[derive(Debug, Clone, PartialEq)]
pub enum Arithmetic {
    AdvanceInteger(IntegerVariable, i32),
    AdvanceDimension(DimensionVariable, Scaled),
    AdvanceGlue(GlueVariable, Glue),
    Multiply(Variable, i32),
    Divide(Variable, i32),
}
