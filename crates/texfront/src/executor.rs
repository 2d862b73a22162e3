//! The executor applies assignments and grouping commands to the state.
//!
//! Everything else is returned to the caller, after the executor has tracked the
//! mode changes the command implies: a character in vertical mode starts a paragraph,
//! and a vertical command in a paragraph ends it.

use crate::banisher::{Banisher, Mode};
use crate::command::{Arithmetic, Assignment, AssignmentKind, BoxSource, Command, TexBox};
use crate::error::{Error, Result};
use crate::font::NullFontMetrics;
use crate::router::Route;
use crate::variable::{IntegerVariable, Variable};
use std::rc::Rc;
use texfront_core::{Glue, GlueOrder, Scaled};

/// Executes a command.
///
/// Returns the command if it is to be handled by the caller.
pub fn execute(b: &mut Banisher, command: Command) -> Result<Option<Command>> {
    let command = match command {
        Command::Assignment(assignment) => {
            assign(b, assignment)?;
            return Ok(None);
        }
        Command::BeginGroup => {
            b.state.push_scope();
            return Ok(None);
        }
        Command::EndGroup => {
            b.state
                .pop_scope()
                .map_err(|_| Error::unbalanced(None, "there is no group to end"))?;
            return Ok(None);
        }
        Command::Relax => return Ok(None),
        Command::Space if b.mode().is_vertical() => return Ok(None),
        Command::Par => {
            return Ok(match b.mode() {
                Mode::Horizontal => {
                    b.end_paragraph();
                    Some(Command::Par)
                }
                _ => None,
            })
        }
        Command::Box(BoxSource::Register { index, copy }) => {
            match resolve_register(b, index, copy) {
                None => return Ok(None),
                Some(tex_box) => Command::Box(BoxSource::Built(tex_box)),
            }
        }
        command => command,
    };
    if b.mode().is_vertical() && command.is_horizontal() {
        b.start_paragraph();
    } else if b.mode() == Mode::Horizontal && command.is_vertical() {
        b.end_paragraph();
    }
    Ok(Some(command))
}

fn resolve_register(b: &mut Banisher, index: usize, copy: bool) -> Option<TexBox> {
    if copy {
        b.state.registers.get_box(index).cloned()
    } else {
        b.state.registers.take_box(index)
    }
}

fn assign(b: &mut Banisher, assignment: Assignment) -> Result<()> {
    let Assignment { global, kind } = assignment;
    let scope = b.state.scope(global);
    match kind {
        AssignmentKind::Integer(v, n) => set_integer(b, v, n, global)?,
        AssignmentKind::Dimension(v, d) => b.state.set_dimension(v, d, scope),
        AssignmentKind::Glue(v, g) => b.state.set_glue(v, g, scope),
        AssignmentKind::TokenList(v, tokens) => b.state.set_token_list(v, tokens, scope),
        AssignmentKind::Arithmetic(arithmetic) => apply_arithmetic(b, arithmetic, global)?,
        AssignmentKind::ShortHand { name, route } => b.state.router.set_route(name, route, scope),
        AssignmentKind::Macro {
            name,
            definition,
            force_global,
        } => {
            let scope = b.state.scope(global || force_global);
            b.state.router.define_macro(name, definition, scope);
        }
        AssignmentKind::Let { name, target } => {
            let route = match target.command_ref() {
                None => Route::Character(target.value()),
                Some(command_ref) => match b.state.router.lookup(command_ref) {
                    None => return Err(b.undefined_error(target)),
                    Some(route) => route,
                },
            };
            log::debug!(
                "let {} = {}",
                name.to_string(&b.interner),
                b.describe(target)
            );
            b.state.router.set_route(name, route, scope);
        }
        AssignmentKind::Font { name, file, size } => {
            let id = match b.state.fonts.reuse(name, &file, size) {
                Some(id) => id,
                None => {
                    let metrics = match b.font_loader.load(&file) {
                        Some(metrics) => metrics,
                        None => {
                            log::warn!("font {file} could not be loaded; using the metrics of \\nullfont");
                            Rc::new(NullFontMetrics)
                        }
                    };
                    b.state.fonts.define(name, file, size, metrics)
                }
            };
            b.state.router.set_route(name, Route::Font(id), scope);
        }
        AssignmentKind::SelectFont(id) => b.state.fonts.select(id, scope),
        AssignmentKind::SetBox { index, source } => {
            let value = match source {
                BoxSource::Built(tex_box) => Some(tex_box),
                BoxSource::Register { index, copy } => resolve_register(b, index, copy),
            };
            b.state.registers.set_box(index, value, scope);
        }
    }
    Ok(())
}

fn set_integer(b: &mut Banisher, v: IntegerVariable, n: i32, global: bool) -> Result<()> {
    if let IntegerVariable::Code(kind, c) = v {
        if n < kind.min_value() || n > kind.max_value() {
            return Err(Error::overflow(
                None,
                format![
                    "invalid code {n} for \\{kind}`{c}: the value must be between {} and {}",
                    kind.min_value(),
                    kind.max_value()
                ],
            ));
        }
    }
    let scope = b.state.scope(global);
    b.state.set_integer(v, n, scope);
    Ok(())
}

/// Arithmetic on the values of variables. TeX.2021.1236.
trait Number: Sized + Copy + std::fmt::Display {
    fn checked_add(lhs: Self, rhs: Self) -> Option<Self>;
    fn checked_mul(lhs: Self, rhs: i32) -> Option<Self>;
    fn checked_div(lhs: Self, rhs: i32) -> Option<Self>;
}

impl Number for i32 {
    fn checked_add(lhs: Self, rhs: Self) -> Option<Self> {
        lhs.checked_add(rhs)
    }
    fn checked_mul(lhs: Self, rhs: i32) -> Option<Self> {
        lhs.checked_mul(rhs)
    }
    fn checked_div(lhs: Self, rhs: i32) -> Option<Self> {
        lhs.checked_div(rhs)
    }
}

impl Number for Scaled {
    fn checked_add(lhs: Self, rhs: Self) -> Option<Self> {
        let sum = lhs.0.checked_add(rhs.0)?;
        if sum.abs() > Scaled::MAX_DIMEN.0 {
            return None;
        }
        Some(Scaled(sum))
    }
    fn checked_mul(lhs: Self, rhs: i32) -> Option<Self> {
        lhs.nx_plus_y(rhs, Scaled::ZERO).ok()
    }
    fn checked_div(lhs: Self, rhs: i32) -> Option<Self> {
        lhs.checked_div(rhs).ok()
    }
}

impl Number for Glue {
    /// TeX.2021.1239: a component of higher order replaces a component of lower order.
    fn checked_add(lhs: Self, rhs: Self) -> Option<Self> {
        let component = |a: Scaled, a_order: GlueOrder, b: Scaled, b_order: GlueOrder| {
            let a_order = if a == Scaled::ZERO { GlueOrder::Normal } else { a_order };
            let b_order = if b == Scaled::ZERO { GlueOrder::Normal } else { b_order };
            if a_order == b_order {
                let sum = Scaled::checked_add(a, b)?;
                let order = if sum == Scaled::ZERO { GlueOrder::Normal } else { a_order };
                Some((sum, order))
            } else if a_order < b_order {
                Some((b, b_order))
            } else {
                Some((a, a_order))
            }
        };
        let (stretch, stretch_order) =
            component(lhs.stretch, lhs.stretch_order, rhs.stretch, rhs.stretch_order)?;
        let (shrink, shrink_order) =
            component(lhs.shrink, lhs.shrink_order, rhs.shrink, rhs.shrink_order)?;
        Some(Glue {
            width: Scaled::checked_add(lhs.width, rhs.width)?,
            stretch,
            stretch_order,
            shrink,
            shrink_order,
        })
    }
    fn checked_mul(lhs: Self, rhs: i32) -> Option<Self> {
        Some(Glue {
            width: Scaled::checked_mul(lhs.width, rhs)?,
            stretch: Scaled::checked_mul(lhs.stretch, rhs)?,
            shrink: Scaled::checked_mul(lhs.shrink, rhs)?,
            ..lhs
        })
    }
    fn checked_div(lhs: Self, rhs: i32) -> Option<Self> {
        Some(Glue {
            width: <Scaled as Number>::checked_div(lhs.width, rhs)?,
            stretch: <Scaled as Number>::checked_div(lhs.stretch, rhs)?,
            shrink: <Scaled as Number>::checked_div(lhs.shrink, rhs)?,
            ..lhs
        })
    }
}

fn checked<N: Number>(
    result: Option<N>,
    op_name: &str,
    lhs: N,
    rhs: impl std::fmt::Display,
) -> Result<N> {
    result.ok_or_else(|| {
        Error::overflow(
            None,
            format!["arithmetic overflow in {op_name}: the left hand side is {lhs} and the right hand side is {rhs}"],
        )
    })
}

fn apply_arithmetic(b: &mut Banisher, arithmetic: Arithmetic, global: bool) -> Result<()> {
    let scope = b.state.scope(global);
    match arithmetic {
        Arithmetic::AdvanceInteger(v, n) => {
            let lhs = b.state.integer(v);
            let result = checked(i32::checked_add(lhs, n), "\\advance", lhs, n)?;
            set_integer(b, v, result, global)?;
        }
        Arithmetic::AdvanceDimension(v, d) => {
            let lhs = b.state.dimension(v);
            let result = checked(Number::checked_add(lhs, d), "\\advance", lhs, d)?;
            b.state.set_dimension(v, result, scope);
        }
        Arithmetic::AdvanceGlue(v, g) => {
            let lhs = b.state.glue(v);
            let result = checked(Number::checked_add(lhs, g), "\\advance", lhs, g)?;
            b.state.set_glue(v, result, scope);
        }
        Arithmetic::Multiply(v, n) => scale(b, v, n, global, "\\multiply")?,
        Arithmetic::Divide(v, n) => {
            if n == 0 {
                return Err(Error::overflow(
                    None,
                    "arithmetic overflow in \\divide: division by zero",
                ));
            }
            scale(b, v, n, global, "\\divide")?
        }
    }
    Ok(())
}

fn scale_number<N: Number>(lhs: N, n: i32, op_name: &str) -> Result<N> {
    let result = match op_name {
        "\\divide" => N::checked_div(lhs, n),
        _ => N::checked_mul(lhs, n),
    };
    checked(result, op_name, lhs, n)
}

/// Applies `\multiply` or `\divide`.
fn scale(b: &mut Banisher, v: Variable, n: i32, global: bool, op_name: &str) -> Result<()> {
    let scope = b.state.scope(global);
    match v {
        Variable::Integer(v) => {
            let result = scale_number(b.state.integer(v), n, op_name)?;
            set_integer(b, v, result, global)?;
        }
        Variable::Dimension(v) => {
            let result = scale_number(b.state.dimension(v), n, op_name)?;
            b.state.set_dimension(v, result, scope);
        }
        Variable::Glue(v) => {
            let result = scale_number(b.state.glue(v), n, op_name)?;
            b.state.set_glue(v, result, scope);
        }
        Variable::TokenList(_) => {
            return Err(Error::overflow(
                None,
                format!["{op_name} cannot be applied to a token list"],
            ))
        }
    }
    Ok(())
}
