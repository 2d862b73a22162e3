//! Parsing commands.
//!
//! [parse_command] reads one complete command, with all of its arguments, from the
//! terminal instruction stream. Macro definitions, `\let` and the contents of boxes
//! arrive here already packaged by the banisher.

use super::{keyword, optional_continuation, optional_equals, parse_variable, Parsable};
use crate::banisher::{Banisher, ContextMode, SubPipeline};
use crate::command::{
    Arithmetic, Assignment, AssignmentKind, BoxKind, BoxSource, BoxSpec, Command, Direction, Rule,
    TexBox,
};
use crate::error::{Error, Result};
use crate::font::{FontId, FontSize};
use crate::instruction::{Instruction, InstructionToken};
use crate::primitive::Primitive;
use crate::router::Route;
use crate::state::registers::RegisterKind;
use crate::token::{write_tokens, CommandRef, Token, Value};
use crate::variable::Variable;
use texfront_core::{Glue, GlueOrder, Scaled};

/// The result of parsing at the start of a command.
#[derive(Debug)]
pub enum Step {
    Command(Command),
    /// The end group character that closes the current nested list.
    EndOfSubPipeline,
    EndOfInput,
}

/// Parses the next command.
pub fn parse_command(b: &mut Banisher) -> Result<Step> {
    let mut global = false;
    let mut prefix: Option<Token> = None;
    loop {
        let it = match b.next_terminal()? {
            None => {
                return match prefix {
                    None => Ok(Step::EndOfInput),
                    Some(_) => Err(Error::end_of_input("reading the assignment after a prefix")),
                }
            }
            Some(it) => it,
        };
        match it.instruction {
            Instruction::Primitive(p @ (Primitive::Global | Primitive::Long | Primitive::Outer)) => {
                global |= p == Primitive::Global;
                prefix = Some(it.token);
                continue;
            }
            Instruction::Character(Value::Space(_))
            | Instruction::Primitive(Primitive::Relax)
            | Instruction::NoExpand
                if prefix.is_some() =>
            {
                continue;
            }
            Instruction::EndOfSubPipeline if prefix.is_none() => return Ok(Step::EndOfSubPipeline),
            _ => {}
        }
        if is_assignment(&it.instruction) {
            let kind = parse_assignment(b, it, global)?;
            return Ok(Step::Command(Command::Assignment(Assignment { global, kind })));
        }
        if let Some(prefix) = prefix {
            let got = it.token;
            b.push_back(it);
            return Err(b.syntax_error(
                "an assignment",
                Some(got),
                &format!["the prefix {} must be followed by an assignment", b.describe(prefix)],
            ));
        }
        return Ok(Step::Command(parse_non_assignment(b, it)?));
    }
}

fn is_assignment(instruction: &Instruction) -> bool {
    use Primitive::*;
    match instruction {
        Instruction::MacroDefinition(_)
        | Instruction::LetTarget(_)
        | Instruction::Register(..)
        | Instruction::Parameter(_)
        | Instruction::Font(_) => true,
        Instruction::Primitive(p) => matches!(
            p,
            Count
                | Dimen
                | Skip
                | Toks
                | SetBox
                | CharDef
                | CountDef
                | DimenDef
                | SkipDef
                | ToksDef
                | Advance
                | Multiply
                | Divide
                | CatCode
                | LcCode
                | UcCode
                | SfCode
                | MathCode
                | DelCode
                | Font
                | NullFont
        ),
        _ => false,
    }
}

fn parse_assignment(b: &mut Banisher, it: InstructionToken, global: bool) -> Result<AssignmentKind> {
    let token = it.token;
    let p = match it.instruction {
        Instruction::MacroDefinition(d) => {
            return Ok(AssignmentKind::Macro {
                name: d.name,
                definition: d.definition,
                force_global: d.force_global,
            })
        }
        Instruction::LetTarget(l) => {
            return Ok(AssignmentKind::Let {
                name: l.name,
                target: l.target,
            })
        }
        Instruction::Font(id) => return Ok(AssignmentKind::SelectFont(id)),
        Instruction::Primitive(Primitive::NullFont) => {
            return Ok(AssignmentKind::SelectFont(FontId::NULL_FONT))
        }
        Instruction::Primitive(p) => p,
        _ => return parse_variable_assignment(b, it),
    };
    match p {
        Primitive::Advance | Primitive::Multiply | Primitive::Divide => {
            Ok(AssignmentKind::Arithmetic(parse_arithmetic(b, p, token)?))
        }
        Primitive::CharDef
        | Primitive::CountDef
        | Primitive::DimenDef
        | Primitive::SkipDef
        | Primitive::ToksDef => parse_short_hand_definition(b, p, token, global),
        Primitive::Font => parse_font_definition(b, token, global),
        Primitive::SetBox => {
            let index = super::parse_register_index(b, token)?;
            optional_equals(b)?;
            loop {
                let it = b.next_expanded_or_err("reading the box of a \\setbox assignment")?;
                match it.instruction {
                    Instruction::Character(Value::Space(_)) | Instruction::Primitive(Primitive::Relax) => {
                        continue
                    }
                    Instruction::Primitive(
                        p @ (Primitive::Box | Primitive::Copy | Primitive::HBox | Primitive::VBox | Primitive::VTop),
                    ) => {
                        let source = parse_box(b, p, it.token)?;
                        return Ok(AssignmentKind::SetBox { index, source });
                    }
                    _ => {
                        let got = it.token;
                        b.push_back(it);
                        return Err(b.syntax_error(
                            "a box",
                            Some(got),
                            "the value of a box register is given by \\box, \\copy, \\hbox, \\vbox or \\vtop",
                        ));
                    }
                }
            }
        }
        _ => parse_variable_assignment(b, InstructionToken::new(Instruction::Primitive(p), token)),
    }
}

fn parse_variable_assignment(b: &mut Banisher, it: InstructionToken) -> Result<AssignmentKind> {
    let variable = match parse_variable(b, &it)? {
        Some(variable) => variable,
        None => {
            return Err(b.syntax_error(
                "a variable",
                Some(it.token),
                "only registers, parameters and codes can be assigned to",
            ))
        }
    };
    optional_equals(b)?;
    Ok(match variable {
        Variable::Integer(v) => AssignmentKind::Integer(v, i32::parse(b)?),
        Variable::Dimension(v) => AssignmentKind::Dimension(v, Scaled::parse(b)?),
        Variable::Glue(v) => AssignmentKind::Glue(v, Glue::parse(b)?),
        Variable::TokenList(v) => AssignmentKind::TokenList(v, parse_token_list_value(b)?),
    })
}

/// Reads the right hand side of a token list assignment: a balanced text or another token list.
fn parse_token_list_value(b: &mut Banisher) -> Result<Vec<Token>> {
    let n = b.num_contexts();
    b.set_context(ContextMode::AwaitingBalancedTextOrVariable);
    let it = match b.next_terminal() {
        Ok(Some(it)) => it,
        Ok(None) => {
            b.reset_context(n);
            return Err(Error::end_of_input("reading the value of a token list"));
        }
        Err(err) => {
            b.reset_context(n);
            return Err(err);
        }
    };
    let got = it.token;
    match it.instruction {
        Instruction::BalancedText(tokens) => Ok(tokens),
        _ => match parse_variable(b, &it)? {
            Some(Variable::TokenList(v)) => Ok(b.state.token_list(v).to_vec()),
            _ => {
                b.push_back(it);
                Err(b.syntax_error(
                    "a balanced text or a token list variable",
                    Some(got),
                    "a token list is assigned a braced text like {abc}, or another token list like \\toks0",
                ))
            }
        },
    }
}

fn parse_arithmetic(b: &mut Banisher, p: Primitive, token: Token) -> Result<Arithmetic> {
    let it = b.next_expanded_or_err(&format!["reading the variable after {}", b.describe(token)])?;
    let variable = match parse_variable(b, &it)? {
        Some(Variable::TokenList(_)) | None => {
            let got = it.token;
            b.push_back(it);
            return Err(b.syntax_error(
                "an integer, dimension or glue variable",
                Some(got),
                &format!["{} applies to registers and parameters holding numbers", b.describe(token)],
            ));
        }
        Some(variable) => variable,
    };
    keyword(b, "by")?;
    Ok(match (p, variable) {
        (Primitive::Advance, Variable::Integer(v)) => Arithmetic::AdvanceInteger(v, i32::parse(b)?),
        (Primitive::Advance, Variable::Dimension(v)) => {
            Arithmetic::AdvanceDimension(v, Scaled::parse(b)?)
        }
        (Primitive::Advance, Variable::Glue(v)) => Arithmetic::AdvanceGlue(v, Glue::parse(b)?),
        (Primitive::Multiply, variable) => Arithmetic::Multiply(variable, i32::parse(b)?),
        (_, variable) => Arithmetic::Divide(variable, i32::parse(b)?),
    })
}

/// Reads the control sequence or active character being defined.
fn parse_defined_name(b: &mut Banisher, token: Token) -> Result<CommandRef> {
    let name_token = loop {
        match b.next_raw()? {
            None => {
                return Err(Error::end_of_input(format![
                    "reading the name defined by {}",
                    b.describe(token)
                ]))
            }
            Some(t) if matches!(t.value(), Value::Space(_)) => continue,
            Some(t) => break t,
        }
    };
    match name_token.command_ref() {
        Some(CommandRef::Frozen(_)) | None => Err(b.syntax_error(
            "a control sequence or active character",
            Some(name_token),
            &format!["{} defines a control sequence or active character", b.describe(token)],
        )),
        Some(name) => Ok(name),
    }
}

/// TeX.2021.1224.
fn parse_short_hand_definition(
    b: &mut Banisher,
    p: Primitive,
    token: Token,
    global: bool,
) -> Result<AssignmentKind> {
    let name = parse_defined_name(b, token)?;
    // The name means \relax while its value is read.
    let scope = b.state.scope(global);
    b.state
        .router
        .set_route(name, Route::Primitive(Primitive::Relax), scope);
    optional_equals(b)?;
    let route = match p {
        Primitive::CharDef => Route::CharCode(super::parse_char_code(b, token)? as u32),
        _ => {
            let kind = match p {
                Primitive::CountDef => RegisterKind::Count,
                Primitive::DimenDef => RegisterKind::Dimen,
                Primitive::SkipDef => RegisterKind::Skip,
                _ => RegisterKind::Toks,
            };
            Route::Register(kind, super::parse_register_index(b, token)?)
        }
    };
    log::debug!("short hand definition of {}", name.to_string(&b.interner));
    Ok(AssignmentKind::ShortHand { name, route })
}

/// TeX.2021.1257.
fn parse_font_definition(b: &mut Banisher, token: Token, global: bool) -> Result<AssignmentKind> {
    let name = parse_defined_name(b, token)?;
    // The name means \nullfont while the file name and size are read.
    let scope = b.state.scope(global);
    b.state
        .router
        .set_route(name, Route::Font(FontId::NULL_FONT), scope);
    optional_equals(b)?;
    let file = b.read_file_name()?;
    let size = optional_continuation(b, |b| {
        if keyword(b, "at")? {
            let at = Scaled::parse(b)?;
            if at <= Scaled::ZERO || at >= Scaled::ONE * 2048 {
                return Err(Error::overflow(
                    Some(token),
                    format!["improper `at' size ({at}): the size must be positive and less than 2048pt"],
                ));
            }
            return Ok(Some(FontSize::At(at)));
        }
        if keyword(b, "scaled")? {
            let factor = i32::parse(b)?;
            if factor <= 0 || factor > 32768 {
                return Err(Error::overflow(
                    Some(token),
                    format!["illegal magnification {factor}: the scale factor must be between 1 and 32768"],
                ));
            }
            return Ok(Some(FontSize::Scaled(factor)));
        }
        Ok(None)
    })?;
    Ok(AssignmentKind::Font {
        name,
        file,
        size: size.unwrap_or_default(),
    })
}

fn parse_box_spec(b: &mut Banisher) -> Result<BoxSpec> {
    let spec = optional_continuation(b, |b| {
        if keyword(b, "to")? {
            return Ok(Some(BoxSpec::To(Scaled::parse(b)?)));
        }
        if keyword(b, "spread")? {
            return Ok(Some(BoxSpec::Spread(Scaled::parse(b)?)));
        }
        Ok(None)
    })?;
    Ok(spec.unwrap_or_default())
}

/// Reads a braced list that is built by a nested run of the pipeline.
fn parse_nested_list(b: &mut Banisher, kind: SubPipeline, token: Token) -> Result<Vec<Command>> {
    let n = b.num_contexts();
    b.set_context(ContextMode::AwaitingBoxStart(kind));
    let it = match b.next_terminal() {
        Ok(Some(it)) => it,
        Ok(None) => {
            b.reset_context(n);
            return Err(Error::end_of_input(format!["reading the contents of a {kind}"]));
        }
        Err(err) => {
            b.reset_context(n);
            return Err(err);
        }
    };
    match it.instruction {
        Instruction::BoxContents(list) => Ok(list),
        _ => {
            let got = it.token;
            b.push_back(it);
            Err(b.syntax_error(
                "a begin group character",
                Some(got),
                &format!["the contents of {} must be enclosed in braces", b.describe(token)],
            ))
        }
    }
}

fn parse_box(b: &mut Banisher, p: Primitive, token: Token) -> Result<BoxSource> {
    let kind = match p {
        Primitive::Box | Primitive::Copy => {
            let index = super::parse_register_index(b, token)?;
            return Ok(BoxSource::Register {
                index,
                copy: p == Primitive::Copy,
            });
        }
        Primitive::HBox => BoxKind::Horizontal,
        Primitive::VBox => BoxKind::Vertical,
        _ => BoxKind::VTop,
    };
    let spec = parse_box_spec(b)?;
    let list = parse_nested_list(b, SubPipeline::Box(kind), token)?;
    Ok(BoxSource::Built(TexBox { kind, spec, list }))
}

fn parse_balanced_text(b: &mut Banisher, expanded: bool, token: Token) -> Result<Vec<Token>> {
    let n = b.num_contexts();
    b.set_context(ContextMode::AwaitingBalancedText { expanded });
    let it = match b.next_terminal() {
        Ok(Some(it)) => it,
        Ok(None) => {
            b.reset_context(n);
            return Err(Error::end_of_input(format![
                "reading the argument of {}",
                b.describe(token)
            ]));
        }
        Err(err) => {
            b.reset_context(n);
            return Err(err);
        }
    };
    match it.instruction {
        Instruction::BalancedText(tokens) => Ok(tokens),
        _ => {
            let got = it.token;
            b.push_back(it);
            Err(b.syntax_error(
                "a begin group character",
                Some(got),
                &format!["the argument of {} must be enclosed in braces", b.describe(token)],
            ))
        }
    }
}

fn parse_rule(b: &mut Banisher, direction: Direction) -> Result<Rule> {
    let mut rule = Rule {
        direction,
        width: None,
        height: None,
        depth: None,
    };
    // TeX.2021.463
    loop {
        if keyword(b, "width")? {
            rule.width = Some(Scaled::parse(b)?);
        } else if keyword(b, "height")? {
            rule.height = Some(Scaled::parse(b)?);
        } else if keyword(b, "depth")? {
            rule.depth = Some(Scaled::parse(b)?);
        } else {
            return Ok(rule);
        }
    }
}

fn fil_glue(p: Primitive) -> Glue {
    match p {
        Primitive::HFil | Primitive::VFil => Glue::infinite_stretch(GlueOrder::Fil),
        Primitive::HFill | Primitive::VFill => Glue::infinite_stretch(GlueOrder::Fill),
        Primitive::HSs | Primitive::VSs => Glue {
            stretch: Scaled::ONE,
            stretch_order: GlueOrder::Fil,
            shrink: Scaled::ONE,
            shrink_order: GlueOrder::Fil,
            ..Default::default()
        },
        _ => Glue {
            stretch: -Scaled::ONE,
            stretch_order: GlueOrder::Fil,
            ..Default::default()
        },
    }
}

fn parse_alignment(b: &mut Banisher, direction: Direction, token: Token) -> Result<Command> {
    let spec = parse_box_spec(b)?;
    loop {
        let it = b.next_expanded_or_err("reading the start of an alignment")?;
        match it.instruction {
            Instruction::Character(Value::Space(_)) | Instruction::Primitive(Primitive::Relax) => continue,
            Instruction::Character(Value::BeginGroup(_)) => break,
            _ => {
                let got = it.token;
                b.push_back(it);
                return Err(b.syntax_error(
                    "a begin group character",
                    Some(got),
                    &format!["the preamble and rows of {} must be enclosed in braces", b.describe(token)],
                ));
            }
        }
    }
    Ok(Command::Alignment(b.read_alignment(direction, spec)?))
}

fn misplaced(b: &mut Banisher, it: InstructionToken) -> Box<Error> {
    let got = it.token;
    b.push_back(it);
    b.syntax_error(
        "a command",
        Some(got),
        &format!["{} cannot appear at the start of a command", b.describe(got)],
    )
}

fn parse_non_assignment(b: &mut Banisher, it: InstructionToken) -> Result<Command> {
    let token = it.token;
    let p = match it.instruction {
        Instruction::Character(value) => {
            return Ok(match value {
                Value::BeginGroup(_) => Command::BeginGroup,
                Value::EndGroup(_) => Command::EndGroup,
                Value::MathShift(c) => Command::MathShift(c),
                Value::Superscript(c) => Command::Superscript(c),
                Value::Subscript(c) => Command::Subscript(c),
                Value::Space(_) => Command::Space,
                Value::Letter(c) | Value::Other(c) => Command::Character(c),
                Value::AlignmentTab(_) | Value::Parameter(_) | Value::CommandRef(_) => {
                    return Err(misplaced(b, it))
                }
            })
        }
        Instruction::CharCode(c) => {
            return match char::from_u32(c) {
                Some(c) => Ok(Command::Character(c)),
                None => Err(Error::overflow(Some(token), format!["bad character code {c}"])),
            }
        }
        Instruction::NoExpand | Instruction::EndTemplate => return Ok(Command::Relax),
        Instruction::Primitive(p) => p,
        _ => return Err(misplaced(b, it)),
    };
    use Primitive::*;
    Ok(match p {
        BeginGroup => Command::BeginGroup,
        EndGroup => Command::EndGroup,
        Box | Copy | HBox | VBox | VTop => Command::Box(parse_box(b, p, token)?),
        HRule => Command::Rule(parse_rule(b, Direction::Horizontal)?),
        VRule => Command::Rule(parse_rule(b, Direction::Vertical)?),
        HSkip => Command::Glue(Direction::Horizontal, Glue::parse(b)?),
        VSkip => Command::Glue(Direction::Vertical, Glue::parse(b)?),
        HFil | HFill | HSs | HFilNeg => Command::Glue(Direction::Horizontal, fil_glue(p)),
        VFil | VFill | VSs | VFilNeg => Command::Glue(Direction::Vertical, fil_glue(p)),
        Kern => Command::Kern(Scaled::parse(b)?),
        Penalty => Command::Penalty(i32::parse(b)?),
        Accent => Command::Accent(i32::parse(b)?),
        Message => {
            let tokens = parse_balanced_text(b, true, token)?;
            Command::Message(write_tokens(&tokens, &b.interner))
        }
        Write => {
            let stream = i32::parse(b)?;
            let tokens = parse_balanced_text(b, false, token)?;
            Command::Write { stream, tokens }
        }
        Discretionary => {
            let pre_break = parse_nested_list(b, SubPipeline::Discretionary, token)?;
            let post_break = parse_nested_list(b, SubPipeline::Discretionary, token)?;
            let no_break = parse_nested_list(b, SubPipeline::Discretionary, token)?;
            Command::Discretionary {
                pre_break,
                post_break,
                no_break,
            }
        }
        DiscretionaryHyphen => Command::DiscretionaryHyphen,
        HAlign => parse_alignment(b, Direction::Horizontal, token)?,
        VAlign => parse_alignment(b, Direction::Vertical, token)?,
        Char => Command::Character(super::parse_char_code(b, token)?),
        Par => Command::Par,
        Indent => Command::Indent,
        NoIndent => Command::NoIndent,
        Relax => Command::Relax,
        End => Command::End,
        ControlSpace => Command::ControlSpace,
        _ => {
            return Err(misplaced(
                b,
                InstructionToken::new(Instruction::Primitive(p), token),
            ))
        }
    })
}
