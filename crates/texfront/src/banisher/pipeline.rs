//! Nested runs of the pipeline.
//!
//! The contents of a box are the commands between its braces. The banisher builds them
//! by running the parser and executor recursively until the matching end group character
//! produces [Instruction::EndOfSubPipeline](crate::instruction::Instruction::EndOfSubPipeline).
//! Alignment cells work the same way, with a frozen end template token as the terminator.

use super::{Banisher, ContextMode, GroupKind, SubPipeline};
use crate::command::{Alignment, BoxSpec, Command, Direction};
use crate::error::{Error, Result};
use crate::executor;
use crate::instruction::Instruction;
use crate::parse::command::{self, Step};
use crate::primitive::Primitive;
use crate::token::{Frozen, Token, Value};

/// The template of one column: the tokens before and after the `#`.
#[derive(Debug, Default, Clone)]
struct Template {
    u: Vec<Token>,
    v: Vec<Token>,
}

/// How reading a cell ended.
enum CellEnd {
    Tab,
    Cr,
    EndOfAlignment,
}

impl Banisher {
    /// Builds a nested list.
    ///
    /// Every stack the nested run pushes is unwound before returning, including when it fails.
    pub(super) fn run_sub_pipeline(&mut self, kind: SubPipeline) -> Result<Vec<Command>> {
        log::debug!("entering a {kind} at group depth {}", self.groups.len());
        let (groups, modes, contexts, depth) = (
            self.groups.len(),
            self.modes.len(),
            self.contexts.len(),
            self.state.depth(),
        );
        self.groups.push(GroupKind::SubPipeline(kind));
        self.state.push_scope();
        self.modes.push(kind.mode());
        self.contexts.push(ContextMode::Normal);
        self.windows.push(vec![]);
        let result = self.run_commands(kind);
        self.windows.pop();
        self.contexts.truncate(contexts);
        self.modes.truncate(modes);
        self.groups.truncate(groups);
        while self.state.depth() > depth {
            if self.state.pop_scope().is_err() {
                break;
            }
        }
        log::debug!("left the {kind}");
        result
    }

    fn run_commands(&mut self, kind: SubPipeline) -> Result<Vec<Command>> {
        let mut list = vec![];
        loop {
            self.clear_window();
            match command::parse_command(self)? {
                Step::Command(command) => {
                    if let Some(command) = executor::execute(self, command)? {
                        list.push(command);
                    }
                }
                Step::EndOfSubPipeline => return Ok(list),
                Step::EndOfInput => {
                    return Err(Error::end_of_input(format!["building the contents of a {kind}"]))
                }
            }
        }
    }

    /// Reads an alignment after its opening `{`.
    pub(crate) fn read_alignment(&mut self, direction: Direction, spec: BoxSpec) -> Result<Alignment> {
        let depth = self.state.depth();
        self.state.push_scope();
        let result = self.read_alignment_rows(direction);
        while self.state.depth() > depth {
            if self.state.pop_scope().is_err() {
                break;
            }
        }
        Ok(Alignment {
            direction,
            spec,
            rows: result?,
        })
    }

    fn read_alignment_rows(&mut self, direction: Direction) -> Result<Vec<Vec<Vec<Command>>>> {
        let templates = self.read_preamble()?;
        log::debug!("read an alignment preamble with {} column(s)", templates.len());
        let mut rows = vec![];
        loop {
            // TeX.2021.785: spaces and \crcr between rows are ignored.
            let token = self.next_raw_or_err("reading the rows of an alignment")?;
            match token.value() {
                Value::Space(_) => continue,
                Value::EndGroup(_) => return Ok(rows),
                _ => {}
            }
            if let Instruction::Primitive(Primitive::CrCr) = self.state.router.classify(token) {
                continue;
            }
            self.unread(token);
            let mut row = vec![];
            loop {
                let (cell, end) = self.read_cell()?;
                let template = templates.get(row.len()).cloned().unwrap_or_default();
                let mut tokens = template.u;
                tokens.extend(cell);
                tokens.extend(template.v);
                tokens.push(Token::new_frozen(Frozen::EndTemplate, token.trace_key()));
                self.unread_all(tokens);
                row.push(self.run_sub_pipeline(SubPipeline::AlignCell(direction))?);
                match end {
                    CellEnd::Tab => continue,
                    CellEnd::Cr => break,
                    CellEnd::EndOfAlignment => {
                        rows.push(row);
                        return Ok(rows);
                    }
                }
            }
            rows.push(row);
        }
    }

    /// Reads the preamble up to the first `\cr`.
    fn read_preamble(&mut self) -> Result<Vec<Template>> {
        let mut templates = vec![];
        let mut current = Template::default();
        let mut seen_parameter = false;
        let mut depth = 0_usize;
        loop {
            let token = self.next_raw_or_err("reading the preamble of an alignment")?;
            let is_cr = matches!(
                self.state.router.classify(token),
                Instruction::Primitive(Primitive::Cr | Primitive::CrCr)
            );
            match token.value() {
                _ if is_cr && depth == 0 => {
                    templates.push(current);
                    return Ok(templates);
                }
                Value::AlignmentTab(_) if depth == 0 => {
                    templates.push(std::mem::take(&mut current));
                    seen_parameter = false;
                    continue;
                }
                Value::Parameter(_) if depth == 0 => {
                    if seen_parameter {
                        return Err(self.syntax_error(
                            "an alignment tab or \\cr",
                            Some(token),
                            "each template of an alignment preamble contains exactly one #",
                        ));
                    }
                    seen_parameter = true;
                    continue;
                }
                Value::BeginGroup(_) => depth += 1,
                Value::EndGroup(_) => {
                    if depth == 0 {
                        return Err(Error::unbalanced(
                            Some(token),
                            "the alignment ended inside its preamble",
                        ));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            if seen_parameter {
                current.v.push(token);
            } else {
                current.u.push(token);
            }
        }
    }

    /// Reads the unexpanded tokens of one cell.
    fn read_cell(&mut self) -> Result<(Vec<Token>, CellEnd)> {
        let mut cell = vec![];
        let mut depth = 0_usize;
        loop {
            let token = self.next_raw_or_err("reading a cell of an alignment")?;
            if depth == 0 {
                if let Instruction::Primitive(Primitive::Cr | Primitive::CrCr) =
                    self.state.router.classify(token)
                {
                    return Ok((cell, CellEnd::Cr));
                }
            }
            match token.value() {
                Value::AlignmentTab(_) if depth == 0 => return Ok((cell, CellEnd::Tab)),
                Value::BeginGroup(_) => depth += 1,
                Value::EndGroup(_) => {
                    if depth == 0 {
                        return Ok((cell, CellEnd::EndOfAlignment));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            cell.push(token);
        }
    }
}
