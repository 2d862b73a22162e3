//! The engine: the pipeline with the executor attached.

use crate::banisher::Banisher;
use crate::command::Command;
use crate::config::Config;
use crate::error::{Error, TracedError};
use crate::executor;
use crate::filesystem::FileSystem;
use crate::font::FontLoader;
use crate::parse::command::{self, Step};
use crate::state::State;
use crate::token::trace::Origin;
use crate::token::CsNameInterner;

/// Drives the pipeline and applies assignments as they are produced.
///
/// ```
/// use texfront::{Command, Config, Engine};
/// use texfront::token::trace::Origin;
///
/// let mut engine = Engine::new(Config::plain_tex());
/// engine.push_source(Origin::Terminal, r"\def\a{b}\a\end");
/// let commands = engine.run().unwrap();
/// assert_eq!(commands, vec![Command::Character('b'), Command::End]);
/// ```
pub struct Engine {
    banisher: Banisher,
}

impl Engine {
    pub fn new(config: Config) -> Engine {
        Engine {
            banisher: Banisher::new(config),
        }
    }

    pub fn with_font_loader(mut self, font_loader: Box<dyn FontLoader>) -> Engine {
        self.banisher.set_font_loader(font_loader);
        self
    }

    pub fn with_file_system(mut self, file_system: Box<dyn FileSystem>) -> Engine {
        self.banisher.set_file_system(file_system);
        self
    }

    /// Adds source code at the current read position.
    pub fn push_source(&mut self, origin: Origin, content: &str) {
        self.banisher.push_source(origin, content);
    }

    pub fn state(&self) -> &State {
        &self.banisher.state
    }

    pub fn interner(&self) -> &CsNameInterner {
        &self.banisher.interner
    }

    /// Returns the next command that is not consumed by the executor.
    ///
    /// Returns [None] when the input is exhausted.
    pub fn next_command(&mut self) -> Result<Option<Command>, TracedError> {
        let b = &mut self.banisher;
        loop {
            b.clear_window();
            let step = command::parse_command(b).map_err(|err| b.trace_error(err))?;
            match step {
                Step::Command(command) => {
                    if let Some(command) =
                        executor::execute(b, command).map_err(|err| b.trace_error(err))?
                    {
                        return Ok(Some(command));
                    }
                }
                Step::EndOfSubPipeline => {
                    return Err(b.trace_error(Error::unbalanced(
                        None,
                        "a nested list was closed outside of any nested list",
                    )))
                }
                Step::EndOfInput => return Ok(None),
            }
        }
    }

    /// Runs until `\end` or the end of the input, returning every command produced.
    pub fn run(&mut self) -> Result<Vec<Command>, TracedError> {
        let mut commands = vec![];
        while let Some(command) = self.next_command()? {
            let end = command == Command::End;
            commands.push(command);
            if end {
                break;
            }
        }
        log::debug!("run finished after {} commands", commands.len());
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::tests::InMemoryFileSystem;

    fn engine() -> Engine {
        Engine::new(Config {
            end_line_char: -1,
            ..Config::plain_tex()
        })
    }

    #[test]
    fn assignments_are_not_returned() {
        let mut engine = engine();
        engine.push_source(Origin::Terminal, r"\count1=3 \dimen2=1pt a");
        let got = engine.run().unwrap();
        assert_eq!(got, vec![Command::Character('a')]);
        assert_eq!(engine.state().registers.count(1), 3);
    }

    #[test]
    fn run_stops_at_end() {
        let mut engine = engine();
        engine.push_source(Origin::Terminal, r"a\end b");
        let got = engine.run().unwrap();
        assert_eq!(got, vec![Command::Character('a'), Command::End]);
        assert_eq!(engine.next_command().unwrap(), Some(Command::Character('b')));
        assert_eq!(engine.next_command().unwrap(), None);
    }

    #[test]
    fn more_input_after_end_of_input() {
        let mut engine = engine();
        engine.push_source(Origin::Terminal, "a");
        assert_eq!(engine.run().unwrap(), vec![Command::Character('a')]);
        engine.push_source(Origin::Terminal, "b");
        assert_eq!(engine.run().unwrap(), vec![Command::Character('b')]);
    }

    #[test]
    fn errors_are_traced() {
        let mut engine = engine();
        engine.push_source(Origin::Terminal, r"\undefined");
        let err = engine.next_command().unwrap_err();
        assert_eq!(err.trace.line_number, 1);
    }

    #[test]
    fn input_from_file_system() {
        let mut file_system = InMemoryFileSystem::default();
        file_system
            .0
            .insert("chapter.tex".to_string(), r"\count7=11 x".to_string());
        let mut engine = engine().with_file_system(Box::new(file_system));
        engine.push_source(Origin::Terminal, r"\input chapter.tex ");
        let got = engine.run().unwrap();
        assert_eq!(got, vec![Command::Character('x')]);
        assert_eq!(engine.state().registers.count(7), 11);
    }
}
