//! User defined macros.
//!
//! A macro is a prefix that must follow the macro token itself, a list of
//! parameters and a replacement text. Parameters are either undelimited, in which case
//! the argument is a single token or a braced group, or delimited by a sequence of
//! tokens that must appear at group depth 0.

use crate::error::{Error, Result};
use crate::token::{CsNameInterner, Token, Value};
use texfront_stdext::algorithms::substringsearch::Matcher;

/// A TeX macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    prefix: Vec<Token>,
    parameters: Vec<Parameter>,
    replacements: Vec<Replacement>,
}

/// A token list or parameter in a replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Tokens(Vec<Token>),
    /// A parameter. The index is less than the number of parameters of the macro.
    Parameter(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Undelimited,
    Delimited(Matcher<Value>),
}

/// A stream of unexpanded tokens that macro arguments are read from.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Option<Token>>;

    /// Interner used to describe tokens in error messages.
    fn interner(&self) -> &CsNameInterner;
}

impl Macro {
    pub fn new(prefix: Vec<Token>, parameters: Vec<Parameter>, replacements: Vec<Replacement>) -> Macro {
        Macro {
            prefix,
            parameters,
            replacements,
        }
    }

    /// Builds a macro from its parameter text and replacement text.
    ///
    /// When the parameter text was terminated by `#{`, `brace` is the `{` token.
    /// It then delimits the last parameter and is appended to the replacement text.
    pub fn parse(
        name_token: Token,
        parameter_text: Vec<Token>,
        replacement_text: Vec<Token>,
        brace: Option<Token>,
        interner: &CsNameInterner,
    ) -> Result<Macro> {
        let mut prefix = vec![];
        let mut delimiters: Vec<Vec<Value>> = vec![];
        let mut tokens = parameter_text.into_iter();
        while let Some(token) = tokens.next() {
            if let Value::Parameter(_) = token.value() {
                let expected = delimiters.len() + 1;
                match tokens.next().and_then(|t| t.char()).and_then(|c| c.to_digit(10)) {
                    Some(n) if n as usize == expected && expected <= 9 => {
                        delimiters.push(vec![]);
                        continue;
                    }
                    _ => {
                        return Err(malformed(
                            name_token,
                            interner,
                            format!["parameters must be numbered consecutively; expected #{expected}"],
                        ))
                    }
                }
            }
            match delimiters.last_mut() {
                None => prefix.push(token),
                Some(delimiter) => delimiter.push(token.value()),
            }
        }
        if let Some(brace) = brace {
            match delimiters.last_mut() {
                None => prefix.push(brace),
                Some(delimiter) => delimiter.push(brace.value()),
            }
        }
        let parameters: Vec<Parameter> = delimiters
            .into_iter()
            .map(|delimiter| match Matcher::new(delimiter) {
                None => Parameter::Undelimited,
                Some(matcher) => Parameter::Delimited(matcher),
            })
            .collect();

        let mut replacements = vec![];
        let mut pending = vec![];
        let mut tokens = replacement_text.into_iter();
        while let Some(token) = tokens.next() {
            if let Value::Parameter(_) = token.value() {
                let next = tokens.next();
                match next.map(|t| t.value()) {
                    Some(Value::Parameter(_)) => {
                        // ## produces a single parameter token.
                        if let Some(next) = next {
                            pending.push(next);
                        }
                    }
                    Some(Value::Other(c)) if matches!(c.to_digit(10), Some(n) if n >= 1 && (n as usize) <= parameters.len()) => {
                        if !pending.is_empty() {
                            replacements.push(Replacement::Tokens(std::mem::take(&mut pending)));
                        }
                        let n = c.to_digit(10).unwrap_or(1) as usize;
                        replacements.push(Replacement::Parameter(n - 1));
                    }
                    _ => {
                        return Err(malformed(
                            name_token,
                            interner,
                            format![
                                "illegal parameter number in the replacement text; the macro has {} parameter(s)",
                                parameters.len()
                            ],
                        ))
                    }
                }
                continue;
            }
            pending.push(token);
        }
        if let Some(brace) = brace {
            pending.push(brace);
        }
        if !pending.is_empty() {
            replacements.push(Replacement::Tokens(pending));
        }
        Ok(Macro::new(prefix, parameters, replacements))
    }

    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Reads the arguments of a call of this macro.
    ///
    /// `call` is the token that invoked the macro.
    pub fn read_arguments<S: TokenSource>(&self, call: Token, source: &mut S) -> Result<Vec<Vec<Token>>> {
        for expected in &self.prefix {
            match source.next_token()? {
                None => return Err(Error::end_of_input("matching the prefix of a macro")),
                Some(token) if token.value() == expected.value() => {}
                Some(token) => {
                    let interner = source.interner();
                    return Err(Box::new(Error::MalformedMacro {
                        token,
                        message: format![
                            "use of {} does not match its definition; expected {}",
                            describe_call(call, interner),
                            expected.describe(interner),
                        ],
                    }));
                }
            }
        }
        let mut arguments = Vec::with_capacity(self.parameters.len());
        for (i, parameter) in self.parameters.iter().enumerate() {
            let argument = match parameter {
                Parameter::Undelimited => read_undelimited_argument(source, i + 1)?,
                Parameter::Delimited(matcher) => read_delimited_argument(source, matcher, i + 1)?,
            };
            arguments.push(argument);
        }
        Ok(arguments)
    }

    /// Returns the replacement text with the arguments substituted.
    pub fn substitute(&self, arguments: &[Vec<Token>]) -> Vec<Token> {
        let mut result = vec![];
        for replacement in &self.replacements {
            match replacement {
                Replacement::Tokens(tokens) => result.extend_from_slice(tokens),
                Replacement::Parameter(i) => {
                    if let Some(argument) = arguments.get(*i) {
                        result.extend_from_slice(argument);
                    }
                }
            }
        }
        result
    }
}

fn describe_call(call: Token, interner: &CsNameInterner) -> String {
    match call.command_ref() {
        Some(command_ref) => command_ref.to_string(interner),
        None => call.describe(interner),
    }
}

fn malformed(name_token: Token, interner: &CsNameInterner, message: String) -> Box<Error> {
    Box::new(Error::MalformedMacro {
        token: name_token,
        message: format!["in the definition of {}: {message}", describe_call(name_token, interner)],
    })
}

fn read_undelimited_argument<S: TokenSource>(source: &mut S, param_num: usize) -> Result<Vec<Token>> {
    let doing = || format!["reading argument #{param_num} of a macro"];
    let first = loop {
        match source.next_token()? {
            None => return Err(Error::end_of_input(doing())),
            Some(token) => match token.value() {
                Value::Space(_) => continue,
                _ => break token,
            },
        }
    };
    match first.value() {
        Value::BeginGroup(_) => {}
        Value::EndGroup(_) => {
            return Err(Error::unbalanced(
                Some(first),
                "a macro argument cannot start with an end group character",
            ))
        }
        _ => return Ok(vec![first]),
    }
    let mut result = vec![];
    let mut depth = 0_usize;
    loop {
        let token = match source.next_token()? {
            None => return Err(Error::end_of_input(doing())),
            Some(token) => token,
        };
        match token.value() {
            Value::BeginGroup(_) => depth += 1,
            Value::EndGroup(_) => {
                if depth == 0 {
                    return Ok(result);
                }
                depth -= 1;
            }
            _ => {}
        }
        result.push(token);
    }
}

fn read_delimited_argument<S: TokenSource>(
    source: &mut S,
    matcher: &Matcher<Value>,
    param_num: usize,
) -> Result<Vec<Token>> {
    // A delimiter ending in `{` comes from `#{`, so the match completes inside that group.
    let closing_depth = match matcher.substring().last() {
        Some(Value::BeginGroup(_)) => 1,
        _ => 0,
    };
    let mut search = matcher.start();
    let mut result = vec![];
    let mut depth = 0_usize;
    loop {
        let token = match source.next_token()? {
            None => {
                return Err(Error::end_of_input(format![
                    "reading the delimited argument #{param_num} of a macro"
                ]))
            }
            Some(token) => token,
        };
        match token.value() {
            Value::BeginGroup(_) => depth += 1,
            Value::EndGroup(_) => {
                if depth == 0 {
                    return Err(Error::unbalanced(
                        Some(token),
                        "unexpected end group character while reading a delimited macro argument",
                    ));
                }
                depth -= 1;
            }
            _ => {}
        }
        let matched = search.next(&token.value());
        result.push(token);
        if matched && depth == closing_depth {
            result.truncate(result.len() - matcher.substring().len());
            if is_single_group(&result) {
                result.pop();
                result.remove(0);
            }
            return Ok(result);
        }
    }
}

/// Whether the tokens are exactly one braced group, like `{a{b}}` but not `{a}{b}`.
fn is_single_group(tokens: &[Token]) -> bool {
    if tokens.len() < 2 {
        return false;
    }
    if !matches!(tokens[0].value(), Value::BeginGroup(_)) {
        return false;
    }
    let mut depth = 0_usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.value() {
            Value::BeginGroup(_) => depth += 1,
            Value::EndGroup(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == tokens.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}
