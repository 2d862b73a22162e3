use crate::banisher::Banisher;
use crate::error::Result;
use crate::token::Value;

/// Reads a keyword like `plus` or `true`. TeX.2021.407.
///
/// Letters match regardless of case and category, and spaces before the keyword are skipped.
/// If the keyword is not there, everything except the skipped spaces is returned to the input.
pub fn keyword(b: &mut Banisher, word: &str) -> Result<bool> {
    let mut matched = vec![];
    let mut expected = word.chars().peekable();
    while let Some(&want) = expected.peek() {
        let it = match b.next_expanded()? {
            None => break,
            Some(it) => it,
        };
        let c = match it.token.value() {
            Value::Letter(c) | Value::Other(c) => Some(c),
            _ => None,
        };
        match c {
            Some(c) if c == want || c == want.to_ascii_uppercase() => {
                matched.push(it);
                expected.next();
            }
            _ if matched.is_empty() && matches!(it.token.value(), Value::Space(_)) => {}
            _ => {
                b.push_back(it);
                break;
            }
        }
    }
    if expected.peek().is_none() {
        return Ok(true);
    }
    while let Some(it) = matched.pop() {
        b.push_back(it);
    }
    Ok(false)
}
