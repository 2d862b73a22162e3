use super::Parsable;
use crate::banisher::Banisher;
use crate::error::Result;
use crate::token::Value;
use std::cmp::Ordering;

/// The relation in `\ifnum` and `\ifdim`.
impl Parsable for Ordering {
    fn parse(b: &mut Banisher) -> Result<Self> {
        super::optional_spaces(b)?;
        Ok(get_required_element![
            b,
            "a relation",
            "a relation is one of the characters <, = or >, with category code other",
            Value::Other('<') => Ordering::Less,
            Value::Other('=') => Ordering::Equal,
            Value::Other('>') => Ordering::Greater,
        ])
    }
}
