/// Reads the next expanded instruction and matches the value of its token.
///
/// Returns [None] and puts the instruction back if none of the patterns match.
macro_rules! get_optional_element {
    ($b: expr, $($pat:pat => $result:expr,)+) => {
        match ($b).next_expanded()? {
            None => None,
            Some(it) => match it.token.value() {
                $(
                    $pat => Some($result),
                )+
                _ => {
                    ($b).push_back(it);
                    None
                }
            },
        }
    };
}

/// Reads the next expanded instruction, which must match one of the patterns.
///
/// Otherwise the instruction is put back and the enclosing function returns a syntax error.
macro_rules! get_required_element {
    ($b: expr, $expected: expr, $guidance: expr, $($pat:pat => $result:expr,)+) => {
        match ($b).next_expanded()? {
            None => return Err(($b).syntax_error(&$expected, None, &$guidance)),
            Some(it) => match it.token.value() {
                $(
                    $pat => $result,
                )+
                _ => {
                    let got = it.token;
                    ($b).push_back(it);
                    return Err(($b).syntax_error(&$expected, Some(got), &$guidance));
                }
            },
        }
    };
}
