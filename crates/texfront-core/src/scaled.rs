//! Fixed-point dimensions (TeX.2021.99-108).

use std::fmt::Write;

/// A fixed-point number with 16 bits after the binary point.
///
/// TeX stores every dimension this way; the wrapped integer is the value in
/// scaled points, i.e. the number times 2^16.
/// Only values of magnitude at most [Scaled::MAX_DIMEN] are legal TeX dimensions,
/// even though the type can hold values up to twice that size.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaled(pub i32);

// 2^16, the number of scaled points in a point.
const UNITY: i32 = 0o200000;

impl Scaled {
    pub const ZERO: Scaled = Scaled(0);
    pub const ONE: Scaled = Scaled(UNITY);
    pub const TWO: Scaled = Scaled(2 * UNITY);

    /// The largest legal dimension, `16383.99998pt` (TeX.2021.421).
    pub const MAX_DIMEN: Scaled = Scaled(0o7777777777);

    /// Converts a whole number of points.
    ///
    /// Fails unless the magnitude of the integer is below 2^14.
    pub fn from_integer(i: i32) -> Result<Scaled, OverflowError> {
        match i.checked_mul(UNITY) {
            Some(v) if i.unsigned_abs() < (1 << 14) => Ok(Scaled(v)),
            _ => Err(OverflowError),
        }
    }

    /// Rounds a decimal fraction `0.d1d2d3...` to the nearest scaled value (TeX.2021.102).
    ///
    /// Digits past the seventeenth cannot change the result and may be dropped by callers.
    pub fn from_decimal_fraction(digits: &[u8]) -> Scaled {
        let twice = digits
            .iter()
            .rev()
            .fold(0_i32, |acc, &d| (acc + i32::from(d) * 2 * UNITY) / 10);
        Scaled((twice + 1) / 2)
    }

    /// Returns the quotient and remainder of _xn/d_, with _x_ the receiver (TeX.2021.107).
    ///
    /// Both _n_ and _d_ must lie in `[0, 2^16]` and _d_ must be positive.
    /// The intermediate product is computed in 64 bits.
    pub fn xn_over_d(&self, n: i32, d: i32) -> Result<(Scaled, Scaled), OverflowError> {
        debug_assert!((0..=UNITY).contains(&n));
        debug_assert!(d > 0 && d <= UNITY);
        let product = i64::from(self.0) * i64::from(n);
        let (quotient, remainder) = (product / i64::from(d), product % i64::from(d));
        if quotient.abs() > i64::from(Scaled::MAX_DIMEN.0) {
            return Err(OverflowError);
        }
        Ok((Scaled(quotient as i32), Scaled(remainder as i32)))
    }

    /// Computes _nx + y_, failing if the result is not a legal dimension (TeX.2021.105).
    pub fn nx_plus_y(self, n: i32, y: Scaled) -> Result<Scaled, OverflowError> {
        if n == 0 {
            return Ok(y);
        }
        let (n, x) = if n < 0 { (-n, -self) } else { (n, self) };
        let limit = Scaled::MAX_DIMEN;
        let fits = x <= (limit - y) / n && -x <= (limit + y) / n;
        if !fits {
            return Err(OverflowError);
        }
        Ok(x * n + y)
    }

    /// Division by an integer, truncating towards zero (TeX.2021.106).
    pub fn checked_div(self, n: i32) -> Result<Scaled, OverflowError> {
        self.0.checked_div(n).map(Scaled).ok_or(OverflowError)
    }

    pub fn integer_part(self) -> i32 {
        self.0 / UNITY
    }

    pub fn fractional_part(self) -> Scaled {
        Scaled(self.0 % UNITY)
    }

    pub fn abs(self) -> Scaled {
        Scaled(self.0.abs())
    }
}

/// An arithmetic result fell outside the range of legal dimensions.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct OverflowError;

impl std::fmt::Display for OverflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arithmetic overflow")
    }
}

impl std::error::Error for OverflowError {}

/// Prints the shortest decimal that reads back as the same value, followed by `pt`.
///
/// This is `print_scaled` from TeX.2021.103.
impl std::fmt::Display for Scaled {
    fn fmt(&self, fm: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unity = i64::from(UNITY);
        let mut s = i64::from(self.0);
        if s < 0 {
            fm.write_char('-')?;
            s = -s;
        }
        write!(fm, "{}.", s / unity)?;
        let mut f = 10 * (s % unity) + 5;
        let mut delta = 10;
        loop {
            if delta > unity {
                f += 0o100000 - 50000;
            }
            write!(fm, "{}", f / unity)?;
            f = 10 * (f % unity);
            delta *= 10;
            if f <= delta {
                break;
            }
        }
        fm.write_str("pt")
    }
}

macro_rules! scaled_ops {
    ($( $trait: ident :: $method: ident ( $rhs: ty ) => |$a: ident, $b: ident| $body: expr; )+) => {
        $(
        impl std::ops::$trait<$rhs> for Scaled {
            type Output = Scaled;
            fn $method(self, rhs: $rhs) -> Scaled {
                let ($a, $b) = (self.0, rhs);
                Scaled($body)
            }
        }
        )+
    };
}

scaled_ops![
    Add::add(Scaled) => |a, b| a + b.0;
    Sub::sub(Scaled) => |a, b| a - b.0;
    Mul::mul(i32) => |a, b| a * b;
    Div::div(i32) => |a, b| a / b;
    Rem::rem(i32) => |a, b| a % b;
];

impl std::ops::Neg for Scaled {
    type Output = Scaled;
    fn neg(self) -> Scaled {
        Scaled(-self.0)
    }
}
