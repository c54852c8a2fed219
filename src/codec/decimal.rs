//! Fixed-point decimal arithmetic for the final `raw * factor + offset` step.
//!
//! Factors such as `0.1` have no exact binary representation, so a plain
//! `f64` multiply-then-add drifts for large raw values. Operands are rounded
//! to 15 significant digits (all an `f64` reliably carries) and combined
//! exactly in `i128`; the result is rounded to `f64` once.

/// `mantissa * 10^exponent`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Decimal {
    mantissa: i128,
    exponent: i32,
}

const SIGNIFICANT_DIGITS: usize = 15;
const MANTISSA_LIMIT: u128 = 1_000_000_000_000_000;

/// Powers of ten that are exact in `f64`.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// `value / 10^exponent` rounded to an integer.
fn round_scaled(value: f64, exponent: i32) -> Option<i128> {
    let power: f64 = *POW10.get(exponent.unsigned_abs() as usize)?;
    let scaled: f64 = if exponent < 0 {
        value * power
    } else {
        value / power
    };
    Some(scaled.round() as i128)
}

impl Decimal {
    pub(crate) fn from_int(value: i128) -> Self {
        Self {
            mantissa: value,
            exponent: 0,
        }
        .normalized()
    }

    /// `None` for NaN, infinities and magnitudes whose scaling power is not
    /// exact in `f64` (below about `1e-8` or above about `1e36`).
    pub(crate) fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        if value == 0.0 {
            return Some(Self::from_int(0));
        }
        let digits: i32 = SIGNIFICANT_DIGITS as i32;
        // log10 can land one off near powers of ten; the mantissa check corrects it
        let mut exponent: i32 = value.abs().log10().floor() as i32 - (digits - 1);
        let mut mantissa: i128 = round_scaled(value, exponent)?;
        if mantissa.unsigned_abs() >= MANTISSA_LIMIT {
            exponent += 1;
            mantissa = round_scaled(value, exponent)?;
        } else if mantissa.unsigned_abs() < MANTISSA_LIMIT / 10 {
            exponent -= 1;
            mantissa = round_scaled(value, exponent)?;
        }
        Some(Self { mantissa, exponent }.normalized())
    }

    pub(crate) fn checked_mul(self, rhs: Self) -> Option<Self> {
        Some(
            Self {
                mantissa: self.mantissa.checked_mul(rhs.mantissa)?,
                exponent: self.exponent.checked_add(rhs.exponent)?,
            }
            .normalized(),
        )
    }

    pub(crate) fn checked_add(self, rhs: Self) -> Option<Self> {
        let (high, low) = if self.exponent >= rhs.exponent {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let gap: u32 = u32::try_from(high.exponent - low.exponent).ok()?;
        let aligned: i128 = high.mantissa.checked_mul(10i128.checked_pow(gap)?)?;
        Some(
            Self {
                mantissa: aligned.checked_add(low.mantissa)?,
                exponent: low.exponent,
            }
            .normalized(),
        )
    }

    /// Nearest `f64`. Exact powers of ten keep this correctly rounded while
    /// the mantissa fits 53 bits.
    pub(crate) fn to_f64(self) -> f64 {
        let mantissa: f64 = self.mantissa as f64;
        match POW10.get(self.exponent.unsigned_abs() as usize) {
            Some(power) if self.exponent < 0 => mantissa / power,
            Some(power) => mantissa * power,
            None => mantissa * 10f64.powi(self.exponent),
        }
    }

    fn normalized(mut self) -> Self {
        if self.mantissa == 0 {
            self.exponent = 0;
            return self;
        }
        while self.mantissa % 10 == 0 {
            self.mantissa /= 10;
            self.exponent += 1;
        }
        self
    }
}

/// `raw * factor + offset`, exact up to the final rounding when the operands
/// fit; otherwise plain `f64` arithmetic.
pub(crate) fn scale(raw: i128, factor: f64, offset: f64) -> f64 {
    Decimal::from_f64(factor)
        .zip(Decimal::from_f64(offset))
        .and_then(|(factor, offset)| Decimal::from_int(raw).checked_mul(factor)?.checked_add(offset))
        .map(Decimal::to_f64)
        .unwrap_or_else(|| raw as f64 * factor + offset)
}
