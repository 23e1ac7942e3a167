/// `floor(a * b / c)` without intermediate overflow for the ranges used by timing math.
pub(crate) fn mul_div_floor(a: u64, b: u64, c: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) / u128::from(c)) as u64
}

/// `round(a * b / c)` with halves rounded up.
pub(crate) fn mul_div_round(a: u64, b: u64, c: u64) -> u64 {
    let num = u128::from(a) * u128::from(b);
    let c = u128::from(c);
    ((num + c / 2) / c) as u64
}

/// `round(num / den)` with halves rounded up. `den` must be non-zero.
pub(crate) fn div_round(num: u64, den: u64) -> u64 {
    num / den + u64::from(num % den >= den.div_ceil(2))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
