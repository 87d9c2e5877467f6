//! Number formatting shared by the views.

/// Fixed-point text with `digits` decimals.
///
/// `{:.N}` breaks an exact tie toward the even digit; this breaks it away
/// from zero, so 2.625 becomes "2.63" and 0.125 becomes "0.13". Values that
/// only look like ties in decimal (1.005) are not exact and format as usual.
pub fn to_fixed(value: f64, digits: u8) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let plain = format!("{abs:.*}", usize::from(digits));
    let fixed = match exact_tie(abs, digits) {
        Some(wider) => {
            let truncated = wider.strip_suffix('5').unwrap_or(&wider);
            round_up(truncated.strip_suffix('.').unwrap_or(truncated))
        }
        None => plain,
    };
    format!("{sign}{fixed}")
}

/// The exact `digits + 1` decimal expansion of `abs` when it ends in a 5 that
/// sits exactly halfway between two `digits` decimal values.
fn exact_tie(abs: f64, digits: u8) -> Option<String> {
    // A halfway value is k + 1/2 in units of 10^-digits. Binary can only hold
    // it when the denominator reduces to 2^(digits + 1), and then the
    // expansion below is exact.
    let scaled = abs * 2f64.powi(i32::from(digits) + 1);
    if scaled.fract() != 0.0 {
        return None;
    }
    let wider = format!("{abs:.*}", usize::from(digits) + 1);
    wider.ends_with('5').then_some(wider)
}

/// Add one to the last digit of a plain decimal string, carrying leftwards.
fn round_up(truncated: &str) -> String {
    let mut bytes = truncated.as_bytes().to_vec();
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        match *b {
            b'.' => {}
            b'9' => *b = b'0',
            _ => {
                *b += 1;
                carry = false;
                break;
            }
        }
    }
    let mut out: String = bytes.into_iter().map(char::from).collect();
    if carry {
        out.insert(0, '1');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ties_round_away_from_zero() {
        assert_eq!(to_fixed(2.625, 2), "2.63");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(1.375, 2), "1.38");
        assert_eq!(to_fixed(-2.625, 2), "-2.63");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(0.5, 0), "1");
    }

    #[test]
    fn carry_ripples_through_nines() {
        assert_eq!(to_fixed(9.875, 2), "9.88");
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(0.9375, 3), "0.938");
    }

    #[test]
    fn non_ties_match_plain_formatting() {
        // 1.005 is stored slightly below the halfway point.
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(1.234_567, 2), "1.23");
        assert_eq!(to_fixed(20.0, 2), "20.00");
        assert_eq!(to_fixed(987.654_321, 2), "987.65");
        assert_eq!(to_fixed(1e21, 2), format!("{:.2}", 1e21));
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(to_fixed(-0.0, 2), "0.00");
        assert_eq!(to_fixed(0.0, 2), "0.00");
    }
}
