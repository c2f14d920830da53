use futures::stream::{self, StreamExt};
use log::warn;
use num_bigint::BigUint;
use num_traits::Zero;
use std::future::Future;
use std::str::FromStr;

/// Runs one future per item, at most `limit` in flight, and waits for every
/// one of them to settle. Results come back in input order; a failure in one
/// slot never touches another.
pub async fn settle_all<I, T, F, Fut, O, E>(items: I, limit: usize, op: F) -> Vec<Result<O, E>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<O, E>>,
{
    stream::iter(items)
        .map(op)
        .buffered(limit.max(1))
        .collect::<Vec<_>>()
        .await
}

/// Integer digits of an amount, dropping quotes and any fractional part.
pub fn integer_part(amount: &str) -> &str {
    amount
        .trim()
        .trim_matches('"')
        .split('.')
        .next()
        .unwrap_or("0")
}

/// Parses an upstream token count. Anything that is not a non-negative
/// integer reads as zero so that ordering by stake stays total.
pub fn parse_token_count(amount: &str) -> BigUint {
    let digits = integer_part(amount);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        warn!("Malformed token count {:?}, treating as zero", amount);
        return BigUint::zero();
    }
    match BigUint::from_str(digits) {
        Ok(value) => value,
        Err(e) => {
            warn!("Malformed token count {:?}, treating as zero: {}", amount, e);
            BigUint::zero()
        }
    }
}

/// Renders a base-denomination integer in display units, e.g. uatom to ATOM.
pub fn to_display_units(base: &BigUint, exponent: u32) -> String {
    let raw = base.to_string();
    let exponent = exponent as usize;
    if exponent == 0 {
        return raw;
    }

    let padded = if raw.len() <= exponent {
        format!("{}{}", "0".repeat(exponent - raw.len() + 1), raw)
    } else {
        raw
    };
    let (whole, fraction) = padded.split_at(padded.len() - exponent);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_counts_parse_or_fall_back_to_zero() {
        assert_eq!(parse_token_count("300"), BigUint::from(300u32));
        assert_eq!(parse_token_count("\"42\""), BigUint::from(42u32));
        assert_eq!(parse_token_count("7.9"), BigUint::from(7u32));
        assert_eq!(
            parse_token_count("123456789012345678901234567890").to_string(),
            "123456789012345678901234567890"
        );
        assert!(parse_token_count("").is_zero());
        assert!(parse_token_count("abc").is_zero());
        assert!(parse_token_count("-5").is_zero());
        assert!(parse_token_count("1_000").is_zero());
        assert!(parse_token_count("+7").is_zero());
        assert!(parse_token_count(" 12 34").is_zero());
    }

    #[test]
    fn display_units_shift_by_exponent() {
        assert_eq!(to_display_units(&BigUint::from(1_234_567u32), 6), "1.234567");
        assert_eq!(to_display_units(&BigUint::from(5_000_000u32), 6), "5");
        assert_eq!(to_display_units(&BigUint::from(1_500u32), 6), "0.0015");
        assert_eq!(to_display_units(&BigUint::zero(), 6), "0");
        assert_eq!(to_display_units(&BigUint::from(12u32), 0), "12");
    }

    #[tokio::test]
    async fn settle_all_keeps_order_and_isolates_failures() {
        let results = settle_all(vec![1u32, 2, 3, 4], 2, |n| async move {
            if n == 3 {
                Err(format!("boom {}", n))
            } else {
                Ok(n * 10)
            }
        })
        .await;

        assert_eq!(
            results,
            vec![Ok(10), Ok(20), Err("boom 3".to_string()), Ok(40)]
        );
    }

    #[tokio::test]
    async fn settle_all_on_nothing_is_empty() {
        let results: Vec<Result<u32, String>> =
            settle_all(Vec::<u32>::new(), 0, |n| async move { Ok(n) }).await;
        assert!(results.is_empty());
    }
}
