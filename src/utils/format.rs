use crate::models::Currency;
use num_bigint::BigUint;

const NARROW_NBSP: char = '\u{202F}';
const NBSP: char = '\u{00A0}';

fn group_digits(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// fr-FR style, two fraction digits: `1 234,56`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0,00".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u128;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{},{:02}",
        sign,
        group_digits(&(cents / 100).to_string(), NARROW_NBSP),
        cents % 100
    )
}

/// fr-FR currency style: `1 234,56 $US`, `1 234,56 €`.
pub fn format_currency(value: f64, currency: Currency) -> String {
    let suffix = match currency {
        Currency::Usd => "$US",
        Currency::Eur => "€",
    };
    format!("{}{}{}", format_number(value), NBSP, suffix)
}

/// Balance card value: symbol prefix followed by the formatted number.
pub fn format_card_value(value: f64, currency: Currency) -> String {
    format!("{}{}", currency.symbol(), format_number(value))
}

/// Integer token count with thousands separators: `1,234,567`.
pub fn format_tokens(tokens: &BigUint) -> String {
    group_digits(&tokens.to_string(), ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_use_french_grouping() {
        assert_eq!(format_number(1234.567), "1\u{202F}234,57");
        assert_eq!(format_number(0.0), "0,00");
        assert_eq!(format_number(999.999), "1\u{202F}000,00");
        assert_eq!(format_number(-12.5), "-12,50");
        assert_eq!(format_number(f64::NAN), "0,00");
    }

    #[test]
    fn currency_suffixes() {
        assert_eq!(format_currency(10.0, Currency::Usd), "10,00\u{00A0}$US");
        assert_eq!(format_currency(10.0, Currency::Eur), "10,00\u{00A0}€");
        assert_eq!(format_card_value(3.0, Currency::Eur), "€3,00");
    }

    #[test]
    fn token_counts_group_by_thousands() {
        assert_eq!(format_tokens(&BigUint::from(1_234_567u32)), "1,234,567");
        assert_eq!(format_tokens(&BigUint::from(100u32)), "100");
    }
}
