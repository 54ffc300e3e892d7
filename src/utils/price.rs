// src/utils/price.rs

//! EUR price extraction from page text.

use std::sync::LazyLock;

use regex::Regex;

/// Matches Spanish-format amounts with two decimals: `54,99`, `1.234,56`,
/// and the dot-decimal variant `54.99`.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}(?:\.\d{3})+|\d+)[.,](\d{2})\b").unwrap());

/// Same shape but anchored to a trailing euro sign.
static PRICE_EUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}(?:\.\d{3})+|\d+)[.,](\d{2})\s*€").unwrap());

/// Parse the first price found in `text`.
pub fn parse_price(text: &str) -> Option<f64> {
    capture_price(&PRICE_RE, text)
}

/// Parse the first price followed by a `€` sign.
///
/// Stricter variant for free-text card contents, where bare decimals may be
/// ratings or dimensions rather than prices.
pub fn parse_price_eur(text: &str) -> Option<f64> {
    capture_price(&PRICE_EUR_RE, text)
}

fn capture_price(re: &Regex, text: &str) -> Option<f64> {
    let caps = re.captures(text)?;
    let whole = caps[1].replace('.', "");
    let amount: f64 = format!("{whole}.{}", &caps[2]).parse().ok()?;
    (amount >= 0.0).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse_price("54,99"), Some(54.99));
        assert_eq!(parse_price_eur("ahora 54,99 €"), Some(54.99));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parse_price("1.234,56"), Some(1234.56));
        assert_eq!(parse_price_eur("PVP 1.234,56€"), Some(1234.56));
    }

    #[test]
    fn test_dot_decimal() {
        assert_eq!(parse_price("129.95"), Some(129.95));
    }

    #[test]
    fn test_embedded_in_text() {
        assert_eq!(
            parse_price_eur("SSD 1TB — antes 79,99 € con envío"),
            Some(79.99)
        );
    }

    #[test]
    fn test_no_price() {
        assert_eq!(parse_price("sin precio"), None);
        assert_eq!(parse_price_eur("129.95 USD"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_requires_two_decimals() {
        assert_eq!(parse_price("5 unidades"), None);
    }
}
