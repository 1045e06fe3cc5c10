//! Decimal amounts as the backend sends them.
//!
//! Prices arrive as JSON numbers or as strings (`"39.90"`, sometimes
//! `"39,90"`). They are held as `f64` and always sent back as two-decimal
//! strings.

use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn into_amount<E: de::Error>(self) -> Result<f64, E> {
        match self {
            RawAmount::Number(value) => Ok(value),
            RawAmount::Text(text) => {
                parse_decimal(&text).ok_or_else(|| E::custom(format!("invalid decimal: {text:?}")))
            }
        }
    }
}

/// Parses `"12.50"`, `"12,50"` or `" 12 "`. Returns `None` for anything else.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Two-decimal string the backend accepts for `DecimalField`s.
pub fn to_decimal_string(value: f64) -> String {
    format!("{value:.2}")
}

/// Brazilian currency display: `R$ 1.234,50`.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let (units, cents) = (cents / 100, cents % 100);

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (units > 0 || cents > 0) { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents:02}")
}

pub mod decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_decimal_string(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        RawAmount::deserialize(deserializer)?.into_amount()
    }
}

pub mod optional_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&to_decimal_string(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<RawAmount>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawAmount::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(raw) => raw.into_amount().map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "decimal")]
        preco: f64,
        #[serde(default, with = "optional_decimal")]
        desconto: Option<f64>,
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let a: Priced = serde_json::from_value(json!({"preco": 39.9})).unwrap();
        let b: Priced =
            serde_json::from_value(json!({"preco": "39,90", "desconto": "5.00"})).unwrap();
        assert_eq!(a.preco, 39.9);
        assert_eq!(b.preco, 39.9);
        assert_eq!(b.desconto, Some(5.0));
        assert_eq!(a.desconto, None);
    }

    #[test]
    fn serializes_two_decimals() {
        let value = serde_json::to_value(Priced {
            preco: 10.0,
            desconto: None,
        })
        .unwrap();
        assert_eq!(value, json!({"preco": "10.00", "desconto": null}));
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_value::<Priced>(json!({"preco": "abc"})).is_err());
        assert_eq!(parse_decimal("  "), None);
    }

    #[test]
    fn formats_brl() {
        assert_eq!(format_brl(12.5), "R$ 12,50");
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
    }
}
