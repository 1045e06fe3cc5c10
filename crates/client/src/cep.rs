use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A Brazilian postal code: exactly eight digits, stored without the mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("CEP must have 8 digits, got {digits}")]
pub struct InvalidCep {
    pub digits: usize,
}

impl Cep {
    /// Parses any input by dropping everything that is not a digit.
    pub fn parse(raw: &str) -> Result<Self, InvalidCep> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == 8 {
            Ok(Self(digits))
        } else {
            Err(InvalidCep {
                digits: digits.len(),
            })
        }
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Display form, `00000-000`.
    pub fn formatted(&self) -> String {
        format!("{}-{}", &self.0[..5], &self.0[5..])
    }
}

impl FromStr for Cep {
    type Err = InvalidCep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cep::parse(s)
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Cep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Cep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Cep::parse(&raw).map_err(serde::de::Error::custom)
    }
}
