//! Serde adapter for raw `u128` token amounts.
//!
//! Some formats (TOML in particular) have no 128-bit integers. Amounts that fit
//! an `i64` are written as plain integers; larger ones are written as decimal
//! strings. Reading accepts either form, and `_` separators in strings.
//!
//! ```ignore
//! #[serde(with = "tcr_types::amount")]
//! pub deposit: u128,
//! ```

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    match i64::try_from(*value) {
        Ok(small) => serializer.serialize_i64(small),
        Err(_) => serializer.collect_str(value),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = u128;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(u128::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u128::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let digits: String = v.chars().filter(|c| *c != '_').collect();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        digits
            .parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holding {
        #[serde(with = "crate::amount")]
        amount: u128,
    }

    #[test]
    fn small_amounts_are_plain_toml_integers() {
        let text = toml::to_string(&Holding { amount: 21_000_000 }).unwrap();
        assert_eq!(text.trim(), "amount = 21000000");
        let back: Holding = toml::from_str(&text).unwrap();
        assert_eq!(back.amount, 21_000_000);
    }

    #[test]
    fn large_amounts_round_trip_as_strings() {
        let supply = 1_000_000_000u128 * 10u128.pow(18);
        let text = toml::to_string(&Holding { amount: supply }).unwrap();
        assert_eq!(text.trim(), format!("amount = \"{}\"", supply));
        let back: Holding = toml::from_str(&text).unwrap();
        assert_eq!(back.amount, supply);
    }

    #[test]
    fn strings_may_use_separators() {
        let h: Holding = toml::from_str("amount = \"1_000_000\"").unwrap();
        assert_eq!(h.amount, 1_000_000);
    }

    #[test]
    fn negative_and_malformed_amounts_are_rejected() {
        assert!(toml::from_str::<Holding>("amount = -1").is_err());
        assert!(toml::from_str::<Holding>("amount = \"12ab\"").is_err());
        assert!(toml::from_str::<Holding>("amount = \"\"").is_err());
    }

    #[test]
    fn json_keeps_numbers() {
        let json = serde_json::to_string(&Holding { amount: 7 }).unwrap();
        assert_eq!(json, "{\"amount\":7}");
    }
}
