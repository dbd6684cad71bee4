//! Serde adapters for the persisted `salesData` layout
//!
//! The browser dashboard writes readings and amounts as JSON numbers, a blank
//! amount as `null` and the pump number as the text typed into the form.
//! Records are read back in either shape and written with numeric fields.

use rust_decimal::Decimal;
use serde::{de, ser, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
struct Number(#[serde(with = "rust_decimal::serde::float")] Decimal);

/// Decimal stored as a JSON number; `null` reads as zero
pub mod number {
    use super::*;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Parsing the decimal text gives the nearest float, which prints back
        // to the same digits for up to 15 significant figures
        let float = value
            .to_string()
            .parse::<f64>()
            .map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_f64(float)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Number>::deserialize(deserializer)
            .map(|value| value.map_or(Decimal::ZERO, |Number(v)| v))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPumpNo {
    Number(u32),
    Text(String),
}

/// Pump number given either as a number or as form text such as `"3"`
pub fn pump_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match RawPumpNo::deserialize(deserializer)? {
        RawPumpNo::Number(n) => Ok(n),
        RawPumpNo::Text(text) => text.trim().parse().map_err(|_| {
            <D::Error as de::Error>::custom(format!("invalid pump number '{}'", text))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::str::FromStr;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        #[serde(with = "number", default)]
        amount: Decimal,
        #[serde(deserialize_with = "pump_number")]
        pump_no: u32,
    }

    #[test]
    fn test_reads_numbers_strings_and_null() {
        let row: Row = serde_json::from_str(r#"{"amount":95.5,"pump_no":"3"}"#).unwrap();
        assert_eq!(row.amount, Decimal::from_str("95.5").unwrap());
        assert_eq!(row.pump_no, 3);

        let row: Row = serde_json::from_str(r#"{"amount":"12.25","pump_no":4}"#).unwrap();
        assert_eq!(row.amount, Decimal::from_str("12.25").unwrap());
        assert_eq!(row.pump_no, 4);

        let row: Row = serde_json::from_str(r#"{"amount":null,"pump_no":" 7 "}"#).unwrap();
        assert_eq!(row.amount, Decimal::ZERO);
        assert_eq!(row.pump_no, 7);

        let row: Row = serde_json::from_str(r#"{"pump_no":1}"#).unwrap();
        assert_eq!(row.amount, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_bad_pump_number() {
        assert!(serde_json::from_str::<Row>(r#"{"amount":1,"pump_no":"P1"}"#).is_err());
    }

    #[test]
    fn test_writes_json_number() {
        let row = Row {
            amount: Decimal::from_str("4619.18481").unwrap(),
            pump_no: 2,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"amount":4619.18481,"pump_no":2}"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }
}
