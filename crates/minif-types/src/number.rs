//! Serde adapter for `f64` fields that may hold NaN or an infinity.
//!
//! JSON has no literal for non-finite numbers, so they are written as the
//! strings `"NaN"`, `"inf"` and `"-inf"`. Finite values stay plain numbers.
//!
//! ```ignore
//! #[serde(with = "minif_types::number")]
//! Number(f64),
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

const NAN: &str = "NaN";
const INFINITY: &str = "inf";
const NEG_INFINITY: &str = "-inf";

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str(NAN)
    } else if *value == f64::INFINITY {
        serializer.serialize_str(INFINITY)
    } else if *value == f64::NEG_INFINITY {
        serializer.serialize_str(NEG_INFINITY)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Finite(f64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Finite(n) => Ok(n),
        Repr::Text(text) => match text.as_str() {
            NAN => Ok(f64::NAN),
            INFINITY => Ok(f64::INFINITY),
            NEG_INFINITY => Ok(f64::NEG_INFINITY),
            other => Err(de::Error::custom(format!("invalid number: {other}"))),
        },
    }
}
