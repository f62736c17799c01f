// `construct_uint!` expands to code tripping a couple of lints we don't control.
#![allow(clippy::assign_op_pattern, clippy::ptr_offset_with_cast, clippy::manual_range_contains)]
#![allow(missing_docs)]

use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

uint::construct_uint! {
    /// 256-bit unsigned integer, used for all base-unit amounts and allowances.
    pub struct U256(4);
}

impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DecimalVisitor;

        impl<'de> Visitor<'de> for DecimalVisitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a decimal string or unsigned integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<U256, E> {
                U256::from_dec_str(value)
                    .map_err(|error| E::custom(format!("invalid U256 '{}': {:?}", value, error)))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<U256, E> {
                Ok(U256::from(value))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}
