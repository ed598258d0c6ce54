//! Protocol-level type encoding.
//!
//! The host describes types as JSON: primitives are bare strings
//! (`"string"`), collections are two-element arrays (`["list","number"]`)
//! and objects carry their field map (`["object",{"id":"string"}]`).

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireType {
    String,
    Number,
    Bool,
    List(Box<WireType>),
    Set(Box<WireType>),
    Map(Box<WireType>),
    Object(BTreeMap<String, WireType>),
}

impl WireType {
    fn tag(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Encodes the type as the JSON the host expects.
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing into a Value cannot fail: every key is a String.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for WireType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String | Self::Number | Self::Bool => {
                serializer.serialize_str(self.tag())
            }
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(elem.as_ref())?;
                seq.end()
            }
            Self::Object(attrs) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(attrs)?;
                seq.end()
            }
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
