use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shown when an order carries no usable address at all.
pub const ADDRESS_UNAVAILABLE: &str = "Address not available";

/// A delivery address as the backend sends it: either a plain display string
/// or a structured record produced by the address form.
#[derive(Debug, Clone, PartialEq)]
pub enum Address {
    Text(String),
    Structured(StructuredAddress),
}

/// The structured form. `typed_address` is what the customer entered,
/// `mapped_address` what the geocoder produced. `raw` keeps the original
/// object for the last-resort display and for re-serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredAddress {
    pub typed_address: Option<String>,
    pub mapped_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area_id: Option<String>,
    pub raw: Map<String, Value>,
}

impl Address {
    /// Single display string for this address.
    ///
    /// Prefers a non-empty `typedAddress`, then a non-empty `mappedAddress`,
    /// then the raw JSON of the object. An empty object resolves to `""`.
    pub fn resolve(&self) -> String {
        match self {
            Address::Text(text) => text.clone(),
            Address::Structured(structured) => structured.resolve(),
        }
    }
}

impl StructuredAddress {
    fn from_map(raw: Map<String, Value>) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        let number = |key: &str| match raw.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Self {
            typed_address: text("typedAddress"),
            mapped_address: text("mappedAddress"),
            latitude: number("latitude"),
            longitude: number("longitude"),
            area_id: text("areaId"),
            raw,
        }
    }

    fn resolve(&self) -> String {
        let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.is_empty()).cloned();
        non_empty(&self.typed_address)
            .or_else(|| non_empty(&self.mapped_address))
            .unwrap_or_else(|| {
                if self.raw.is_empty() {
                    String::new()
                } else {
                    Value::Object(self.raw.clone()).to_string()
                }
            })
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Address::Text(text),
            Value::Object(map) => Address::Structured(StructuredAddress::from_map(map)),
            Value::Null => Address::Text(String::new()),
            other => Address::Text(other.to_string()),
        })
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Address::Text(text) => serializer.serialize_str(text),
            Address::Structured(structured) => structured.raw.serialize(serializer),
        }
    }
}

/// First non-empty resolution among `candidates`, or [`ADDRESS_UNAVAILABLE`].
pub fn resolve_first<'a>(candidates: impl IntoIterator<Item = Option<&'a Address>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(Address::resolve)
        .find(|resolved| !resolved.is_empty())
        .unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string())
}
