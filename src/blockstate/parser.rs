//! Streaming parser for multipart definitions.
//!
//! The multipart list is read straight off the `serde` token stream with
//! seeds and visitors rather than through an intermediate `Value`, so unknown
//! keys are skipped without being materialized and the condition grammar
//! (`OR`, `AND`, comment keys and pipe-separated property values) is decoded
//! exactly once.

use super::condition::Condition;
use super::multipart::{Multipart, Part};
use crate::error::{MultipartError, Result};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess,
    Visitor,
};
use serde::Deserialize;
use serde_json::error::Category;
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

/// Key whose value is ignored wherever it appears inside a condition object.
pub const COMMENT_KEY: &str = "__comment";

/// Default limit for nested condition objects.
pub const DEFAULT_MAX_CONDITION_DEPTH: usize = 32;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting of condition objects (`when` counts as the first level).
    /// Never below [`DEFAULT_MAX_CONDITION_DEPTH`].
    pub max_condition_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_condition_depth: DEFAULT_MAX_CONDITION_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Create config with a custom condition nesting limit. Values below
    /// [`DEFAULT_MAX_CONDITION_DEPTH`] are raised to it.
    pub fn with_max_condition_depth(mut self, depth: usize) -> Self {
        self.max_condition_depth = depth.max(DEFAULT_MAX_CONDITION_DEPTH);
        self
    }
}

/// Parse a multipart list from a JSON string.
pub fn parse_multipart<V: DeserializeOwned>(json: &str) -> Result<Multipart<V>> {
    parse_multipart_with(json, &ParserConfig::default())
}

/// Parse a multipart list from a JSON string with custom configuration.
pub fn parse_multipart_with<V: DeserializeOwned>(
    json: &str,
    config: &ParserConfig,
) -> Result<Multipart<V>> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    read_multipart(&mut deserializer, config)
}

/// Parse a multipart list from a reader.
pub fn parse_multipart_reader<R, V>(reader: R, config: &ParserConfig) -> Result<Multipart<V>>
where
    R: std::io::Read,
    V: DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    read_multipart(&mut deserializer, config)
}

fn read_multipart<'de, R, V>(
    deserializer: &mut serde_json::Deserializer<R>,
    config: &ParserConfig,
) -> Result<Multipart<V>>
where
    R: serde_json::de::Read<'de>,
    V: Deserialize<'de>,
{
    let payload_failed = Cell::new(false);
    let seed = MultipartSeed::new(config, &payload_failed);

    let parsed = seed
        .deserialize(&mut *deserializer)
        .and_then(|multipart| deserializer.end().map(|()| multipart));

    // Syntax and I/O failures inside `apply` are still structural.
    parsed.map_err(|err| {
        if payload_failed.get() && err.classify() == Category::Data {
            MultipartError::PayloadDeserializationFailed(err)
        } else {
            MultipartError::from_structure(err)
        }
    })
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Multipart<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let config = ParserConfig::default();
        let payload_failed = Cell::new(false);
        MultipartSeed::new(&config, &payload_failed).deserialize(deserializer)
    }
}

/// Reads the top-level `[ {when, apply}, ... ]` array.
struct MultipartSeed<'a, V> {
    config: &'a ParserConfig,
    payload_failed: &'a Cell<bool>,
    marker: PhantomData<fn() -> V>,
}

impl<'a, V> MultipartSeed<'a, V> {
    fn new(config: &'a ParserConfig, payload_failed: &'a Cell<bool>) -> Self {
        Self {
            config,
            payload_failed,
            marker: PhantomData,
        }
    }

    fn part_seed(&self) -> PartSeed<'a, V> {
        PartSeed {
            config: self.config,
            payload_failed: self.payload_failed,
            marker: PhantomData,
        }
    }
}

impl<'de, V: Deserialize<'de>> DeserializeSeed<'de> for MultipartSeed<'_, V> {
    type Value = Multipart<V>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for MultipartSeed<'_, V> {
    type Value = Multipart<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of multipart cases")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut parts = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(part) = seq.next_element_seed(self.part_seed())? {
            if let Some(part) = part {
                parts.push(part);
            }
        }
        Ok(Multipart::from_parts(parts))
    }
}

/// Reads one `{ "when": ..., "apply": ... }` case. Cases without `apply`
/// yield `None`.
struct PartSeed<'a, V> {
    config: &'a ParserConfig,
    payload_failed: &'a Cell<bool>,
    marker: PhantomData<fn() -> V>,
}

impl<'de, V: Deserialize<'de>> DeserializeSeed<'de> for PartSeed<'_, V> {
    type Value = Option<Part<V>>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for PartSeed<'_, V> {
    type Value = Option<Part<V>>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a multipart case object")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut when = None;
        let mut apply = None;

        while let Some(key) = map.next_key::<PartKey>()? {
            match key {
                PartKey::When => {
                    when = Some(map.next_value_seed(ConditionSeed::root(self.config))?);
                }
                PartKey::Apply => {
                    apply = Some(map.next_value_seed(PayloadSeed::<V> {
                        failed: self.payload_failed,
                        marker: PhantomData,
                    })?);
                }
                PartKey::Other(name) => {
                    log::trace!("Skipping unknown multipart key {:?}", name);
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let condition = when.unwrap_or_else(Condition::always);
        match apply {
            Some(apply) => Ok(Some(Part::new(condition, apply))),
            None => {
                log::debug!("Dropping multipart case without apply (when {})", condition);
                Ok(None)
            }
        }
    }
}

/// Deserializes the `apply` payload and records whether it failed, so the
/// caller can tell payload errors from structural ones.
struct PayloadSeed<'a, V> {
    failed: &'a Cell<bool>,
    marker: PhantomData<fn() -> V>,
}

impl<'de, V: Deserialize<'de>> DeserializeSeed<'de> for PayloadSeed<'_, V> {
    type Value = V;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<V, D::Error>
    where
        D: Deserializer<'de>,
    {
        V::deserialize(deserializer).map_err(|err| {
            self.failed.set(true);
            err
        })
    }
}

/// Reads a condition object into a conjunction of its entries.
#[derive(Clone, Copy)]
struct ConditionSeed<'a> {
    config: &'a ParserConfig,
    depth: usize,
}

impl<'a> ConditionSeed<'a> {
    fn root(config: &'a ParserConfig) -> Self {
        Self { config, depth: 1 }
    }

    fn nested(self) -> ConditionListSeed<'a> {
        ConditionListSeed {
            config: self.config,
            depth: self.depth + 1,
        }
    }
}

impl<'de> DeserializeSeed<'de> for ConditionSeed<'_> {
    type Value = Condition;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Condition, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ConditionSeed<'_> {
    type Value = Condition;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a condition object")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Condition, A::Error>
    where
        A: MapAccess<'de>,
    {
        if self.depth > self.config.max_condition_depth {
            return Err(de::Error::custom(format!(
                "conditions nested deeper than {} levels",
                self.config.max_condition_depth
            )));
        }

        let mut conditions = Vec::new();
        while let Some(key) = map.next_key::<ConditionKey>()? {
            match key {
                ConditionKey::Comment => {
                    map.next_value::<IgnoredAny>()?;
                }
                ConditionKey::Or => {
                    conditions.push(Condition::Any(map.next_value_seed(self.nested())?));
                }
                ConditionKey::And => {
                    conditions.push(Condition::All(map.next_value_seed(self.nested())?));
                }
                ConditionKey::Property(name) => {
                    let StringOrBool(value) = map.next_value()?;
                    conditions.push(Condition::property(name, &value));
                }
            }
        }
        Ok(Condition::and(conditions))
    }
}

/// Reads the array operand of `OR` / `AND`.
struct ConditionListSeed<'a> {
    config: &'a ParserConfig,
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for ConditionListSeed<'_> {
    type Value = Vec<Condition>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for ConditionListSeed<'_> {
    type Value = Vec<Condition>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of condition objects")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let element = ConditionSeed {
            config: self.config,
            depth: self.depth,
        };
        let mut conditions = Vec::new();
        while let Some(condition) = seq.next_element_seed(element)? {
            conditions.push(condition);
        }
        Ok(conditions)
    }
}

/// Keys of a multipart case object.
enum PartKey {
    When,
    Apply,
    Other(String),
}

impl<'de> Deserialize<'de> for PartKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PartKeyVisitor;

        impl<'de> Visitor<'de> for PartKeyVisitor {
            type Value = PartKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a multipart case key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<PartKey, E> {
                Ok(match v {
                    "when" => PartKey::When,
                    "apply" => PartKey::Apply,
                    other => PartKey::Other(other.to_string()),
                })
            }
        }

        deserializer.deserialize_identifier(PartKeyVisitor)
    }
}

/// Keys of a condition object.
enum ConditionKey {
    Or,
    And,
    Comment,
    Property(String),
}

impl<'de> Deserialize<'de> for ConditionKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ConditionKeyVisitor;

        impl<'de> Visitor<'de> for ConditionKeyVisitor {
            type Value = ConditionKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a property name, \"OR\" or \"AND\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ConditionKey, E> {
                Ok(match v {
                    "OR" => ConditionKey::Or,
                    "AND" => ConditionKey::And,
                    COMMENT_KEY => ConditionKey::Comment,
                    name => ConditionKey::Property(name.to_string()),
                })
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<ConditionKey, E> {
                match v.as_str() {
                    "OR" | "AND" | COMMENT_KEY => self.visit_str(&v),
                    _ => Ok(ConditionKey::Property(v)),
                }
            }
        }

        deserializer.deserialize_identifier(ConditionKeyVisitor)
    }
}

/// A property value written as a string or a boolean; booleans become
/// `"true"` / `"false"`.
struct StringOrBool(String);

impl<'de> Deserialize<'de> for StringOrBool {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringOrBoolVisitor;

        impl<'de> Visitor<'de> for StringOrBoolVisitor {
            type Value = StringOrBool;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or boolean property value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<StringOrBool, E> {
                Ok(StringOrBool(if v { "true" } else { "false" }.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<StringOrBool, E> {
                Ok(StringOrBool(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<StringOrBool, E> {
                Ok(StringOrBool(v))
            }
        }

        deserializer.deserialize_any(StringOrBoolVisitor)
    }
}
