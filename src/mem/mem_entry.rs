//! Journal entry module for file-backed memory.
//!
//! This module defines the `MemEntry` enum and its serialization/deserialization implementations,
//! which represent the mutations recorded in a `FileMapped` journal.

use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeTuple,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// A single mutation of a memory array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemEntry<T> {
    /// The cell at the given index now holds the value.
    Set(u64, T),
    /// The array was shrunk to the given length.
    Truncate(u64),
}

impl<T> Serialize for MemEntry<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            MemEntry::Set(index, ref value) => {
                let mut tuple = serializer.serialize_tuple(3)?;
                tuple.serialize_element(&0u8)?; // 0 indicates Set
                tuple.serialize_element(&index)?;
                tuple.serialize_element(value)?;
                tuple.end()
            }
            MemEntry::Truncate(len) => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(&1u8)?; // 1 indicates Truncate
                tuple.serialize_element(&len)?;
                tuple.end()
            }
        }
    }
}

struct MemEntryVisitor<T> {
    marker: std::marker::PhantomData<fn() -> MemEntry<T>>,
}

impl<T> MemEntryVisitor<T> {
    fn new() -> Self {
        MemEntryVisitor {
            marker: std::marker::PhantomData,
        }
    }
}

impl<'de, T> Visitor<'de> for MemEntryVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = MemEntry<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a MemEntry")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let tag: u8 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        match tag {
            0 => {
                let index = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let value = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(2, &self))?;
                Ok(MemEntry::Set(index, value))
            }
            1 => {
                let len = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                Ok(MemEntry::Truncate(len))
            }
            _ => Err(de::Error::invalid_value(
                de::Unexpected::Unsigned(tag as u64),
                &self,
            )),
        }
    }
}

impl<'de, T> Deserialize<'de> for MemEntry<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        const FIELDS: &[&str] = &["tag", "index", "value"];
        deserializer.deserialize_tuple_struct("MemEntry", FIELDS.len(), MemEntryVisitor::new())
    }
}
