use std::collections::hash_map::{Entry, HashMap};
use std::mem;
use std::os::fd::RawFd;
use std::slice;
use std::vec;

use super::Value;

/// An insertion-ordered mapping decoded from an array of dict entries.
///
/// Inserting a key which already exists replaces its value in place, so when
/// decoding the last occurrence of a key wins.
///
/// # Examples
///
/// ```
/// use xbus::{Dict, Value};
///
/// let mut dict = Dict::new();
/// dict.insert(Value::from("a"), Value::from(1u32));
/// dict.insert(Value::from("b"), Value::from(2u32));
/// dict.insert(Value::from("a"), Value::from(3u32));
///
/// assert_eq!(dict.len(), 2);
/// assert_eq!(dict.get("a"), Some(&Value::from(3u32)));
///
/// let keys = dict.keys().filter_map(Value::as_str).collect::<Vec<_>>();
/// assert_eq!(keys, ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
    /// Position of each entry with a basic key.
    index: HashMap<Key, usize>,
}

impl Dict {
    /// Construct a new empty dict.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value of the key if there was
    /// one.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        let position = match Key::new(&key) {
            Some(k) => match self.index.entry(k) {
                Entry::Occupied(e) => Some(*e.get()),
                Entry::Vacant(e) => {
                    e.insert(self.entries.len());
                    None
                }
            },
            None => self.entries.iter().position(|(k, _)| *k == key),
        };

        if let Some((_, existing)) = position.and_then(|n| self.entries.get_mut(n)) {
            return Some(mem::replace(existing, value));
        }

        self.entries.push((key, value));
        None
    }

    /// Get the value associated with a key.
    pub fn get<Q>(&self, key: &Q) -> Option<&Value>
    where
        Q: ?Sized,
        Value: PartialEq<Q>,
    {
        self.entries
            .iter()
            .find_map(|(k, v)| (*k == *key).then_some(v))
    }

    /// The number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Test if the dict is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, (Value, Value)> {
        self.entries.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl PartialEq for Dict {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<(Value, Value)> for Dict {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut dict = Dict::new();

        for (key, value) in iter {
            dict.insert(key, value);
        }

        dict
    }
}

impl IntoIterator for Dict {
    type Item = (Value, Value);
    type IntoIter = vec::IntoIter<(Value, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = &'a (Value, Value);
    type IntoIter = slice::Iter<'a, (Value, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A hashable form of a basic value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Byte(u8),
    Bool(bool),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Double(u64),
    String(Box<str>),
    ObjectPath(Box<str>),
    Signature(Box<str>),
    UnixFd(RawFd),
}

impl Key {
    /// Keys which don't compare equal to themselves and container keys are
    /// not indexed.
    fn new(value: &Value) -> Option<Self> {
        let key = match value {
            Value::Byte(v) => Key::Byte(*v),
            Value::Bool(v) => Key::Bool(*v),
            Value::Int16(v) => Key::Int16(*v),
            Value::Uint16(v) => Key::Uint16(*v),
            Value::Int32(v) => Key::Int32(*v),
            Value::Uint32(v) => Key::Uint32(*v),
            Value::Int64(v) => Key::Int64(*v),
            Value::Uint64(v) => Key::Uint64(*v),
            Value::Double(v) if v.is_nan() => return None,
            // -0.0 == 0.0
            Value::Double(v) if *v == 0.0 => Key::Double(0),
            Value::Double(v) => Key::Double(v.to_bits()),
            Value::String(s) => Key::String(s.as_str().into()),
            Value::ObjectPath(s) => Key::ObjectPath(s.as_str().into()),
            Value::Signature(s) => Key::Signature(s.as_str().into()),
            Value::UnixFd(fd) => Key::UnixFd(*fd),
            _ => return None,
        };

        Some(key)
    }
}
