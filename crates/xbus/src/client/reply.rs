use crate::Value;

/// The values returned by a method call.
///
/// # Examples
///
/// ```
/// use xbus::{Reply, Value};
///
/// assert_eq!(Reply::from(vec![]), Reply::Empty);
/// assert_eq!(Reply::from(vec![Value::Uint32(1)]), Reply::Single(Value::Uint32(1)));
///
/// let reply = Reply::from(vec![Value::Uint32(1), Value::Uint32(2)]);
/// assert_eq!(reply.into_values(), [Value::Uint32(1), Value::Uint32(2)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The method returned nothing.
    Empty,
    /// The method returned a single value.
    Single(Value),
    /// The method returned more than one value.
    Multiple(Vec<Value>),
}

impl Reply {
    /// Convert the reply into a list of values, regardless of how many there
    /// are.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Reply::Empty => Vec::new(),
            Reply::Single(value) => vec![value],
            Reply::Multiple(values) => values,
        }
    }
}

impl From<Vec<Value>> for Reply {
    fn from(values: Vec<Value>) -> Self {
        if values.is_empty() {
            return Reply::Empty;
        }

        match <[Value; 1]>::try_from(values) {
            Ok([value]) => Reply::Single(value),
            Err(values) => Reply::Multiple(values),
        }
    }
}
