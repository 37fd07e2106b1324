use super::Value;

/// A value together with the signature describing it.
///
/// The signature is kept verbatim as it was received or constructed.
///
/// # Examples
///
/// ```
/// use xbus::{Value, Variant};
///
/// let variant = Variant::new("s", Value::from("hello"));
/// assert_eq!(variant.signature(), "s");
/// assert_eq!(variant.value(), &Value::from("hello"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    signature: String,
    value: Value,
}

impl Variant {
    /// Construct a new variant.
    ///
    /// The signature must describe exactly one complete type matching the
    /// value, which is checked when the variant is written.
    pub fn new(signature: impl Into<String>, value: Value) -> Self {
        Self {
            signature: signature.into(),
            value,
        }
    }

    /// The signature of the variant.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The value of the variant.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Convert into the value of the variant.
    #[inline]
    pub fn into_value(self) -> Value {
        self.value
    }
}
