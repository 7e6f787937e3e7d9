//! Argument and result values, and their log serialization.
//!
//! A [`Value`] is a read-only snapshot of something passed to or returned
//! from a traced method. [`render_value`] turns it into the text that lands
//! in `${method.args}` and `${method.result}`.

use std::fmt::{self, Write as _};

/// Rendering of a missing value.
pub const NULL_TEXT: &str = "NULL";

/// Rendering of a primitive array whose element type is not recognized.
pub const UNKNOWN_ARRAY_TEXT: &str = "[unknown]";

/// A captured argument or result value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (`None`, unit, JSON `null`).
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// Unsigned integer scalar.
    UInt(u64),
    /// Double-precision floating-point scalar.
    Float(f64),
    /// Single-precision floating-point scalar, kept narrow so it renders
    /// as its own shortest decimal.
    Float32(f32),
    /// Single character.
    Char(char),
    /// Textual value; always rendered quoted.
    Text(String),
    /// Homogeneous array of primitives.
    Primitives(PrimitiveArray),
    /// Array of arbitrary values, rendered element by element.
    Array(Vec<Self>),
    /// Any other object, captured through its textual representation.
    Other(String),
}

/// Homogeneous primitive arrays.
///
/// Element text uses each primitive's canonical form: `true`/`false`,
/// decimal integers, and floats with at least one fractional digit (or
/// `NaN`, `Infinity`, `-Infinity`).
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    Bool(Vec<bool>),
    Char(Vec<char>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    I128(Vec<i128>),
    ISize(Vec<isize>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    U128(Vec<u128>),
    USize(Vec<usize>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    /// Element type the serializer has no canonical form for. Produced by
    /// [`Traceable::trace_slice`] overrides for foreign element types.
    Unrecognized {
        /// Name of the element type, kept for diagnostics only.
        element_type: String,
    },
}

impl Value {
    /// Captures any displayable object through its textual representation.
    pub fn display(value: &impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_value(self))
    }
}

/// Serializes a value for a log line.
///
/// - `Null` → `NULL`
/// - floats → `1.0`, `0.1`; non-finite ones → `NaN`, `Infinity`, `-Infinity`
/// - primitive arrays → `[1, 2, 3]`
/// - arrays → `[x, y]`, each element serialized recursively
/// - text, or any value whose text is empty → `'quoted'`
/// - everything else → its text, unquoted
#[must_use]
pub fn render_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str(NULL_TEXT),
        Value::Bool(b) => push_display(out, b),
        Value::Int(i) => push_display(out, i),
        Value::UInt(u) => push_display(out, u),
        Value::Float(x) => push_float(out, x),
        Value::Float32(x) => push_float(out, x),
        Value::Char(c) => push_display(out, c),
        Value::Text(s) => push_quoted(out, s),
        Value::Other(s) if s.is_empty() => push_quoted(out, s),
        Value::Other(s) => out.push_str(s),
        Value::Primitives(array) => write_primitives(out, array),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
    }
}

fn write_primitives(out: &mut String, array: &PrimitiveArray) {
    match array {
        PrimitiveArray::Bool(v) => join(out, v, push_display),
        PrimitiveArray::Char(v) => join(out, v, push_display),
        PrimitiveArray::I8(v) => join(out, v, push_display),
        PrimitiveArray::I16(v) => join(out, v, push_display),
        PrimitiveArray::I32(v) => join(out, v, push_display),
        PrimitiveArray::I64(v) => join(out, v, push_display),
        PrimitiveArray::I128(v) => join(out, v, push_display),
        PrimitiveArray::ISize(v) => join(out, v, push_display),
        PrimitiveArray::U8(v) => join(out, v, push_display),
        PrimitiveArray::U16(v) => join(out, v, push_display),
        PrimitiveArray::U32(v) => join(out, v, push_display),
        PrimitiveArray::U64(v) => join(out, v, push_display),
        PrimitiveArray::U128(v) => join(out, v, push_display),
        PrimitiveArray::USize(v) => join(out, v, push_display),
        PrimitiveArray::F32(v) => join(out, v, push_float),
        PrimitiveArray::F64(v) => join(out, v, push_float),
        PrimitiveArray::Unrecognized { .. } => out.push_str(UNKNOWN_ARRAY_TEXT),
    }
}

fn join<T>(out: &mut String, items: &[T], mut push: impl FnMut(&mut String, &T)) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push(out, item);
    }
    out.push(']');
}

fn push_display<T: fmt::Display>(out: &mut String, value: &T) {
    // Writing into a String cannot fail
    let _ = write!(out, "{value}");
}

fn push_float<T: fmt::Debug + Copy + Into<f64>>(out: &mut String, value: &T) {
    let wide: f64 = (*value).into();
    if wide.is_nan() {
        out.push_str("NaN");
    } else if wide.is_infinite() {
        out.push_str(if wide > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        // Debug keeps the fractional digit: `1.0`, not `1`
        let _ = write!(out, "{value:?}");
    }
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('\'');
    out.push_str(text);
    out.push('\'');
}

// ============================================================================
// Conversion from JSON
// ============================================================================

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_u64().map(Self::UInt))
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Other(n.to_string())),
            Json::String(s) => Self::Text(s.clone()),
            Json::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Json::Object(_) => Self::Other(json.to_string()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from(&json)
    }
}

// ============================================================================
// Traceable
// ============================================================================

/// Types whose values can be captured as trace arguments or results.
///
/// Slices and vectors of a primitive type become a single
/// [`PrimitiveArray`]; slices of anything else become a [`Value::Array`].
pub trait Traceable {
    /// Captures this value.
    fn trace_value(&self) -> Value;

    /// Captures a slice of this type.
    fn trace_slice(items: &[Self]) -> Value
    where
        Self: Sized,
    {
        Value::Array(items.iter().map(Self::trace_value).collect())
    }
}

macro_rules! traceable_primitive {
    ($($ty:ty => $variant:ident($wide:ty), $array:ident;)*) => {
        $(
            impl Traceable for $ty {
                fn trace_value(&self) -> Value {
                    Value::$variant(<$wide>::from(*self))
                }

                fn trace_slice(items: &[Self]) -> Value {
                    Value::Primitives(PrimitiveArray::$array(items.to_vec()))
                }
            }
        )*
    };
}

traceable_primitive! {
    bool => Bool(bool), Bool;
    char => Char(char), Char;
    i8 => Int(i64), I8;
    i16 => Int(i64), I16;
    i32 => Int(i64), I32;
    i64 => Int(i64), I64;
    u8 => UInt(u64), U8;
    u16 => UInt(u64), U16;
    u32 => UInt(u64), U32;
    u64 => UInt(u64), U64;
    f32 => Float32(f32), F32;
    f64 => Float(f64), F64;
}

// Integers wider than a `Value` scalar are captured through their decimal
// text; their arrays keep the native element type.
macro_rules! traceable_wide_integer {
    ($($ty:ty => $array:ident;)*) => {
        $(
            impl Traceable for $ty {
                fn trace_value(&self) -> Value {
                    Value::Other(self.to_string())
                }

                fn trace_slice(items: &[Self]) -> Value {
                    Value::Primitives(PrimitiveArray::$array(items.to_vec()))
                }
            }
        )*
    };
}

traceable_wide_integer! {
    i128 => I128;
    isize => ISize;
    u128 => U128;
    usize => USize;
}

impl Traceable for str {
    fn trace_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl Traceable for String {
    fn trace_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl Traceable for () {
    fn trace_value(&self) -> Value {
        Value::Null
    }
}

impl Traceable for Value {
    fn trace_value(&self) -> Value {
        self.clone()
    }
}

impl Traceable for serde_json::Value {
    fn trace_value(&self) -> Value {
        Value::from(self)
    }
}

impl<T: Traceable> Traceable for Option<T> {
    fn trace_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Traceable::trace_value)
    }
}

impl<T: Traceable> Traceable for [T] {
    fn trace_value(&self) -> Value {
        T::trace_slice(self)
    }
}

impl<T: Traceable> Traceable for Vec<T> {
    fn trace_value(&self) -> Value {
        T::trace_slice(self)
    }
}

impl<T: Traceable, const N: usize> Traceable for [T; N] {
    fn trace_value(&self) -> Value {
        T::trace_slice(self)
    }
}

impl<T: Traceable + ?Sized> Traceable for &T {
    fn trace_value(&self) -> Value {
        (**self).trace_value()
    }
}

impl<T: Traceable + ?Sized> Traceable for Box<T> {
    fn trace_value(&self) -> Value {
        (**self).trace_value()
    }
}
