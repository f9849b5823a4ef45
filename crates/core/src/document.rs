//! Document value model
//!
//! This module defines the tree every [`Bundle`](crate::Bundle) wraps:
//! - DocValue: Newtype wrapper around serde_json::Value
//! - DocPath: Path from the document root to a nested node
//! - PathSegment: Individual path component (Key or Index)
//!
//! A value is one of null, boolean, number (integer, long integer or float),
//! string, array or object. Numbers share the JSON representation, so the
//! integer width is chosen by the reader, not the writer.
//!
//! ## Lenient reads
//!
//! Scalar accessors never fail. The `coerce_*` helpers convert whatever is
//! stored into the requested shape where a sensible conversion exists:
//!
//! | Target | Accepted |
//! |--------|----------|
//! | bool | `true`/`false`, or the strings `"true"`/`"false"` (any case) |
//! | integer | any number (floats truncate), or a numeric string |
//! | float | any number, or a numeric string |
//! | string | strings as-is, other scalars as their JSON text |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use thiserror::Error;

/// Document value
///
/// Newtype around serde_json::Value providing:
/// - Direct access to underlying serde_json::Value via Deref/DerefMut
/// - Easy construction from common types
/// - Keyed and indexed child access used by bundles
///
/// # Examples
///
/// ```
/// use keepsake_core::DocValue;
///
/// let mut obj = DocValue::object();
/// obj.set_key("hp", DocValue::from(12)).unwrap();
///
/// assert!(obj.contains_non_null("hp"));
/// assert_eq!(obj.get_key("hp").and_then(|v| v.as_i64()), Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DocValue(Value);

impl DocValue {
    /// Create a null value
    pub fn null() -> Self {
        DocValue(Value::Null)
    }

    /// Create an empty object
    pub fn object() -> Self {
        DocValue(Value::Object(Map::new()))
    }

    /// Create an empty array
    pub fn array() -> Self {
        DocValue(Value::Array(Vec::new()))
    }

    /// Create from a serde_json::Value
    pub fn from_value(value: Value) -> Self {
        DocValue(value)
    }

    /// Get the underlying serde_json::Value
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Get a reference to the underlying serde_json::Value
    pub fn as_inner(&self) -> &Value {
        &self.0
    }

    /// Get a mutable reference to the underlying serde_json::Value
    pub fn as_inner_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    /// Serialize to compact JSON string
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Name of the value's shape, for error messages
    pub fn type_name(&self) -> &'static str {
        value_type_name(&self.0)
    }

    /// Get a named child of an object
    ///
    /// Returns `None` when the key is absent or this value is not an object.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.0.as_object()?.get(key)
    }

    /// Set a named child of an object, replacing any previous value
    pub fn set_key(&mut self, key: impl Into<String>, value: DocValue) -> Result<(), DocPathError> {
        match &mut self.0 {
            Value::Object(obj) => {
                obj.insert(key.into(), value.0);
                Ok(())
            }
            other => Err(DocPathError::TypeMismatch {
                expected: "object",
                found: value_type_name(other),
            }),
        }
    }

    /// Remove a named child, returning it if it was present
    pub fn remove_key(&mut self, key: &str) -> Option<DocValue> {
        self.0.as_object_mut()?.remove(key).map(DocValue)
    }

    /// Check whether a key is present and not null
    pub fn contains_non_null(&self, key: &str) -> bool {
        matches!(self.get_key(key), Some(v) if !v.is_null())
    }

    /// Get an element of an array
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.0.as_array()?.get(index)
    }

    /// Set an element of an array
    ///
    /// Setting the index one past the end appends.
    pub fn set_index(&mut self, index: usize, value: DocValue) -> Result<(), DocPathError> {
        match &mut self.0 {
            Value::Array(arr) if index < arr.len() => {
                arr[index] = value.0;
                Ok(())
            }
            Value::Array(arr) if index == arr.len() => {
                arr.push(value.0);
                Ok(())
            }
            Value::Array(arr) => Err(DocPathError::IndexOutOfBounds {
                index,
                len: arr.len(),
            }),
            other => Err(DocPathError::TypeMismatch {
                expected: "array",
                found: value_type_name(other),
            }),
        }
    }
}

impl FromStr for DocValue {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(DocValue)
    }
}

impl Deref for DocValue {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DocValue {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for DocValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Default is null
impl Default for DocValue {
    fn default() -> Self {
        Self::null()
    }
}

impl From<Value> for DocValue {
    fn from(v: Value) -> Self {
        DocValue(v)
    }
}

impl From<DocValue> for Value {
    fn from(v: DocValue) -> Self {
        v.0
    }
}

impl From<bool> for DocValue {
    fn from(v: bool) -> Self {
        DocValue(Value::Bool(v))
    }
}

impl From<i32> for DocValue {
    fn from(v: i32) -> Self {
        DocValue(Value::Number(v.into()))
    }
}

impl From<i64> for DocValue {
    fn from(v: i64) -> Self {
        DocValue(Value::Number(v.into()))
    }
}

impl From<u32> for DocValue {
    fn from(v: u32) -> Self {
        DocValue(Value::Number(v.into()))
    }
}

impl From<u64> for DocValue {
    fn from(v: u64) -> Self {
        DocValue(Value::Number(v.into()))
    }
}

impl From<f64> for DocValue {
    fn from(v: f64) -> Self {
        // NaN and the infinities have no JSON form
        DocValue(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }
}

impl From<f32> for DocValue {
    fn from(v: f32) -> Self {
        DocValue::from(f64::from(v))
    }
}

impl From<&str> for DocValue {
    fn from(v: &str) -> Self {
        DocValue(Value::String(v.to_string()))
    }
}

impl From<String> for DocValue {
    fn from(v: String) -> Self {
        DocValue(Value::String(v))
    }
}

impl From<&String> for DocValue {
    fn from(v: &String) -> Self {
        DocValue(Value::String(v.clone()))
    }
}

impl<T: Into<DocValue>> From<Vec<T>> for DocValue {
    fn from(v: Vec<T>) -> Self {
        DocValue(Value::Array(v.into_iter().map(|x| x.into().0).collect()))
    }
}

impl<T: Clone + Into<DocValue>> From<&[T]> for DocValue {
    fn from(v: &[T]) -> Self {
        DocValue(Value::Array(v.iter().cloned().map(|x| x.into().0).collect()))
    }
}

impl<T: Into<DocValue>> From<Option<T>> for DocValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => DocValue::null(),
        }
    }
}

// =============================================================================
// Lenient coercions
// =============================================================================

/// Read a value as a boolean
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Read a value as a 64-bit integer
///
/// Floats truncate toward zero and saturate at the i64 bounds.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => Some(number_to_i64(n)),
        Value::String(s) => parse_number(s).map(|n| number_to_i64(&n)),
        _ => None,
    }
}

/// Read a value as a 32-bit integer
///
/// Integers wider than 32 bits keep their low bits. Floats saturate.
pub fn coerce_i32(value: &Value) -> Option<i32> {
    let number = match value {
        Value::Number(n) => n.clone(),
        Value::String(s) => parse_number(s)?,
        _ => return None,
    };
    match number.as_i64() {
        Some(i) => Some(i as i32),
        None => number.as_f64().map(|f| f as i32),
    }
}

/// Read a value as a double
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Read a value as a string
///
/// Null has no string form. Other non-string values render as JSON text.
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn number_to_i64(n: &Number) -> i64 {
    n.as_i64()
        .unwrap_or_else(|| n.as_f64().map_or(0, |f| f as i64))
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Helper to get type name for error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// DocPath and PathSegment
// =============================================================================

/// Error type for path traversal and child mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocPathError {
    /// The node had the wrong shape for the operation
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Shape the operation needed
        expected: &'static str,
        /// Shape actually found
        found: &'static str,
    },
    /// Array index past the end
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Array length
        len: usize,
    },
}

/// A segment in a document path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key: `.foo`
    Key(String),
    /// Array index: `[0]`
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A path from the document root to a nested node
///
/// Nested bundles are a shared root plus one of these. The root path is empty.
///
/// ```
/// use keepsake_core::DocPath;
///
/// let path = DocPath::root().key("hero").key("belongings").index(2);
/// assert_eq!(path.to_string(), "hero.belongings[2]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct DocPath {
    segments: Vec<PathSegment>,
}

impl DocPath {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        DocPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        DocPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if this is the root path (empty)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str(&segment.to_string());
        }
        write!(f, "{}", out.strip_prefix('.').unwrap_or(&out))
    }
}

// =============================================================================
// Path Operations
// =============================================================================

/// Get the node at `path`
///
/// Returns `None` if the path doesn't exist or a segment hits the wrong shape.
pub fn get_at_path<'a>(root: &'a DocValue, path: &DocPath) -> Option<&'a Value> {
    let mut current = root.as_inner();
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(obj)) => obj.get(key)?,
            (PathSegment::Index(idx), Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to the node at `path`
pub fn get_at_path_mut<'a>(root: &'a mut DocValue, path: &DocPath) -> Option<&'a mut Value> {
    let mut current = root.as_inner_mut();
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(obj)) => obj.get_mut(key)?,
            (PathSegment::Index(idx), Value::Array(arr)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}
