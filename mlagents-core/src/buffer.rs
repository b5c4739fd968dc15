//! Flat buffer vocabulary.
use ndarray::ArrayD;
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Keys under which actions are stored in a flat buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKey {
    /// Continuous actions, shape `[batch, continuous_size]`.
    ContinuousAction,

    /// Discrete actions, shape `[batch, num_branches]`.
    DiscreteAction,
}

impl BufferKey {
    /// Returns the key as it appears in the buffer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContinuousAction => "continuous_action",
            Self::DiscreteAction => "discrete_action",
        }
    }
}

impl AsRef<str> for BufferKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BufferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BufferKey> for String {
    fn from(key: BufferKey) -> Self {
        key.as_str().to_string()
    }
}

/// A numeric array stored in a flat buffer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum BufferArray {
    /// Array of floating point values.
    Float(ArrayD<f32>),

    /// Array of integer values.
    Int(ArrayD<i64>),
}

impl BufferArray {
    /// Returns the shape of the array.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Float(a) => a.shape(),
            Self::Int(a) => a.shape(),
        }
    }

    /// Returns the number of axes.
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Returns `true` if the elements are floating point values.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    /// Returns a copy with elements cast to `f32`.
    pub fn to_f32(&self) -> ArrayD<f32> {
        match self {
            Self::Float(a) => a.clone(),
            Self::Int(a) => a.mapv(|x| x.as_()),
        }
    }

    /// Returns a copy with elements cast to `i64`.
    ///
    /// Floating point values are truncated toward zero.
    pub fn to_i64(&self) -> ArrayD<i64> {
        match self {
            Self::Float(a) => a.mapv(|x| x.as_()),
            Self::Int(a) => a.clone(),
        }
    }
}

impl From<ArrayD<f32>> for BufferArray {
    fn from(a: ArrayD<f32>) -> Self {
        Self::Float(a)
    }
}

impl From<ArrayD<i64>> for BufferArray {
    fn from(a: ArrayD<i64>) -> Self {
        Self::Int(a)
    }
}

/// Named arrays of a flat buffer.
///
/// Each field of a record is kept as its own array. Keys not listed in
/// [`BufferKey`] are allowed and left untouched by action conversions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayDict(HashMap<String, BufferArray>);

impl ArrayDict {
    /// Constructs an empty dict.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Inserts an array, returning the array previously stored under `key`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        array: impl Into<BufferArray>,
    ) -> Option<BufferArray> {
        self.0.insert(key.into(), array.into())
    }

    /// Returns the array stored under `key`.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&BufferArray> {
        self.0.get(key.as_ref())
    }

    /// Returns `true` if an array is stored under `key`.
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.0.contains_key(key.as_ref())
    }

    /// Removes and returns the array stored under `key`.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<BufferArray> {
        self.0.remove(key.as_ref())
    }

    /// Returns the number of arrays.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the dict has no arrays.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }
}

impl From<HashMap<String, BufferArray>> for ArrayDict {
    fn from(map: HashMap<String, BufferArray>) -> Self {
        Self(map)
    }
}

impl From<ArrayDict> for HashMap<String, BufferArray> {
    fn from(dict: ArrayDict) -> Self {
        dict.0
    }
}
