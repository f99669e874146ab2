use crate::value::Value;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identity of a trainable parameter.
///
/// Optimizers key their per-parameter state by this handle, never by the
/// parameter's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(u64);

impl ParameterId {
    fn next() -> Self {
        ParameterId(NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A trainable value with a stable identity.
///
/// Cloning a `Parameter` is shallow: the clone shares both the identity and
/// the underlying storage, so an optimizer update through one handle is seen
/// by every graph replica holding another.
#[derive(Clone)]
pub struct Parameter {
    id: ParameterId,
    value: Value,
    name: Option<String>,
}

impl Parameter {
    /// Wraps `value` under a fresh identity.
    pub fn new(value: impl Into<Value>) -> Self {
        Parameter {
            id: ParameterId::next(),
            value: value.into(),
            name: None,
        }
    }

    pub fn named(value: impl Into<Value>, name: impl Into<String>) -> Self {
        Parameter {
            name: Some(name.into()),
            ..Self::new(value)
        }
    }

    pub fn id(&self) -> ParameterId {
        self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

// Allow using the parameter directly wherever its value is read or mutated.
impl Deref for Parameter {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Parameter({} {}, {:?})", self.id, name, self.value),
            None => write!(f, "Parameter({}, {:?})", self.id, self.value),
        }
    }
}
