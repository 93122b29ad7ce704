//! Driver-level data types.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// A scalar value crossing the driver boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// A parameter bound to a statement, addressed by ordinal position or name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundValue {
    /// 1-based parameter position.
    pub ordinal: usize,
    /// Parameter name, when the statement uses named placeholders.
    pub name: Option<String>,
    pub value: Value,
}

/// Transaction isolation requested through the begin-with-options capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Options for the begin-with-options capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxOptions {
    /// `None` leaves the backend default in place.
    pub isolation: Option<IsolationLevel>,
    pub read_only: bool,
}

/// Result of a statement execution that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// Caller-supplied deadline/cancellation information.
///
/// The proxy forwards this to the wrapped driver unmodified; it neither
/// shortens nor extends the deadline, it only observes the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallContext {
    pub deadline: Option<Instant>,
}

impl CallContext {
    /// A context with no deadline.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }
}
