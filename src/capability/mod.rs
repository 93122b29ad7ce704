//! Capability sets.
//!
//! Each driver role declares a fixed, ordered list of optional capabilities.
//! A [`CapabilitySet`] is a small bitmask over those indices; identity is
//! set-equality, order irrelevant. The proxy layer probes each capability
//! once at wrap time, composes the mask, and reports exactly that mask for
//! the lifetime of the wrapped object.

mod combinations;

pub use combinations::combinations;

use std::fmt;

/// A set of capability indices for one role, stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: Self = Self(0);

    /// Maximum number of capability slots per role.
    pub const MAX_SLOTS: usize = 8;

    pub fn from_indices(indices: &[usize]) -> Self {
        let mut set = Self::EMPTY;
        for &index in indices {
            set.insert(index);
        }
        set
    }

    pub fn insert(&mut self, index: usize) {
        debug_assert!(index < Self::MAX_SLOTS);
        self.0 |= 1 << index;
    }

    #[must_use]
    pub fn with(mut self, index: usize) -> Self {
        self.insert(index);
        self
    }

    pub fn contains(self, index: usize) -> bool {
        index < Self::MAX_SLOTS && self.0 & (1 << index) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set members in ascending index order.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..Self::MAX_SLOTS).filter(move |&i| self.contains(i))
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.indices()).finish()
    }
}

/// Optional capabilities of the connection role, in declared probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCapability {
    BeginWithOptions,
    PrepareWithContext,
    Ping,
    ResetSession,
}

impl ConnectionCapability {
    pub const ALL: [Self; 4] = [
        Self::BeginWithOptions,
        Self::PrepareWithContext,
        Self::Ping,
        Self::ResetSession,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::BeginWithOptions => 0,
            Self::PrepareWithContext => 1,
            Self::Ping => 2,
            Self::ResetSession => 3,
        }
    }
}

/// Optional capabilities of the statement role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCapability {
    ExecWithContext,
    QueryWithContext,
}

impl StatementCapability {
    pub const ALL: [Self; 2] = [Self::ExecWithContext, Self::QueryWithContext];

    pub fn index(self) -> usize {
        match self {
            Self::ExecWithContext => 0,
            Self::QueryWithContext => 1,
        }
    }
}

/// Optional capabilities of the driver role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCapability {
    OpenConnector,
}

impl DriverCapability {
    pub const ALL: [Self; 1] = [Self::OpenConnector];

    pub fn index(self) -> usize {
        match self {
            Self::OpenConnector => 0,
        }
    }
}

/// Optional capabilities of the rows role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsCapability {
    NextResultSet,
}

impl RowsCapability {
    pub const ALL: [Self; 1] = [Self::NextResultSet];

    pub fn index(self) -> usize {
        match self {
            Self::NextResultSet => 0,
        }
    }
}
