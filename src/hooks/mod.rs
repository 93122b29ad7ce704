//! Hook registry.
//!
//! A hook is a `{before, success, failure}` callback triple bound to one
//! `(role, operation)` pair. The registry is built once through
//! [`HooksBuilder`] and frozen into an immutable [`Hooks`] value handed to
//! the wrap constructors; readers never lock. Callbacks run inline on the
//! calling task, so when the wrapped driver supports concurrent use a hook
//! may be invoked from several tasks at once - making that safe is the hook
//! author's obligation, not the dispatcher's.

pub(crate) mod dispatch;
pub mod trace;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::capability::CapabilitySet;
use crate::driver::{BoundValue, DriverError, ExecOutcome, TxOptions, Value};

/// Role of the object an operation is invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Driver,
    Connector,
    Connection,
    Statement,
    Transaction,
    Rows,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Driver => "driver",
            Role::Connector => "connector",
            Role::Connection => "connection",
            Role::Statement => "statement",
            Role::Transaction => "transaction",
            Role::Rows => "rows",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A proxied operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    OpenConnector,
    Connect,
    BeginTransaction,
    BeginTransactionWithOptions,
    Close,
    Prepare,
    PrepareWithContext,
    CheckBoundValue,
    Exec,
    ExecWithContext,
    Query,
    QueryWithContext,
    Commit,
    Rollback,
    AdvanceRow,
    AdvanceResultSet,
    Ping,
    ResetSession,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::OpenConnector => "open-connector",
            Operation::Connect => "connect",
            Operation::BeginTransaction => "begin-transaction",
            Operation::BeginTransactionWithOptions => "begin-transaction-with-options",
            Operation::Close => "close",
            Operation::Prepare => "prepare",
            Operation::PrepareWithContext => "prepare-with-context",
            Operation::CheckBoundValue => "check-bound-value",
            Operation::Exec => "exec",
            Operation::ExecWithContext => "exec-with-context",
            Operation::Query => "query",
            Operation::QueryWithContext => "query-with-context",
            Operation::Commit => "commit",
            Operation::Rollback => "rollback",
            Operation::AdvanceRow => "advance-row",
            Operation::AdvanceResultSet => "advance-result-set",
            Operation::Ping => "ping",
            Operation::ResetSession => "reset-session",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of the call a hook is observing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub role: Role,
    pub operation: Operation,
}

impl CallSite {
    pub const fn new(role: Role, operation: Operation) -> Self {
        Self { role, operation }
    }

    /// Every `(role, operation)` pair the proxy layer dispatches.
    pub const ALL: &'static [CallSite] = &[
        CallSite::new(Role::Driver, Operation::Open),
        CallSite::new(Role::Driver, Operation::OpenConnector),
        CallSite::new(Role::Connector, Operation::Connect),
        CallSite::new(Role::Connection, Operation::BeginTransaction),
        CallSite::new(Role::Connection, Operation::BeginTransactionWithOptions),
        CallSite::new(Role::Connection, Operation::Close),
        CallSite::new(Role::Connection, Operation::Prepare),
        CallSite::new(Role::Connection, Operation::PrepareWithContext),
        CallSite::new(Role::Connection, Operation::CheckBoundValue),
        CallSite::new(Role::Connection, Operation::Exec),
        CallSite::new(Role::Connection, Operation::Query),
        CallSite::new(Role::Connection, Operation::Ping),
        CallSite::new(Role::Connection, Operation::ResetSession),
        CallSite::new(Role::Statement, Operation::Close),
        CallSite::new(Role::Statement, Operation::CheckBoundValue),
        CallSite::new(Role::Statement, Operation::Exec),
        CallSite::new(Role::Statement, Operation::ExecWithContext),
        CallSite::new(Role::Statement, Operation::Query),
        CallSite::new(Role::Statement, Operation::QueryWithContext),
        CallSite::new(Role::Transaction, Operation::Commit),
        CallSite::new(Role::Transaction, Operation::Rollback),
        CallSite::new(Role::Rows, Operation::AdvanceRow),
        CallSite::new(Role::Rows, Operation::AdvanceResultSet),
        CallSite::new(Role::Rows, Operation::Close),
    ];
}

/// Opaque correlation value threaded from a Before hook to the matching
/// Success or Failure hook of the same call.
pub struct Tag(Box<dyn Any + Send>);

impl Tag {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    pub fn downcast<T: Any>(self) -> Option<T> {
        self.0.downcast().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tag(..)")
    }
}

/// Arguments of the current operation, as visible to Before hooks.
#[derive(Debug)]
pub enum Args<'a> {
    None,
    Dsn(&'a str),
    Statement(&'a str),
    StatementParams {
        statement: &'a str,
        params: &'a [Value],
    },
    Params(&'a [Value]),
    BoundParams(&'a [BoundValue]),
    TxOptions(&'a TxOptions),
    BoundValue(&'a BoundValue),
    RowBuffer {
        width: usize,
    },
}

/// Result of a completed operation, as visible to Success hooks.
#[derive(Debug)]
pub enum Outcome<'a> {
    Unit,
    Exec(&'a ExecOutcome),
    /// Whether `advance-row` produced a row.
    RowAvailable(bool),
    /// A wrapped handle was returned; its detected capability set is
    /// reported so hooks can observe graph growth.
    Handle {
        role: Role,
        capabilities: CapabilitySet,
    },
}

pub type BeforeFn = Arc<dyn Fn(CallSite, &Args<'_>) -> Option<Tag> + Send + Sync>;
pub type SuccessFn = Arc<dyn Fn(CallSite, Option<Tag>, &Outcome<'_>) + Send + Sync>;
pub type FailureFn = Arc<dyn Fn(CallSite, Option<Tag>, &DriverError) + Send + Sync>;

/// The `{before, success, failure}` triple for one call site.
/// Any slot may be absent.
#[derive(Clone, Default)]
pub struct HookSet {
    pub(crate) before: Option<BeforeFn>,
    pub(crate) success: Option<SuccessFn>,
    pub(crate) failure: Option<FailureFn>,
}

/// Immutable hook registry, shared by every proxy built from it.
#[derive(Default)]
pub struct Hooks {
    sets: HashMap<CallSite, HookSet>,
}

impl Hooks {
    pub fn builder() -> HooksBuilder {
        HooksBuilder::default()
    }

    /// An empty registry: every proxied call passes straight through.
    pub fn none() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn get(&self, site: CallSite) -> Option<&HookSet> {
        self.sets.get(&site)
    }
}

/// Builder for [`Hooks`]. Registration happens here; the built registry
/// is read-only, which turns the original write-then-freeze discipline
/// into a constructor-time guarantee.
#[derive(Default)]
pub struct HooksBuilder {
    sets: HashMap<CallSite, HookSet>,
}

impl HooksBuilder {
    pub fn before<F>(mut self, role: Role, operation: Operation, f: F) -> Self
    where
        F: Fn(CallSite, &Args<'_>) -> Option<Tag> + Send + Sync + 'static,
    {
        self.entry(role, operation).before = Some(Arc::new(f));
        self
    }

    pub fn on_success<F>(mut self, role: Role, operation: Operation, f: F) -> Self
    where
        F: Fn(CallSite, Option<Tag>, &Outcome<'_>) + Send + Sync + 'static,
    {
        self.entry(role, operation).success = Some(Arc::new(f));
        self
    }

    pub fn on_failure<F>(mut self, role: Role, operation: Operation, f: F) -> Self
    where
        F: Fn(CallSite, Option<Tag>, &DriverError) + Send + Sync + 'static,
    {
        self.entry(role, operation).failure = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Arc<Hooks> {
        Arc::new(Hooks { sets: self.sets })
    }

    fn entry(&mut self, role: Role, operation: Operation) -> &mut HookSet {
        self.sets
            .entry(CallSite::new(role, operation))
            .or_default()
    }
}
