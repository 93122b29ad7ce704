//! Driver contract traits.
//!
//! One trait per role, plus one trait per optional capability. A driver
//! implementation satisfies the mandatory methods of each role; optional
//! capabilities are reached through `as_*` accessors whose default `None`
//! is the absent marker.
//!
//! The proxy layer ([`crate::proxy`]) wraps any object graph built from
//! these traits without adding or removing capabilities.

mod connection;
mod error;
mod rows;
mod statement;
mod transaction;
mod value;

pub use connection::{
    BeginWithOptions, Connection, ConnectionExt, Pinger, PrepareWithContext, SessionResetter,
};
pub use error::{DriverError, Result};
pub use rows::{ResultSetAdvancer, Rows, RowsExt};
pub use statement::{
    BoundValueChecker, ExecWithContext, QueryWithContext, Statement, StatementExt,
};
pub use transaction::Transaction;
pub use value::{BoundValue, CallContext, ExecOutcome, IsolationLevel, TxOptions, Value};

use std::fmt;

use async_trait::async_trait;

/// Entry point of a driver implementation.
///
/// `open` is the mandatory path; drivers that can build reusable connectors
/// additionally expose [`ConnectorOpener`].
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a new connection to the data source named by `dsn`.
    async fn open(&self, dsn: &str) -> Result<Box<dyn Connection>>;

    /// Optional open-connector capability; `None` means unsupported.
    fn as_connector_opener(&self) -> Option<&dyn ConnectorOpener> {
        None
    }
}

/// Invocation surface for the optional driver operation.
#[async_trait]
pub trait DriverExt: Driver {
    async fn open_connector(&self, dsn: &str) -> Result<Box<dyn Connector>> {
        match self.as_connector_opener() {
            Some(capable) => capable.open_connector(dsn).await,
            None => Err(DriverError::Unsupported),
        }
    }
}

impl<D: Driver + ?Sized> DriverExt for D {}

/// Optional driver capability: build a [`Connector`] bound to a fixed dsn.
#[async_trait]
pub trait ConnectorOpener: Send + Sync {
    async fn open_connector(&self, dsn: &str) -> Result<Box<dyn Connector>>;
}

/// A reusable connection factory bound to one data source.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a new connection. The caller's [`CallContext`] is forwarded
    /// to the backend unmodified.
    async fn connect(&self, cx: &CallContext) -> Result<Box<dyn Connection>>;
}

impl fmt::Debug for dyn Connector + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Connector")
    }
}
