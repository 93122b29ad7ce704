//! Capability-preserving proxy construction.
//!
//! [`wrap_driver`] and [`wrap_connector`] wrap a driver object graph so that
//! every operation dispatches the hook protocol before delegating. At wrap
//! time each optional capability is probed once, in declared order, and the
//! resulting set is what the proxy reports for its whole lifetime - wrapping
//! never adds or removes a capability. Handles returned by successful calls
//! (connections, statements, transactions, cursors) are wrapped recursively,
//! so hook coverage is transitive through everything reachable from the
//! root.

mod connection;
mod rows;
mod statement;
mod transaction;

pub(crate) use connection::ProxyConnection;
pub(crate) use rows::ProxyRows;
pub(crate) use statement::ProxyStatement;
pub(crate) use transaction::ProxyTransaction;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::capability::{CapabilitySet, ConnectionCapability, DriverCapability, RowsCapability, StatementCapability};
use crate::driver::{
    CallContext, Connection, Connector, ConnectorOpener, Driver, DriverError, Result, Rows,
    Statement,
};
use crate::hooks::dispatch::ActiveCall;
use crate::hooks::{Args, CallSite, Hooks, Operation, Outcome, Role};

/// Wrap a driver. Connections opened through the result, and everything
/// reachable from them, dispatch hooks from `hooks`.
pub fn wrap_driver(inner: Box<dyn Driver>, hooks: Arc<Hooks>) -> Box<dyn Driver> {
    let caps = driver_capabilities(inner.as_ref());
    debug!(role = Role::Driver.name(), capabilities = ?caps, "wrapped");
    Box::new(ProxyDriver { inner, caps, hooks })
}

/// Wrap a connector. Driver-role hooks only fire for [`wrap_driver`] roots.
pub fn wrap_connector(inner: Box<dyn Connector>, hooks: Arc<Hooks>) -> Box<dyn Connector> {
    Box::new(ProxyConnector { inner, hooks })
}

/// Detected optional capabilities of a driver, probed in declared order.
pub fn driver_capabilities(driver: &dyn Driver) -> CapabilitySet {
    let mut caps = CapabilitySet::EMPTY;
    if driver.as_connector_opener().is_some() {
        caps.insert(DriverCapability::OpenConnector.index());
    }
    caps
}

/// Detected optional capabilities of a connection, probed in declared order.
pub fn connection_capabilities(conn: &mut dyn Connection) -> CapabilitySet {
    let mut caps = CapabilitySet::EMPTY;
    if conn.as_begin_with_options().is_some() {
        caps.insert(ConnectionCapability::BeginWithOptions.index());
    }
    if conn.as_prepare_with_context().is_some() {
        caps.insert(ConnectionCapability::PrepareWithContext.index());
    }
    if conn.as_pinger().is_some() {
        caps.insert(ConnectionCapability::Ping.index());
    }
    if conn.as_session_resetter().is_some() {
        caps.insert(ConnectionCapability::ResetSession.index());
    }
    caps
}

/// Detected optional capabilities of a statement.
pub fn statement_capabilities(stmt: &mut dyn Statement) -> CapabilitySet {
    let mut caps = CapabilitySet::EMPTY;
    if stmt.as_exec_with_context().is_some() {
        caps.insert(StatementCapability::ExecWithContext.index());
    }
    if stmt.as_query_with_context().is_some() {
        caps.insert(StatementCapability::QueryWithContext.index());
    }
    caps
}

/// Detected optional capabilities of a rows cursor.
pub fn rows_capabilities(rows: &mut dyn Rows) -> CapabilitySet {
    let mut caps = CapabilitySet::EMPTY;
    if rows.as_result_set_advancer().is_some() {
        caps.insert(RowsCapability::NextResultSet.index());
    }
    caps
}

struct ProxyDriver {
    inner: Box<dyn Driver>,
    caps: CapabilitySet,
    hooks: Arc<Hooks>,
}

#[async_trait]
impl Driver for ProxyDriver {
    async fn open(&self, dsn: &str) -> Result<Box<dyn Connection>> {
        let site = CallSite::new(Role::Driver, Operation::Open);
        let call = ActiveCall::begin(&self.hooks, site, &Args::Dsn(dsn));
        match self.inner.open(dsn).await {
            Ok(conn) => {
                let conn = ProxyConnection::wrap(conn, Arc::clone(&self.hooks));
                call.succeed(&Outcome::Handle {
                    role: Role::Connection,
                    capabilities: conn.capabilities(),
                });
                Ok(Box::new(conn))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }

    fn as_connector_opener(&self) -> Option<&dyn ConnectorOpener> {
        if self.caps.contains(DriverCapability::OpenConnector.index()) {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl ConnectorOpener for ProxyDriver {
    async fn open_connector(&self, dsn: &str) -> Result<Box<dyn Connector>> {
        let Some(inner) = self.inner.as_connector_opener() else {
            return Err(DriverError::Unsupported);
        };
        let site = CallSite::new(Role::Driver, Operation::OpenConnector);
        let call = ActiveCall::begin(&self.hooks, site, &Args::Dsn(dsn));
        match inner.open_connector(dsn).await {
            Ok(connector) => {
                call.succeed(&Outcome::Handle {
                    role: Role::Connector,
                    capabilities: CapabilitySet::EMPTY,
                });
                Ok(Box::new(ProxyConnector {
                    inner: connector,
                    hooks: Arc::clone(&self.hooks),
                }))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }
}

struct ProxyConnector {
    inner: Box<dyn Connector>,
    hooks: Arc<Hooks>,
}

#[async_trait]
impl Connector for ProxyConnector {
    async fn connect(&self, cx: &CallContext) -> Result<Box<dyn Connection>> {
        let site = CallSite::new(Role::Connector, Operation::Connect);
        let call = ActiveCall::begin(&self.hooks, site, &Args::None);
        match self.inner.connect(cx).await {
            Ok(conn) => {
                let conn = ProxyConnection::wrap(conn, Arc::clone(&self.hooks));
                call.succeed(&Outcome::Handle {
                    role: Role::Connection,
                    capabilities: conn.capabilities(),
                });
                Ok(Box::new(conn))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }
}
