//! Connection role: mandatory contract plus four optional capabilities.

use async_trait::async_trait;

use super::error::{DriverError, Result};
use super::rows::Rows;
use super::statement::{BoundValueChecker, Statement};
use super::transaction::Transaction;
use super::value::{BoundValue, CallContext, ExecOutcome, TxOptions, Value};

/// An open connection to a data source.
///
/// `prepare`, `begin`, `exec`, `query`, and `close` form the mandatory
/// contract. The four optional capabilities (begin-with-options,
/// prepare-with-context, ping, session reset) are separate single-operation
/// traits reached through the `as_*` accessors; a default of `None` marks
/// the capability absent. Detection happens once at wrap time.
#[async_trait]
pub trait Connection: Send {
    /// Prepare a statement for repeated execution.
    async fn prepare(&mut self, statement: &str) -> Result<Box<dyn Statement>>;

    /// Start a transaction with backend-default options.
    async fn begin(&mut self) -> Result<Box<dyn Transaction>>;

    /// Execute a statement that returns no rows.
    async fn exec(&mut self, statement: &str, params: &[Value]) -> Result<ExecOutcome>;

    /// Execute a statement that returns a cursor over result rows.
    async fn query(&mut self, statement: &str, params: &[Value]) -> Result<Box<dyn Rows>>;

    /// Close the connection. Forwarded exactly once per call; double-close
    /// semantics are whatever the implementation defines.
    async fn close(&mut self) -> Result<()>;

    fn as_begin_with_options(&mut self) -> Option<&mut dyn BeginWithOptions> {
        None
    }

    fn as_prepare_with_context(&mut self) -> Option<&mut dyn PrepareWithContext> {
        None
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        None
    }

    fn as_session_resetter(&mut self) -> Option<&mut dyn SessionResetter> {
        None
    }

    /// Parameter-validation support, probed per call rather than at wrap
    /// time, so implementations may decide statement by statement.
    fn as_bound_value_checker(&mut self) -> Option<&mut dyn BoundValueChecker> {
        None
    }
}

/// Invocation surface for the optional connection operations.
///
/// Each method routes through the matching capability accessor and returns
/// the [`DriverError::Unsupported`] sentinel when the capability is absent,
/// so callers can fall back to the mandatory path without probing first.
#[async_trait]
pub trait ConnectionExt: Connection {
    async fn begin_with_options(
        &mut self,
        cx: &CallContext,
        options: TxOptions,
    ) -> Result<Box<dyn Transaction>> {
        match self.as_begin_with_options() {
            Some(capable) => capable.begin_with_options(cx, options).await,
            None => Err(DriverError::Unsupported),
        }
    }

    async fn prepare_with_context(
        &mut self,
        cx: &CallContext,
        statement: &str,
    ) -> Result<Box<dyn Statement>> {
        match self.as_prepare_with_context() {
            Some(capable) => capable.prepare_with_context(cx, statement).await,
            None => Err(DriverError::Unsupported),
        }
    }

    async fn ping(&mut self, cx: &CallContext) -> Result<()> {
        match self.as_pinger() {
            Some(capable) => capable.ping(cx).await,
            None => Err(DriverError::Unsupported),
        }
    }

    async fn reset_session(&mut self, cx: &CallContext) -> Result<()> {
        match self.as_session_resetter() {
            Some(capable) => capable.reset_session(cx).await,
            None => Err(DriverError::Unsupported),
        }
    }

    async fn check_bound_value(&mut self, value: &mut BoundValue) -> Result<()> {
        match self.as_bound_value_checker() {
            Some(capable) => capable.check_bound_value(value).await,
            None => Err(DriverError::Unsupported),
        }
    }
}

impl<C: Connection + ?Sized> ConnectionExt for C {}

/// Optional capability: start a transaction with explicit options.
#[async_trait]
pub trait BeginWithOptions: Send {
    async fn begin_with_options(
        &mut self,
        cx: &CallContext,
        options: TxOptions,
    ) -> Result<Box<dyn Transaction>>;
}

/// Optional capability: prepare under a caller-supplied call context.
#[async_trait]
pub trait PrepareWithContext: Send {
    async fn prepare_with_context(
        &mut self,
        cx: &CallContext,
        statement: &str,
    ) -> Result<Box<dyn Statement>>;
}

/// Optional capability: liveness probe.
#[async_trait]
pub trait Pinger: Send {
    async fn ping(&mut self, cx: &CallContext) -> Result<()>;
}

/// Optional capability: reset session state before connection reuse.
#[async_trait]
pub trait SessionResetter: Send {
    async fn reset_session(&mut self, cx: &CallContext) -> Result<()>;
}
