//! Statement role: mandatory contract plus two optional capabilities.

use std::fmt;

use async_trait::async_trait;

use super::error::{DriverError, Result};
use super::rows::Rows;
use super::value::{BoundValue, CallContext, ExecOutcome, Value};

/// A prepared statement.
#[async_trait]
pub trait Statement: Send {
    /// Number of parameter placeholders, when the driver knows it.
    fn num_params(&self) -> Option<usize>;

    async fn exec(&mut self, params: &[Value]) -> Result<ExecOutcome>;

    async fn query(&mut self, params: &[Value]) -> Result<Box<dyn Rows>>;

    async fn close(&mut self) -> Result<()>;

    fn as_exec_with_context(&mut self) -> Option<&mut dyn ExecWithContext> {
        None
    }

    fn as_query_with_context(&mut self) -> Option<&mut dyn QueryWithContext> {
        None
    }

    /// Probed per call, like the connection-level accessor.
    fn as_bound_value_checker(&mut self) -> Option<&mut dyn BoundValueChecker> {
        None
    }
}

impl fmt::Debug for dyn Statement + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Statement")
    }
}

/// Invocation surface for the optional statement operations. Absent
/// capabilities yield the [`DriverError::Unsupported`] sentinel without
/// touching the implementation.
#[async_trait]
pub trait StatementExt: Statement {
    async fn exec_with_context(
        &mut self,
        cx: &CallContext,
        params: &[BoundValue],
    ) -> Result<ExecOutcome> {
        match self.as_exec_with_context() {
            Some(capable) => capable.exec_with_context(cx, params).await,
            None => Err(DriverError::Unsupported),
        }
    }

    async fn query_with_context(
        &mut self,
        cx: &CallContext,
        params: &[BoundValue],
    ) -> Result<Box<dyn Rows>> {
        match self.as_query_with_context() {
            Some(capable) => capable.query_with_context(cx, params).await,
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

impl<S: Statement + ?Sized> StatementExt for S {}

/// Optional capability: execute with named parameters under a call context.
#[async_trait]
pub trait ExecWithContext: Send {
    async fn exec_with_context(
        &mut self,
        cx: &CallContext,
        params: &[BoundValue],
    ) -> Result<ExecOutcome>;
}

/// Optional capability: query with named parameters under a call context.
#[async_trait]
pub trait QueryWithContext: Send {
    async fn query_with_context(
        &mut self,
        cx: &CallContext,
        params: &[BoundValue],
    ) -> Result<Box<dyn Rows>>;
}

/// Validate or rewrite a parameter before it is bound.
///
/// Shared by the connection and statement roles. An implementation may
/// mutate the value in place (for example to coerce a type the backend
/// cannot bind directly).
#[async_trait]
pub trait BoundValueChecker: Send {
    async fn check_bound_value(&mut self, value: &mut BoundValue) -> Result<()>;
}
