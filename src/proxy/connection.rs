//! Connection proxy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::{CapabilitySet, ConnectionCapability};
use crate::driver::{
    BeginWithOptions, BoundValue, BoundValueChecker, CallContext, Connection, DriverError,
    ExecOutcome, Pinger, PrepareWithContext, Result, Rows, SessionResetter, Statement,
    Transaction, TxOptions, Value,
};
use crate::hooks::dispatch::ActiveCall;
use crate::hooks::{Args, CallSite, Hooks, Operation, Outcome, Role};

use super::{connection_capabilities, ProxyRows, ProxyStatement, ProxyTransaction};

/// Wraps one connection; owns nothing beyond it. The capability set is
/// detected once here and reported unchanged for the proxy's lifetime.
pub(crate) struct ProxyConnection {
    inner: Box<dyn Connection>,
    caps: CapabilitySet,
    hooks: Arc<Hooks>,
}

impl ProxyConnection {
    pub(crate) fn wrap(mut inner: Box<dyn Connection>, hooks: Arc<Hooks>) -> Self {
        let caps = connection_capabilities(inner.as_mut());
        Self { inner, caps, hooks }
    }

    pub(crate) fn capabilities(&self) -> CapabilitySet {
        self.caps
    }

    fn site(operation: Operation) -> CallSite {
        CallSite::new(Role::Connection, operation)
    }
}

#[async_trait]
impl Connection for ProxyConnection {
    async fn prepare(&mut self, statement: &str) -> Result<Box<dyn Statement>> {
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::Prepare),
            &Args::Statement(statement),
        );
        match self.inner.prepare(statement).await {
            Ok(stmt) => {
                let stmt = ProxyStatement::wrap(stmt, Arc::clone(&self.hooks));
                call.succeed(&Outcome::Handle {
                    role: Role::Statement,
                    capabilities: stmt.capabilities(),
                });
                Ok(Box::new(stmt))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::BeginTransaction),
            &Args::None,
        );
        match self.inner.begin().await {
            Ok(tx) => {
                let tx = ProxyTransaction::wrap(tx, Arc::clone(&self.hooks));
                call.succeed(&Outcome::Handle {
                    role: Role::Transaction,
                    capabilities: CapabilitySet::EMPTY,
                });
                Ok(Box::new(tx))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }

    async fn exec(&mut self, statement: &str, params: &[Value]) -> Result<ExecOutcome> {
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::Exec),
            &Args::StatementParams { statement, params },
        );
        match self.inner.exec(statement, params).await {
            Ok(outcome) => {
                call.succeed(&Outcome::Exec(&outcome));
                Ok(outcome)
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }

    async fn query(&mut self, statement: &str, params: &[Value]) -> Result<Box<dyn Rows>> {
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::Query),
            &Args::StatementParams { statement, params },
        );
        match self.inner.query(statement, params).await {
            Ok(rows) => {
                let rows = ProxyRows::wrap(rows, Arc::clone(&self.hooks));
                call.succeed(&Outcome::Handle {
                    role: Role::Rows,
                    capabilities: rows.capabilities(),
                });
                Ok(Box::new(rows))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        let call = ActiveCall::begin(&self.hooks, Self::site(Operation::Close), &Args::None);
        match self.inner.close().await {
            Ok(()) => {
                call.succeed(&Outcome::Unit);
                Ok(())
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }

    fn as_begin_with_options(&mut self) -> Option<&mut dyn BeginWithOptions> {
        if self.caps.contains(ConnectionCapability::BeginWithOptions.index()) {
            Some(self)
        } else {
            None
        }
    }

    fn as_prepare_with_context(&mut self) -> Option<&mut dyn PrepareWithContext> {
        if self.caps.contains(ConnectionCapability::PrepareWithContext.index()) {
            Some(self)
        } else {
            None
        }
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        if self.caps.contains(ConnectionCapability::Ping.index()) {
            Some(self)
        } else {
            None
        }
    }

    fn as_session_resetter(&mut self) -> Option<&mut dyn SessionResetter> {
        if self.caps.contains(ConnectionCapability::ResetSession.index()) {
            Some(self)
        } else {
            None
        }
    }

    // Probed per call, mirroring the inner connection's own per-call answer.
    fn as_bound_value_checker(&mut self) -> Option<&mut dyn BoundValueChecker> {
        if self.inner.as_bound_value_checker().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl BeginWithOptions for ProxyConnection {
    async fn begin_with_options(
        &mut self,
        cx: &CallContext,
        options: TxOptions,
    ) -> Result<Box<dyn Transaction>> {
        let Some(inner) = self.inner.as_begin_with_options() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::BeginTransactionWithOptions),
            &Args::TxOptions(&options),
        );
        match inner.begin_with_options(cx, options).await {
            Ok(tx) => {
                let tx = ProxyTransaction::wrap(tx, Arc::clone(&self.hooks));
                call.succeed(&Outcome::Handle {
                    role: Role::Transaction,
                    capabilities: CapabilitySet::EMPTY,
                });
                Ok(Box::new(tx))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl PrepareWithContext for ProxyConnection {
    async fn prepare_with_context(
        &mut self,
        cx: &CallContext,
        statement: &str,
    ) -> Result<Box<dyn Statement>> {
        let Some(inner) = self.inner.as_prepare_with_context() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::PrepareWithContext),
            &Args::Statement(statement),
        );
        match inner.prepare_with_context(cx, statement).await {
            Ok(stmt) => {
                let stmt = ProxyStatement::wrap(stmt, Arc::clone(&self.hooks));
                call.succeed(&Outcome::Handle {
                    role: Role::Statement,
                    capabilities: stmt.capabilities(),
                });
                Ok(Box::new(stmt))
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Pinger for ProxyConnection {
    async fn ping(&mut self, cx: &CallContext) -> Result<()> {
        let Some(inner) = self.inner.as_pinger() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(&self.hooks, Self::site(Operation::Ping), &Args::None);
        match inner.ping(cx).await {
            Ok(()) => {
                call.succeed(&Outcome::Unit);
                Ok(())
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl SessionResetter for ProxyConnection {
    async fn reset_session(&mut self, cx: &CallContext) -> Result<()> {
        let Some(inner) = self.inner.as_session_resetter() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::ResetSession),
            &Args::None,
        );
        match inner.reset_session(cx).await {
            Ok(()) => {
                call.succeed(&Outcome::Unit);
                Ok(())
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl BoundValueChecker for ProxyConnection {
    async fn check_bound_value(&mut self, value: &mut BoundValue) -> Result<()> {
        let Some(inner) = self.inner.as_bound_value_checker() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::CheckBoundValue),
            &Args::BoundValue(value),
        );
        match inner.check_bound_value(value).await {
            Ok(()) => {
                call.succeed(&Outcome::Unit);
                Ok(())
            }
            Err(err) => {
                call.fail(&err);
                Err(err)
            }
        }
    }
}
