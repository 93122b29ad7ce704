//! Statement proxy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::{CapabilitySet, StatementCapability};
use crate::driver::{
    BoundValue, BoundValueChecker, CallContext, DriverError, ExecOutcome, ExecWithContext,
    QueryWithContext, Result, Rows, Statement, Value,
};
use crate::hooks::dispatch::ActiveCall;
use crate::hooks::{Args, CallSite, Hooks, Operation, Outcome, Role};

use super::{statement_capabilities, ProxyRows};

pub(crate) struct ProxyStatement {
    inner: Box<dyn Statement>,
    caps: CapabilitySet,
    hooks: Arc<Hooks>,
}

impl ProxyStatement {
    pub(crate) fn wrap(mut inner: Box<dyn Statement>, hooks: Arc<Hooks>) -> Self {
        let caps = statement_capabilities(inner.as_mut());
        Self { inner, caps, hooks }
    }

    pub(crate) fn capabilities(&self) -> CapabilitySet {
        self.caps
    }

    fn site(operation: Operation) -> CallSite {
        CallSite::new(Role::Statement, operation)
    }
}

#[async_trait]
impl Statement for ProxyStatement {
    fn num_params(&self) -> Option<usize> {
        self.inner.num_params()
    }

    async fn exec(&mut self, params: &[Value]) -> Result<ExecOutcome> {
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::Exec),
            &Args::Params(params),
        );
        match self.inner.exec(params).await {
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

    async fn query(&mut self, params: &[Value]) -> Result<Box<dyn Rows>> {
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::Query),
            &Args::Params(params),
        );
        match self.inner.query(params).await {
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

    fn as_exec_with_context(&mut self) -> Option<&mut dyn ExecWithContext> {
        if self.caps.contains(StatementCapability::ExecWithContext.index()) {
            Some(self)
        } else {
            None
        }
    }

    fn as_query_with_context(&mut self) -> Option<&mut dyn QueryWithContext> {
        if self.caps.contains(StatementCapability::QueryWithContext.index()) {
            Some(self)
        } else {
            None
        }
    }

    // Probed per call, mirroring the inner statement's per-call answer.
    fn as_bound_value_checker(&mut self) -> Option<&mut dyn BoundValueChecker> {
        if self.inner.as_bound_value_checker().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl ExecWithContext for ProxyStatement {
    async fn exec_with_context(
        &mut self,
        cx: &CallContext,
        params: &[BoundValue],
    ) -> Result<ExecOutcome> {
        let Some(inner) = self.inner.as_exec_with_context() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::ExecWithContext),
            &Args::BoundParams(params),
        );
        match inner.exec_with_context(cx, params).await {
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
}

#[async_trait]
impl QueryWithContext for ProxyStatement {
    async fn query_with_context(
        &mut self,
        cx: &CallContext,
        params: &[BoundValue],
    ) -> Result<Box<dyn Rows>> {
        let Some(inner) = self.inner.as_query_with_context() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::QueryWithContext),
            &Args::BoundParams(params),
        );
        match inner.query_with_context(cx, params).await {
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
}

#[async_trait]
impl BoundValueChecker for ProxyStatement {
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
