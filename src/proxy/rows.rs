//! Rows cursor proxy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::{CapabilitySet, RowsCapability};
use crate::driver::{DriverError, Result, ResultSetAdvancer, Rows, Value};
use crate::hooks::dispatch::ActiveCall;
use crate::hooks::{Args, CallSite, Hooks, Operation, Outcome, Role};

use super::rows_capabilities;

pub(crate) struct ProxyRows {
    inner: Box<dyn Rows>,
    caps: CapabilitySet,
    hooks: Arc<Hooks>,
}

impl ProxyRows {
    pub(crate) fn wrap(mut inner: Box<dyn Rows>, hooks: Arc<Hooks>) -> Self {
        let caps = rows_capabilities(inner.as_mut());
        Self { inner, caps, hooks }
    }

    pub(crate) fn capabilities(&self) -> CapabilitySet {
        self.caps
    }

    fn site(operation: Operation) -> CallSite {
        CallSite::new(Role::Rows, operation)
    }
}

#[async_trait]
impl Rows for ProxyRows {
    fn columns(&self) -> Vec<String> {
        self.inner.columns()
    }

    async fn next_row(&mut self, row: &mut [Value]) -> Result<bool> {
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::AdvanceRow),
            &Args::RowBuffer { width: row.len() },
        );
        match self.inner.next_row(row).await {
            Ok(available) => {
                call.succeed(&Outcome::RowAvailable(available));
                Ok(available)
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

    fn as_result_set_advancer(&mut self) -> Option<&mut dyn ResultSetAdvancer> {
        if self.caps.contains(RowsCapability::NextResultSet.index()) {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl ResultSetAdvancer for ProxyRows {
    fn has_next_result_set(&mut self) -> bool {
        match self.inner.as_result_set_advancer() {
            Some(inner) => inner.has_next_result_set(),
            None => false,
        }
    }

    async fn next_result_set(&mut self) -> Result<()> {
        let Some(inner) = self.inner.as_result_set_advancer() else {
            return Err(DriverError::Unsupported);
        };
        let call = ActiveCall::begin(
            &self.hooks,
            Self::site(Operation::AdvanceResultSet),
            &Args::None,
        );
        match inner.next_result_set().await {
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
