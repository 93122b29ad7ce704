//! Transaction proxy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::driver::{Result, Transaction};
use crate::hooks::dispatch::ActiveCall;
use crate::hooks::{Args, CallSite, Hooks, Operation, Outcome, Role};

pub(crate) struct ProxyTransaction {
    inner: Box<dyn Transaction>,
    hooks: Arc<Hooks>,
}

impl ProxyTransaction {
    pub(crate) fn wrap(inner: Box<dyn Transaction>, hooks: Arc<Hooks>) -> Self {
        Self { inner, hooks }
    }

    fn site(operation: Operation) -> CallSite {
        CallSite::new(Role::Transaction, operation)
    }
}

#[async_trait]
impl Transaction for ProxyTransaction {
    async fn commit(&mut self) -> Result<()> {
        let call = ActiveCall::begin(&self.hooks, Self::site(Operation::Commit), &Args::None);
        match self.inner.commit().await {
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

    async fn rollback(&mut self) -> Result<()> {
        let call = ActiveCall::begin(&self.hooks, Self::site(Operation::Rollback), &Args::None);
        match self.inner.rollback().await {
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
