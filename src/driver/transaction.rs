//! Transaction role.

use std::fmt;

use async_trait::async_trait;

use super::error::Result;

/// An open transaction. The proxy delegates both operations unchanged;
/// commit-after-rollback and similar sequencing rules are the driver's.
#[async_trait]
pub trait Transaction: Send {
    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}

impl fmt::Debug for dyn Transaction + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Transaction")
    }
}
