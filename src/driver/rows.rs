//! Rows role: a cursor over query results.

use async_trait::async_trait;

use super::error::{DriverError, Result};
use super::value::Value;

/// A cursor over the rows produced by a query.
#[async_trait]
pub trait Rows: Send {
    /// Column names of the current result set. Not hooked.
    fn columns(&self) -> Vec<String>;

    /// Advance to the next row, filling `row` (one slot per column).
    /// Returns `false` when the result set is exhausted.
    async fn next_row(&mut self, row: &mut [Value]) -> Result<bool>;

    async fn close(&mut self) -> Result<()>;

    fn as_result_set_advancer(&mut self) -> Option<&mut dyn ResultSetAdvancer> {
        None
    }
}

/// Invocation surface for the optional rows operations.
#[async_trait]
pub trait RowsExt: Rows {
    /// `false` when the cursor cannot advance between result sets at all.
    fn has_next_result_set(&mut self) -> bool {
        match self.as_result_set_advancer() {
            Some(capable) => capable.has_next_result_set(),
            None => false,
        }
    }

    async fn next_result_set(&mut self) -> Result<()> {
        match self.as_result_set_advancer() {
            Some(capable) => capable.next_result_set().await,
            None => Err(DriverError::Unsupported),
        }
    }
}

impl<R: Rows + ?Sized> RowsExt for R {}

/// Optional capability: move between multiple result sets of one query.
#[async_trait]
pub trait ResultSetAdvancer: Send {
    /// Whether another result set follows the current one. Not hooked.
    fn has_next_result_set(&mut self) -> bool;

    /// Advance the cursor to the next result set.
    async fn next_result_set(&mut self) -> Result<()>;
}
