//! Sqltap - capability-preserving SQL driver instrumentation
//!
//! Wraps any driver implementing the [`driver`] contract set and routes every
//! operation through a before/success/failure hook protocol, without changing
//! which optional capabilities the wrapped driver exposes.
//!
//! # Architecture
//!
//! Hooks are applied at composition time, not in driver implementations:
//!
//! ```ignore
//! let hooks = Hooks::builder()
//!     .before(Role::Connection, Operation::Query, |_, args| {
//!         Some(Tag::new(Instant::now()))
//!     })
//!     .build();
//!
//! // Use as normal - hooks are transparent
//! let driver = wrap_driver(Box::new(my_driver), hooks);
//! let mut conn = driver.open("db://local").await?;
//! ```
//!
//! The proxy adds no behavior of its own: transactions, pooling, and retries
//! remain whatever the wrapped driver does.

pub mod capability;
pub mod driver;
pub mod hooks;
pub mod mock;
pub mod proxy;

pub use hooks::{Hooks, HooksBuilder, Operation, Role, Tag};
pub use proxy::{wrap_connector, wrap_driver};
