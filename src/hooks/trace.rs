//! Ready-made hooks that log every proxied operation through `tracing`.
//!
//! The Before hook stores the call start in the Tag; Success and Failure
//! log the outcome with per-call latency. Apply at composition time:
//!
//! ```ignore
//! let driver = wrap_driver(Box::new(my_driver), trace::traced());
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::{CallSite, Hooks, Tag};

/// A registry that logs each proxied operation at debug level and each
/// failure at warn level, with elapsed time.
pub fn traced() -> Arc<Hooks> {
    let mut builder = Hooks::builder();
    for site in CallSite::ALL {
        let CallSite { role, operation } = *site;
        builder = builder
            .before(role, operation, |_, _| Some(Tag::new(Instant::now())))
            .on_success(role, operation, |site, tag, _| {
                debug!(
                    role = site.role.name(),
                    operation = site.operation.name(),
                    elapsed_us = elapsed_us(tag.as_ref()),
                    "ok"
                );
            })
            .on_failure(role, operation, |site, tag, error| {
                warn!(
                    role = site.role.name(),
                    operation = site.operation.name(),
                    elapsed_us = elapsed_us(tag.as_ref()),
                    %error,
                    "failed"
                );
            });
    }
    builder.build()
}

fn elapsed_us(tag: Option<&Tag>) -> u128 {
    tag.and_then(|t| t.downcast_ref::<Instant>())
        .map(|start| start.elapsed().as_micros())
        .unwrap_or(0)
}
