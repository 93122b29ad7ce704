//! Per-call dispatch state machine.
//!
//! `begin` fires the Before hook and yields an [`ActiveCall`] in state
//! Started; consuming it through `succeed` or `fail` moves it to exactly one
//! terminal state and fires the matching hook with the Tag the Before hook
//! returned. With nothing registered for the call site, begin/finish reduce
//! to a single map lookup.

use super::{Args, CallSite, Hooks, HookSet, Outcome, Tag};
use crate::driver::DriverError;

/// One in-flight proxied call. Created at call start, consumed at call end,
/// never retained beyond the call.
pub(crate) struct ActiveCall<'h> {
    set: Option<&'h HookSet>,
    site: CallSite,
    tag: Option<Tag>,
}

impl<'h> ActiveCall<'h> {
    pub(crate) fn begin(hooks: &'h Hooks, site: CallSite, args: &Args<'_>) -> Self {
        let set = hooks.get(site);
        let tag = match set.and_then(|s| s.before.as_ref()) {
            Some(before) => before(site, args),
            None => None,
        };
        Self { set, site, tag }
    }

    /// The operation returned without error.
    pub(crate) fn succeed(self, outcome: &Outcome<'_>) {
        if let Some(success) = self.set.and_then(|s| s.success.as_ref()) {
            success(self.site, self.tag, outcome);
        }
    }

    /// The operation returned an error.
    pub(crate) fn fail(self, error: &DriverError) {
        if let Some(failure) = self.set.and_then(|s| s.failure.as_ref()) {
            failure(self.site, self.tag, error);
        }
    }
}
