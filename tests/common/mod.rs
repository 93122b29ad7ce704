//! Shared utilities for integration tests.
//!
//! Provides a hook registry that records every phase at every call site,
//! so tests can assert on dispatch order across a whole object graph.

use std::sync::{Arc, Mutex};

use sqltap::hooks::{CallSite, Hooks};
use sqltap::Tag;

/// Ordered record of hook firings, one `"phase role.operation"` entry each.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("recorder lock").clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.events().iter().any(|e| e == entry)
    }

    fn note(&self, phase: &str, site: CallSite) {
        self.events
            .lock()
            .expect("recorder lock")
            .push(format!("{phase} {}.{}", site.role, site.operation));
    }
}

/// Hooks covering every proxied call site. Each Before hook returns its
/// call site as the tag; the terminal hooks assert the tag round-trips.
pub fn recording_hooks() -> (Arc<Hooks>, Recorder) {
    let recorder = Recorder::default();
    let mut builder = Hooks::builder();

    for site in CallSite::ALL {
        let r = recorder.clone();
        builder = builder.before(site.role, site.operation, move |s, _| {
            r.note("before", s);
            Some(Tag::new(s))
        });

        let r = recorder.clone();
        builder = builder.on_success(site.role, site.operation, move |s, tag, _| {
            let tagged = tag.and_then(|t| t.downcast::<CallSite>());
            assert_eq!(tagged, Some(s), "tag should come from this call's Before");
            r.note("success", s);
        });

        let r = recorder.clone();
        builder = builder.on_failure(site.role, site.operation, move |s, tag, _| {
            let tagged = tag.and_then(|t| t.downcast::<CallSite>());
            assert_eq!(tagged, Some(s), "tag should come from this call's Before");
            r.note("failure", s);
        });
    }

    (builder.build(), recorder)
}
