use std::time::{Duration, Instant};

use notebook_pro_config::NotebookConfig;
use notebook_pro_core::{DocumentSession, MemorySurface, SessionRegistry};

/// A session over an in-memory surface holding `text`, default config.
#[allow(dead_code)]
pub fn session(text: &str) -> DocumentSession<MemorySurface> {
    DocumentSession::attach("doc", MemorySurface::from_text(text), &NotebookConfig::default())
}

#[allow(dead_code)]
pub fn registry() -> SessionRegistry<MemorySurface> {
    SessionRegistry::new(NotebookConfig::default())
}

/// Virtual clock: `ms` milliseconds after `t0`.
pub fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

/// Types `text` as the user would and lets the debounce interval pass.
#[allow(dead_code)]
pub fn type_and_settle(session: &mut DocumentSession<MemorySurface>, t0: Instant, text: &str) -> Instant {
    session.edit(t0, |s| s.type_text(text)).unwrap();
    let settled = at(t0, 400);
    session.tick(settled);
    settled
}
