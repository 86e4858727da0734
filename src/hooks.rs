//! Optional per-file collaborator hooks.
//!
//! Three named extension points, invoked once per file with the
//! filename and resolved type, each free to mutate the shared buffer:
//! `pre` before the pipeline, `main` between comment removal and
//! compression, `post` after cleanup. Absence is a no-op
//! implementation, not a runtime existence check.

/// Caller-injected pipeline extension points.
#[allow(unused_variables)]
pub trait RenderHooks {
    /// Runs before the first pipeline stage.
    fn pre(&self, filename: &str, type_name: &str, buffer: &mut String) {}

    /// Runs between comment removal and compression.
    fn main(&self, filename: &str, type_name: &str, buffer: &mut String) {}

    /// Runs after the final cleanup stage.
    fn post(&self, filename: &str, type_name: &str, buffer: &mut String) {}
}

/// The default collaborator: does nothing at every extension point.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl RenderHooks for NoopHooks {}
