//! Per-call options for opening a nested cursor.

use std::time::Duration;

/// Options applied when a nested cursor is first opened.
///
/// A cursor is opened once per session and nested type; the request of the
/// call that opens it is the one that takes effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NestedRequest {
    pub(crate) reprojection: Option<String>,
    pub(crate) properties: Option<Vec<String>>,
    pub(crate) include_mandatory: bool,
    pub(crate) resolve_depth: u32,
    pub(crate) resolve_timeout: Option<Duration>,
}

impl NestedRequest {
    /// Requests every property with resolution disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the opaque reprojection target.
    pub fn with_reprojection(mut self, target: impl Into<String>) -> Self {
        self.reprojection = Some(target.into());
        self
    }

    /// Selects properties by target path.
    pub fn with_properties<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Adds the mandatory attributes to an explicit property selection.
    pub fn with_mandatory(mut self, include: bool) -> Self {
        self.include_mandatory = include;
        self
    }

    /// Enables reference resolution up to `depth` levels.
    pub fn with_resolve_depth(mut self, depth: u32) -> Self {
        self.resolve_depth = depth;
        self
    }

    /// Sets the resolution timeout.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = Some(timeout);
        self
    }

    pub fn reprojection(&self) -> Option<&str> {
        self.reprojection.as_deref()
    }

    pub fn properties(&self) -> Option<&[String]> {
        self.properties.as_deref()
    }

    pub fn include_mandatory(&self) -> bool {
        self.include_mandatory
    }

    pub fn resolve_depth(&self) -> u32 {
        self.resolve_depth
    }

    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout
    }
}
