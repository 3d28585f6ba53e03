//! Lifecycle hooks: a host-supplied callback pair invoked around decoder
//! acquisition.
//!
//! Two callbacks, both invoked exactly once per [`crate::tile`] call when a
//! hook is supplied, `post` firing even when decoder creation failed.

/// Callbacks invoked around the image decoder's creation.
///
/// Both methods default to no-ops, so callers that don't need lifecycle
/// visibility can pass `None` to [`crate::tile`] entirely, and callers that
/// only care about one side can override just that method.
pub trait TilerHooks {
    /// Invoked immediately before the decoder is opened.
    fn pre_image_reader_created(&mut self) {}

    /// Invoked immediately after decoder creation, whether it succeeded or
    /// failed.
    fn post_image_reader_created(&mut self) {}
}
