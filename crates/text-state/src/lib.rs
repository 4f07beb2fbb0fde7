//! Document-level state over the `text-core` engine.
//!
//! - [`selection::Selection`] is a tracked range with an active end, so
//!   the caret survives every edit and replay without manual fixups.
//! - [`document::Document`] bundles a buffer with its selection and
//!   exposes the edit commands a UI or scripting layer actually calls.
//! - [`relay::MutationRelay`] forwards mutation notifications onto a
//!   channel for consumers outside the editing call stack.

pub mod document;
pub mod relay;
pub mod selection;
