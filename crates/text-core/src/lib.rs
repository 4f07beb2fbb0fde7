//! The text-buffer engine: offset-addressed character storage, live
//! range and marker tracking, mutation-observer fan-out, and the
//! undo/redo log, wired together behind [`buffer::Buffer`].
//!
//! Layering, leaves first:
//!
//! - [`storage`]: the gap buffer. Mechanism only.
//! - [`range`] / [`marker`]: offset tables kept consistent across edits.
//! - [`observer`]: notification fan-out and redisplay change trackers.
//! - [`undo`]: the record log and its state machine.
//! - [`buffer`]: the composition root every mutation flows through.
//! - [`motion`]: read-only line/word navigation over a buffer.

pub mod buffer;
pub mod errors;
pub mod marker;
pub mod motion;
pub mod observer;
pub mod range;
pub mod storage;
pub mod undo;
