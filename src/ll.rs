//! The **l**ow-**l**evel (`ll`) object runtime.
//!
//! You usually want to use the [high-level API][crate] instead. This layer deals in raw
//! [`Value`][value::Value] slices and exposes the two-phase table protocol directly, which is what
//! code emitted by a compiler wants to talk to.

pub mod cache;
pub mod dispatch;
pub mod error;
pub mod label;
pub mod method;
pub mod object;
pub mod table;
pub mod tag;
pub mod value;
