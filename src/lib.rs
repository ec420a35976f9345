//! Ducktable is a structurally-typed object runtime for Rust.
//!
//! Objects respond to any method whose name they know, regardless of what class they were created
//! from. Method names are mapped to dense, process-wide [`Label`]s and [`Tag`]s, classes are built
//! around label-indexed method tables, and call sites remember the class they last saw so that
//! repeated calls skip the lookup entirely.
//!
//! This crate exposes a safe, typed, high-level API built around [`Runtime`] and
//! [`ClassBuilder`]. The [`ll`] module contains the lower-level table protocol that generated code
//! talks to.

pub mod ll;

mod hl;

pub use hl::*;

pub use ll::{
    cache::{CacheId, CacheStats, CallSite, CallSites},
    dispatch::Selector,
    error::Error,
    label::{Label, LabelAllocator},
    method::{Arity, Method, RawMethod},
    object::Object,
    table::{Class, ClassId, Table, VarIndex},
    tag::Tag,
    value::Value,
};
