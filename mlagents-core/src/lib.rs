#![warn(missing_docs)]
//! Backend-free types shared by the action conversions of the trainer.
//!
//! The flat buffer used by the trainer stores every field of an experience
//! as its own array, keyed by name. [`ArrayDict`] is that mapping, and
//! [`BufferKey`] names the keys written for actions.
pub mod error;

mod act;
pub use act::Act;

mod buffer;
pub use buffer::{ArrayDict, BufferArray, BufferKey};

mod action_spec;
pub use action_spec::ActionSpec;

mod action_tuple;
pub use action_tuple::ActionTuple;
