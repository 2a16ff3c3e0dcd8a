#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod codec;
pub mod mode;
pub mod topic;

mod command;
mod registry;
mod snapshot;
pub use command::*;
pub use registry::*;
pub use snapshot::*;

pub use compact_str::CompactString;

pub use self::{
    codec::CodecError,
    topic::{Direction, PropertyTopic, TopicPrefix},
};
