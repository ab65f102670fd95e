// Tools module - external compiler/translator invocation
//
// Design: embedding logic only talks to the ToolRunner trait, so the real
// process runner can be swapped for a scripted fake in tests.

pub mod runner;
pub mod scratch;

pub use runner::{ProcessRunner, ToolError, ToolRunner};
pub use scratch::Scratch;
