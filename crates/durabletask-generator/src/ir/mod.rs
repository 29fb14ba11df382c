//! Descriptors for discovered durable tasks.
//!
//! The IR is produced once per generation pass by the discovery stage and
//! consumed exactly once by the code generator. Nothing in here is mutated
//! after construction.

mod mode;
mod task;

pub use mode::{GenerationMode, HOST_INTEGRATION_MODULE};
pub use task::{
    DiscoveredTasks, FunctionDescriptor, FunctionParameter, NameSource, TaskDescriptor, TaskKind,
};
