//! Hook system: specifications, implementations, and dispatch.

pub mod definitions;
pub mod dispatcher;
pub mod registry;
pub mod spec;

pub use definitions::{HookArg, HookArgs, HookFn, HookImpl};
pub use dispatcher::{HookCaller, concat_results};
pub use registry::{HookEntry, HookRegistry};
pub use spec::{HookSpec, HookSpecRegistry, HookSpecs};
