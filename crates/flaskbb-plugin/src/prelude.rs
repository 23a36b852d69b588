//! Prelude for convenient imports.

pub use flaskbb_core::error::AppError;
pub use flaskbb_core::result::AppResult;

pub use crate::distribution::{DistFacade, Distribution, EntryPoint};
pub use crate::error::{PluginError, PluginResult};
pub use crate::hooks::definitions::{HookArgs, HookImpl};
pub use crate::hooks::spec::{HookSpec, HookSpecs};
pub use crate::loader::{Discovery, FactoryResolver, PluginResolver};
pub use crate::manager::PluginManager;
pub use crate::plugin::{Plugin, PluginHandle, PluginSelector};
pub use crate::registry::PluginManagerApi;
pub use crate::specs::FlaskBBSpecs;

pub use crate::{hook_args, hookimpl};
