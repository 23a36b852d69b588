//! # flaskbb-plugin
//!
//! Plugin framework for FlaskBB. Provides:
//!
//! - Hook specifications declared by the host under a project tag
//! - Hook implementations contributed by plugins, dispatched in
//!   registration order
//! - A plugin registry with blocking and a first-party ("internal")
//!   namespace layered over the generic manager contract
//! - Distribution metadata extraction and entry-point discovery
//! - Optional dynamic loading via `libloading` (feature `dynamic`)

pub mod dist_info;
pub mod distribution;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod macros;
pub mod manager;
pub mod metadata;
pub mod plugin;
pub mod prelude;
pub mod registry;
pub mod specs;

pub use dist_info::DistInfoDirectory;
pub use distribution::{
    DistFacade, Distribution, DistributionSource, EntryPoint, InstalledDistributions, MetadataMap,
};
pub use error::{PluginError, PluginResult};
pub use hooks::{HookArgs, HookCaller, HookImpl, HookSpec, HookSpecs};
pub use loader::{Discovery, FactoryResolver, PluginFactory, PluginResolver};
#[cfg(feature = "dynamic")]
pub use loader::DynamicResolver;
pub use manager::{PluginDistInfo, PluginManager};
pub use metadata::DistMeta;
pub use plugin::{Plugin, PluginHandle, PluginKey, PluginSelector};
pub use registry::{BasePluginManager, PluginManagerApi};
pub use specs::FlaskBBSpecs;
