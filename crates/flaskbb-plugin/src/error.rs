//! Plugin subsystem errors.

use thiserror::Error;

use flaskbb_core::error::{AppError, ErrorKind};

/// Errors raised by registration, discovery and hook dispatch.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The same plugin object is already bound to a name.
    #[error("Plugin already registered: {name}")]
    AlreadyRegistered {
        /// Name the object is currently bound to.
        name: String,
    },

    /// Another plugin object already holds the requested name.
    #[error("Plugin name already registered: {name}")]
    NameConflict {
        /// The contested canonical name.
        name: String,
    },

    /// An entry point could not be resolved to a plugin object.
    #[error("Plugin '{name}' could not be loaded: {reason}")]
    PluginLoad {
        /// Entry-point name.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A hook specification was re-declared with different parameters.
    #[error("Hook '{hook}' already specified with arguments {existing:?}, got {declared:?}")]
    SpecConflict {
        /// Hook name.
        hook: String,
        /// Parameters of the registered specification.
        existing: Vec<String>,
        /// Parameters of the rejected declaration.
        declared: Vec<String>,
    },

    /// A handler declares a parameter its specification does not have.
    #[error("Plugin '{plugin}' for hook '{hook}': argument {argument:?} not available (spec accepts {accepted:?})")]
    ArgMismatch {
        /// Owning plugin.
        plugin: String,
        /// Hook name.
        hook: String,
        /// The surplus parameter.
        argument: String,
        /// Parameters the specification accepts.
        accepted: Vec<String>,
    },

    /// A handler needs an argument the caller did not pass.
    #[error("Hook '{hook}' call for plugin '{plugin}' is missing argument {argument:?}")]
    HookCall {
        /// Hook name.
        hook: String,
        /// Plugin whose handler needed the argument.
        plugin: String,
        /// The missing argument.
        argument: String,
    },

    /// No specification and no implementation exist for a hook name.
    #[error("Unknown hook: {hook}")]
    UnknownHook {
        /// Hook name.
        hook: String,
    },

    /// A specification container carried nothing for this project.
    #[error("Did not find any '{project}' hooks in {container}")]
    NoHookSpecs {
        /// Project tag of the manager.
        project: String,
        /// Container description.
        container: String,
    },

    /// An implementation never found a specification.
    #[error("Unknown hook '{hook}' in plugin '{plugin}'")]
    PendingImpl {
        /// Owning plugin.
        plugin: String,
        /// Hook name without a specification.
        hook: String,
    },

    /// A handler returned an error.
    #[error("Hook '{hook}' failed in plugin '{plugin}': {source}")]
    Handler {
        /// Hook name.
        hook: String,
        /// Owning plugin.
        plugin: String,
        /// The handler's error.
        #[source]
        source: AppError,
    },

    /// Distribution metadata could not be read.
    #[error("Invalid distribution metadata in {path}: {reason}")]
    Metadata {
        /// Where the metadata lives.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A specialized `Result` type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        let kind = match &err {
            PluginError::AlreadyRegistered { .. } | PluginError::NameConflict { .. } => {
                ErrorKind::Conflict
            }
            PluginError::SpecConflict { .. }
            | PluginError::ArgMismatch { .. }
            | PluginError::HookCall { .. } => ErrorKind::Validation,
            PluginError::UnknownHook { .. } => ErrorKind::NotFound,
            PluginError::NoHookSpecs { .. }
            | PluginError::PendingImpl { .. }
            | PluginError::PluginLoad { .. }
            | PluginError::Handler { .. }
            | PluginError::Metadata { .. } => ErrorKind::Plugin,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
