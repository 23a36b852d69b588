//! Convenience macros for plugin development.

/// Builds [`HookArgs`](crate::hooks::HookArgs) from `name => value` pairs.
///
/// # Example
/// ```rust,ignore
/// let args = hook_args!("app" => app.clone(), "pluggy" => manager_summary);
/// pm.invoke("flaskbb_additional_setup", &args)?;
/// ```
#[macro_export]
macro_rules! hook_args {
    () => {
        $crate::hooks::HookArgs::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let args = $crate::hooks::HookArgs::new();
        $(
            let args = args.with($name, $value);
        )+
        args
    }};
}

/// Declares a hook implementation with its parameter list.
///
/// # Example
/// ```rust,ignore
/// let hookimpl = hookimpl!(flaskbb_cli(cli) => |args| {
///     Ok(args.get::<String>("cli").map(|c| json!(c)))
/// });
/// ```
#[macro_export]
macro_rules! hookimpl {
    ($hook:ident ( $($arg:ident),* $(,)? ) => $handler:expr) => {
        $crate::hooks::HookImpl::new(
            stringify!($hook),
            &[$(stringify!($arg)),*],
            $handler,
        )
    };
}
