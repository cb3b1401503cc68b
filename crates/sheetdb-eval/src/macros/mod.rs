mod registry_macro;

/// Expand to a `caps()` method returning the union of the named flags.
///
/// ```ignore
/// impl Function for DSumFn {
///     func_caps!(PURE, REDUCTION);
///     ...
/// }
/// ```
#[macro_export]
macro_rules! func_caps {
    ( $($cap:ident),+ $(,)? ) => {
        fn caps(&self) -> $crate::function::FnCaps {
            $crate::function::FnCaps::empty() $( | $crate::function::FnCaps::$cap )+
        }
    };
}
