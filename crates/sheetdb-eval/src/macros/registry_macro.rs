/// Register several unit-struct functions into a
/// [`FunctionRegistryBuilder`](crate::function_registry::FunctionRegistryBuilder).
///
/// Evaluates to `Result<(), RegistryError>`; stops at the first duplicate.
#[macro_export]
macro_rules! register_functions {
    ( $builder:expr; $($fn:expr),+ $(,)? ) => {{
        let builder: &mut $crate::function_registry::FunctionRegistryBuilder = $builder;
        (|| -> ::std::result::Result<(), $crate::function_registry::RegistryError> {
            $(
                builder.register(::std::sync::Arc::new($fn))?;
            )+
            Ok(())
        })()
    }};
}
