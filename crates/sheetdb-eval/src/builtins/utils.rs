use crate::args::ArgSchema;
use once_cell::sync::Lazy;

/// `(database, field, criteria)`: two array-capable ranges around a scalar
/// field selector. Shared by every D-function.
pub static ARG_DATABASE_TRIPLE: Lazy<Vec<ArgSchema>> = Lazy::new(|| {
    vec![
        ArgSchema::range_array(),
        ArgSchema::any(),
        ArgSchema::range_array(),
    ]
});
