mod database;

use crate::function_registry::FunctionRegistry;
use crate::traits::{CalcValue, DefaultFunctionContext};
use sheetdb_common::LiteralValue;

pub(crate) fn t(s: &str) -> LiteralValue {
    LiteralValue::Text(s.into())
}

pub(crate) fn n(v: i64) -> LiteralValue {
    LiteralValue::Int(v)
}

/// Headers `Tree, Height, Age`, rows `(Apple, 18, 20)` and `(Pear, 12, 12)`.
pub(crate) fn trees() -> Vec<Vec<LiteralValue>> {
    vec![
        vec![t("Tree"), t("Height"), t("Age")],
        vec![t("Apple"), n(18), n(20)],
        vec![t("Pear"), n(12), n(12)],
    ]
}

/// Look `name` up in the builtin registry and dispatch it over
/// `(database, field, criteria)` with the default context.
pub(crate) fn call_d(
    name: &str,
    database: &[Vec<LiteralValue>],
    field: LiteralValue,
    criteria: &[Vec<LiteralValue>],
) -> LiteralValue {
    let registry = FunctionRegistry::with_builtins().expect("builtins register cleanly");
    let f = registry
        .get("", name)
        .unwrap_or_else(|| panic!("{name} not registered"));
    let ctx = DefaultFunctionContext::default();
    let args = [
        CalcValue::Scalar(LiteralValue::Array(database.to_vec())),
        CalcValue::Scalar(field),
        CalcValue::Scalar(LiteralValue::Array(criteria.to_vec())),
    ];
    f.dispatch(&args, &ctx)
}
