use super::{call_d, n, t, trees};
use crate::builtins::database::DSumFn;
use crate::criteria::CriteriaConfig;
use crate::function::Function;
use crate::traits::{CalcValue, DefaultFunctionContext};
use sheetdb_common::{ExcelError, ExcelErrorKind, LiteralValue};

fn assert_num(v: LiteralValue, expected: f64) {
    match v {
        LiteralValue::Number(x) => assert!(
            (x - expected).abs() < 1e-9,
            "expected {expected}, got {x}"
        ),
        other => panic!("expected {expected}, got {other:?}"),
    }
}

fn assert_err(v: LiteralValue, kind: ExcelErrorKind) {
    match v {
        LiteralValue::Error(e) => assert_eq!(e.kind, kind, "{e}"),
        other => panic!("expected {kind}, got {other:?}"),
    }
}

fn apple_criteria() -> Vec<Vec<LiteralValue>> {
    vec![vec![t("Tree")], vec![t("Apple")]]
}

#[test]
fn single_match_agrees_across_sum_get_and_average() {
    let db = trees();
    let crit = apple_criteria();
    assert_num(call_d("DSUM", &db, t("Height"), &crit), 18.0);
    assert_eq!(call_d("DGET", &db, t("Height"), &crit), n(18));
    assert_num(call_d("DAVERAGE", &db, t("Height"), &crit), 18.0);
}

#[test]
fn or_rows_with_empty_field_count_both_trees() {
    let crit = vec![vec![t("Height")], vec![t(">12")], vec![t("<20")]];
    assert_num(call_d("DCOUNTA", &trees(), LiteralValue::Empty, &crit), 2.0);
    assert_num(call_d("DCOUNT", &trees(), LiteralValue::Empty, &crit), 2.0);
}

#[test]
fn criteria_naming_no_data_column_selects_all_rows() {
    let crit = vec![vec![t("Colour")], vec![t("Red")]];
    assert_num(call_d("DSUM", &trees(), t("Age"), &crit), 32.0);
    assert_num(call_d("DCOUNT", &trees(), t("Age"), &crit), 2.0);
}

#[test]
fn genuine_no_match_per_function() {
    let db = trees();
    let crit = vec![vec![t("Tree")], vec![t("Cherry")]];
    assert_num(call_d("DSUM", &db, t("Height"), &crit), 0.0);
    assert_num(call_d("DCOUNT", &db, t("Height"), &crit), 0.0);
    assert_num(call_d("DMAX", &db, t("Height"), &crit), 0.0);
    assert_num(call_d("DPRODUCT", &db, t("Height"), &crit), 0.0);
    assert_err(call_d("DGET", &db, t("Height"), &crit), ExcelErrorKind::Value);
    assert_err(call_d("DAVERAGE", &db, t("Height"), &crit), ExcelErrorKind::Div);
    assert_err(call_d("DSTDEV", &db, t("Height"), &crit), ExcelErrorKind::Div);
    assert_err(call_d("DVARP", &db, t("Height"), &crit), ExcelErrorKind::Div);
}

#[test]
fn field_name_and_ordinal_select_the_same_column() {
    let crit = vec![vec![t("Height")], vec![t(">=12")]];
    for f in ["DSUM", "DAVERAGE", "DMAX", "DMIN", "DVARP"] {
        assert_eq!(
            call_d(f, &trees(), t("Age"), &crit),
            call_d(f, &trees(), n(3), &crit),
            "{f}"
        );
    }
}

#[test]
fn unknown_field_name_reports_no_match_first() {
    let none = vec![vec![t("Tree")], vec![t("Cherry")]];
    for f in ["DSUM", "DCOUNT", "DMAX", "DMIN", "DPRODUCT"] {
        assert_num(call_d(f, &trees(), t("Weight"), &none), 0.0);
    }
    for f in ["DAVERAGE", "DSTDEV", "DSTDEVP", "DVAR", "DVARP"] {
        assert_err(call_d(f, &trees(), t("Weight"), &none), ExcelErrorKind::Div);
    }
    assert_err(call_d("DGET", &trees(), t("Weight"), &none), ExcelErrorKind::Value);

    let apple = apple_criteria();
    for f in ["DSUM", "DGET", "DAVERAGE", "DSTDEV"] {
        assert_err(call_d(f, &trees(), t("Weight"), &apple), ExcelErrorKind::Value);
    }
}

#[test]
fn out_of_range_ordinal_fails_before_matching() {
    let none = vec![vec![t("Tree")], vec![t("Cherry")]];
    for f in ["DSUM", "DGET", "DAVERAGE", "DSTDEV"] {
        assert_err(call_d(f, &trees(), n(9), &none), ExcelErrorKind::Value);
    }
    assert_err(
        call_d("DSUM", &trees(), LiteralValue::Empty, &none),
        ExcelErrorKind::Value,
    );
    assert_err(
        call_d("DVAR", &trees(), LiteralValue::Empty, &apple_criteria()),
        ExcelErrorKind::Value,
    );
}

#[test]
fn numeric_text_field_selects_by_position() {
    assert_num(
        call_d("DSUM", &trees(), t("2"), &apple_criteria()),
        18.0,
    );
}

#[test]
fn duplicate_data_header_fills_only_blanks() {
    let db = vec![
        vec![t("Tree"), t("Qty"), t("Qty")],
        vec![t("Apple"), n(1), n(100)],
        vec![t("Pear"), LiteralValue::Empty, n(5)],
    ];
    let all = vec![vec![t("Tree")]];
    assert_num(call_d("DSUM", &db, t("Qty"), &all), 6.0);
    assert_err(call_d("DSUM", &db, n(3), &all), ExcelErrorKind::Value);
}

#[test]
fn operators_wildcards_and_prefix_matching() {
    let db = trees();
    let height = |c: &str| vec![vec![t("Tree")], vec![t(c)]];
    assert_eq!(call_d("DGET", &db, t("Height"), &height("<>Apple")), n(12));
    assert_eq!(call_d("DGET", &db, t("Height"), &height("?ear")), n(12));
    assert_eq!(call_d("DGET", &db, t("Height"), &height("A*e")), n(18));
    assert_eq!(call_d("DGET", &db, t("Height"), &height("apple")), n(18));
    assert_eq!(call_d("DGET", &db, t("Height"), &height("Ap")), n(18));
    assert_err(
        call_d("DGET", &db, t("Height"), &height("=Ap")),
        ExcelErrorKind::Value,
    );
}

#[test]
fn numeric_criteria_cells_compare_numerically() {
    let crit = vec![vec![t("Height")], vec![n(12)]];
    assert_eq!(call_d("DGET", &trees(), t("Tree"), &crit), t("Pear"));
    let ge = vec![vec![t("Age")], vec![t(">=20")]];
    assert_eq!(call_d("DGET", &trees(), t("Tree"), &ge), t("Apple"));
}

#[test]
fn and_within_row_or_across_rows() {
    let crit = vec![
        vec![t("Tree"), t("Age")],
        vec![t("Apple"), t("<10")],
        vec![t("Pear"), t(">10")],
    ];
    assert_num(call_d("DSUM", &trees(), t("Height"), &crit), 12.0);

    let both = vec![vec![t("Tree"), t("Age")], vec![LiteralValue::Empty, t(">10")]];
    assert_num(call_d("DSUM", &trees(), t("Height"), &both), 30.0);
}

#[test]
fn error_criteria_cell_matches_nothing() {
    let crit = vec![
        vec![t("Tree")],
        vec![LiteralValue::Error(ExcelError::new_na())],
    ];
    assert_num(call_d("DSUM", &trees(), t("Height"), &crit), 0.0);
}

#[test]
fn dget_ambiguity_and_blank_only_matches() {
    let all = vec![vec![t("Tree")]];
    assert_err(call_d("DGET", &trees(), t("Age"), &all), ExcelErrorKind::Num);

    let db = vec![
        vec![t("Tree"), t("Note")],
        vec![t("Apple"), LiteralValue::Empty],
    ];
    let crit = apple_criteria();
    assert_err(call_d("DGET", &db, t("Note"), &crit), ExcelErrorKind::Value);
    assert_err(call_d("DAVERAGE", &db, t("Note"), &crit), ExcelErrorKind::Div);
    assert_num(call_d("DSUM", &db, t("Note"), &crit), 0.0);
    assert_num(call_d("DCOUNTA", &db, t("Note"), &crit), 0.0);
    assert_err(call_d("DVAR", &db, t("Note"), &crit), ExcelErrorKind::Div);
}

#[test]
fn numeric_text_counts_for_sums_but_not_for_deviation() {
    let db = vec![
        vec![t("Item"), t("Weight")],
        vec![t("Box"), t("12kg")],
        vec![t("Bag"), n(4)],
        vec![t("Tin"), LiteralValue::Boolean(true)],
    ];
    let all = vec![vec![t("Item")]];
    assert_num(call_d("DSUM", &db, t("Weight"), &all), 16.0);
    assert_num(call_d("DCOUNT", &db, t("Weight"), &all), 2.0);
    assert_num(call_d("DCOUNTA", &db, t("Weight"), &all), 3.0);
    assert_num(call_d("DAVERAGE", &db, t("Weight"), &all), 8.0);
    assert_num(call_d("DVARP", &db, t("Weight"), &all), 0.0);
}

#[test]
fn product_seeds_from_first_number() {
    let all = vec![vec![t("Tree")]];
    assert_num(call_d("DPRODUCT", &trees(), t("Age"), &all), 240.0);
    assert_num(call_d("DPRODUCT", &trees(), t("Tree"), &all), 0.0);
}

#[test]
fn deviation_family_propagates_matched_errors() {
    let db = vec![
        vec![t("Tree"), t("Height")],
        vec![t("Apple"), LiteralValue::Error(ExcelError::new_na())],
        vec![t("Pear"), n(12)],
    ];
    let all = vec![vec![t("Tree")]];
    for f in ["DSTDEV", "DSTDEVP", "DVAR", "DVARP"] {
        assert_err(call_d(f, &db, t("Height"), &all), ExcelErrorKind::Na);
    }
    assert_num(call_d("DSUM", &db, t("Height"), &all), 12.0);
}

#[test]
fn sample_deviation_of_one_value_is_nan() {
    match call_d("DSTDEV", &trees(), t("Height"), &apple_criteria()) {
        LiteralValue::Number(x) => assert!(x.is_nan()),
        other => panic!("expected NaN, got {other:?}"),
    }
    assert_num(call_d("DSTDEVP", &trees(), t("Height"), &apple_criteria()), 0.0);
}

#[test]
fn sample_and_population_statistics() {
    let all = vec![vec![t("Tree")]];
    // Heights 18 and 12: mean 15, squared deviations sum to 18.
    assert_num(call_d("DVAR", &trees(), t("Height"), &all), 18.0);
    assert_num(call_d("DVARP", &trees(), t("Height"), &all), 9.0);
    assert_num(call_d("DSTDEV", &trees(), t("Height"), &all), 18f64.sqrt());
    assert_num(call_d("DSTDEVP", &trees(), t("Height"), &all), 3.0);
}

#[test]
fn case_sensitive_matcher_is_honoured() {
    let ctx = DefaultFunctionContext::new(CriteriaConfig {
        case_sensitive: true,
        ..CriteriaConfig::default()
    });
    let args = [
        CalcValue::Scalar(LiteralValue::Array(trees())),
        CalcValue::Scalar(t("Height")),
        CalcValue::Scalar(LiteralValue::Array(vec![vec![t("Tree")], vec![t("apple")]])),
    ];
    assert_eq!(DSumFn.dispatch(&args, &ctx), LiteralValue::Number(0.0));
}

#[test]
fn exact_match_when_prefix_rewrite_is_off() {
    let ctx = DefaultFunctionContext::new(CriteriaConfig {
        implicit_prefix_match: false,
        ..CriteriaConfig::default()
    });
    let crit = |c: &str| {
        CalcValue::Scalar(LiteralValue::Array(vec![vec![t("Tree")], vec![t(c)]]))
    };
    let run = |c: &str| {
        DSumFn.dispatch(
            &[
                CalcValue::Scalar(LiteralValue::Array(trees())),
                CalcValue::Scalar(t("Height")),
                crit(c),
            ],
            &ctx,
        )
    };
    assert_eq!(run("Ap"), LiteralValue::Number(0.0));
    assert_eq!(run("Apple"), LiteralValue::Number(18.0));
}
