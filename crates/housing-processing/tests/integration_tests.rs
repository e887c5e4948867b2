//! Integration tests for the housing data pipeline.
//!
//! These tests verify end-to-end behavior using small Melbourne-style
//! datasets under `tests/fixtures`.

use housing_processing::plots::{
    CORRELATION_HEATMAP_FILE, PREDICTION_VS_TRUE_FILE, PRICE_DISTRIBUTION_FILE,
};
use housing_processing::{
    CleaningConfig, DataCleaner, EmptyMedianPolicy, PlotStyle, ProcessingError, RepairAction,
    RepairRule, RuleCondition, build_preprocessor, load_and_clean, plot_correlation_heatmap,
    plot_price_distribution, plot_true_vs_pred, read_csv,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(filename: &str) -> PathBuf {
    fixtures_path().join(filename)
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn str_column(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn row_index(df: &DataFrame, address: &str) -> usize {
    str_column(df, "Address")
        .iter()
        .position(|a| a.as_deref() == Some(address))
        .unwrap_or_else(|| panic!("no row for {address}"))
}

// ============================================================================
// Loader-Cleaner
// ============================================================================

#[test]
fn test_sample_dataset_is_repaired() {
    let df = load_and_clean(fixture("melb_sample.csv"), None).unwrap();

    // 12 rows, one duplicate, one missing price
    assert_eq!(df.height(), 10);

    for col in ["Price", "Car", "BuildingArea", "YearBuilt", "CouncilArea"] {
        assert_eq!(df.column(col).unwrap().null_count(), 0, "{col} has nulls");
    }

    let car = f64_column(&df, "Car");
    assert_eq!(car[row_index(&df, "6 Smith St")], Some(0.0));

    let area = f64_column(&df, "BuildingArea");
    assert_eq!(area[row_index(&df, "85 Turner St")], Some(131.0));

    // 1900 and 1970 both occur twice; the smaller wins
    let year = f64_column(&df, "YearBuilt");
    assert_eq!(year[row_index(&df, "40 Federation La")], Some(1900.0));

    let council = str_column(&df, "CouncilArea");
    assert_eq!(
        council[row_index(&df, "154 Halsey Rd")].as_deref(),
        Some("Unknown")
    );
}

#[test]
fn test_house_land_replaced_by_house_median() {
    let df = load_and_clean(fixture("melb_sample.csv"), None).unwrap();

    let land = f64_column(&df, "Landsize");
    let types = str_column(&df, "Type");

    for (size, kind) in land.iter().zip(&types) {
        if kind.as_deref() == Some("h") {
            assert!(size.unwrap() > 0.0);
        }
    }
    // median of [120, 134, 156, 202, 250, 630]
    assert_eq!(land[row_index(&df, "40 Federation La")], Some(179.0));
    assert_eq!(land[row_index(&df, "6 Smith St")], Some(179.0));
    // units keep their zero
    assert_eq!(land[row_index(&df, "2/14 Docker St")], Some(0.0));
}

#[test]
fn test_three_identical_rows_among_ten() {
    let df = load_and_clean(fixture("duplicates.csv"), None).unwrap();
    assert_eq!(df.height(), 8);

    // first occurrence kept in place
    let suburbs = str_column(&df, "Suburb");
    assert_eq!(suburbs[0].as_deref(), Some("Carlton"));
    assert_eq!(suburbs[3].as_deref(), Some("Kew"));
}

#[test]
fn test_quality_report_of_sample() {
    let outcome = DataCleaner::default()
        .load_and_clean(fixture("melb_sample.csv"), None)
        .unwrap();
    let quality = &outcome.quality;

    assert_eq!(quality.rows, 12);
    assert_eq!(quality.columns, 18);
    assert_eq!(quality.duplicate_rows, 1);

    let order: Vec<&str> = quality.missing.iter().map(|m| m.column.as_str()).collect();
    assert_eq!(
        order,
        vec!["BuildingArea", "YearBuilt", "Price", "Car", "CouncilArea"]
    );
    assert_eq!(quality.missing_in("BuildingArea"), 4);
    assert_eq!(quality.inconsistencies[0].rows, 2);

    let summary = &outcome.summary;
    assert_eq!(summary.rows_before, 12);
    assert_eq!(summary.rows_after, 10);
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(summary.repairs.len(), 6);
    assert_eq!(summary.saved_to, None);
}

#[test]
fn test_without_save_path_nothing_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("homes.csv");
    std::fs::copy(fixture("melb_sample.csv"), &input).unwrap();

    let df = load_and_clean(&input, None).unwrap();
    assert_eq!(df.height(), 10);

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_save_path_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("processed/cleaned.csv");

    let outcome = DataCleaner::default()
        .load_and_clean(fixture("melb_sample.csv"), Some(&output))
        .unwrap();

    assert!(output.exists());
    assert_eq!(
        outcome.summary.saved_to.as_deref(),
        Some(output.display().to_string().as_str())
    );

    let saved = read_csv(&output, b',', None).unwrap();
    assert_eq!(saved.shape(), outcome.data.shape());
}

#[test]
fn test_missing_input_is_not_found_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out/cleaned.csv");

    let result = load_and_clean(dir.path().join("missing.csv"), Some(&output));

    match result {
        Err(ProcessingError::NotFound(path)) => assert!(path.ends_with("missing.csv")),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(!output.exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_markers_are_repaired() {
    let df = load_and_clean(fixture("na_markers.csv"), None).unwrap();

    // the NaN price row is dropped
    assert_eq!(df.height(), 3);
    assert_eq!(df.column("Car").unwrap().dtype(), &DataType::Float64);
    assert_eq!(f64_column(&df, "Car"), vec![Some(1.0), Some(0.0), Some(2.0)]);
    assert_eq!(
        str_column(&df, "CouncilArea"),
        vec![
            Some("Yarra".to_string()),
            Some("Unknown".to_string()),
            Some("Unknown".to_string()),
        ]
    );
}

#[test]
fn test_text_in_numeric_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cleaned.csv");

    let result = load_and_clean(fixture("text_in_numeric.csv"), Some(&output));

    match result {
        Err(ProcessingError::InvalidInput(message)) => assert!(message.contains("BuildingArea")),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_house_without_positive_land_fails() {
    let result = load_and_clean(fixture("no_house_land.csv"), None);
    assert!(matches!(result, Err(ProcessingError::EmptyMedian { .. })));
}

#[test]
fn test_skip_policy_from_json_config() {
    let config: CleaningConfig = serde_json::from_str(
        r#"{
            "rules": [
                {
                    "column": "Landsize",
                    "condition": { "ZeroInCategory": { "category_column": "Type", "category": "h" } },
                    "action": { "FillCategoryMedian": { "on_empty": "Skip" } }
                }
            ]
        }"#,
    )
    .unwrap();
    config.validate().unwrap();

    let outcome = DataCleaner::new(config)
        .load_and_clean(fixture("no_house_land.csv"), None)
        .unwrap();

    assert_eq!(f64_column(&outcome.data, "Landsize"), vec![Some(0.0); 3]);
    assert!(outcome.summary.repairs.is_empty());
}

#[test]
fn test_custom_rule_appended() {
    let config = CleaningConfig::builder()
        .add_rule(RepairRule::new(
            "Landsize",
            RuleCondition::ZeroInCategory {
                category_column: "Type".to_string(),
                category: "u".to_string(),
            },
            RepairAction::FillCategoryMedian {
                on_empty: EmptyMedianPolicy::Skip,
            },
        ))
        .build()
        .unwrap();

    let outcome = DataCleaner::new(config)
        .load_and_clean(fixture("melb_sample.csv"), None)
        .unwrap();

    // the only unit has no positive land, so the extra rule is skipped
    let land = f64_column(&outcome.data, "Landsize");
    assert_eq!(land[row_index(&outcome.data, "2/14 Docker St")], Some(0.0));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_cleaning_saved_output_again_is_identity() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    load_and_clean(fixture("melb_sample.csv"), Some(&first)).unwrap();
    let reloaded = read_csv(&first, b',', None).unwrap();

    let outcome = DataCleaner::default()
        .load_and_clean(&first, Some(&second))
        .unwrap();

    assert!(outcome.data.equals_missing(&reloaded));
    assert!(outcome.summary.repairs.is_empty());
    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        std::fs::read_to_string(&second).unwrap()
    );
}

fn random_frame(rng: &mut StdRng, rows: usize) -> DataFrame {
    let kinds = ["h", "u", "t"];
    let councils = ["Yarra", "Darebin", "Moreland"];

    let mut kind: Vec<&str> = (0..rows).map(|_| kinds[rng.gen_range(0..3)]).collect();
    let mut land: Vec<f64> = (0..rows)
        .map(|_| {
            if rng.gen_bool(0.3) {
                0.0
            } else {
                rng.gen_range(50..900) as f64
            }
        })
        .collect();
    kind[0] = "h";
    land[0] = 400.0;

    let maybe = |rng: &mut StdRng, p: f64, value: f64| (!rng.gen_bool(p)).then_some(value);

    let mut price: Vec<Option<f64>> = (0..rows)
        .map(|_| {
            let v = rng.gen_range(3..30) as f64 * 1.0e5;
            maybe(rng, 0.1, v)
        })
        .collect();
    // keep at least one priced house with land so the median exists
    price[0] = Some(1.0e6);
    let car: Vec<Option<f64>> = (0..rows)
        .map(|_| {
            let v = rng.gen_range(0..4) as f64;
            maybe(rng, 0.2, v)
        })
        .collect();
    let area: Vec<Option<f64>> = (0..rows)
        .map(|_| {
            let v = rng.gen_range(40..400) as f64;
            maybe(rng, 0.4, v)
        })
        .collect();
    let year: Vec<Option<f64>> = (0..rows)
        .map(|_| {
            let v = rng.gen_range(1890..2020) as f64;
            maybe(rng, 0.3, v)
        })
        .collect();
    let council: Vec<Option<&str>> = (0..rows)
        .map(|_| (!rng.gen_bool(0.2)).then(|| councils[rng.gen_range(0..3)]))
        .collect();

    let mut df = df![
        "Type" => kind,
        "Price" => price,
        "Car" => car,
        "Landsize" => land,
        "BuildingArea" => area,
        "YearBuilt" => year,
        "CouncilArea" => council,
    ]
    .unwrap();

    // a few exact copies
    let copies = df.slice(1, 3);
    df.vstack_mut(&copies).unwrap();
    df
}

#[test]
fn test_randomized_idempotence() {
    let mut rng = StdRng::seed_from_u64(42);
    let cleaner = DataCleaner::default();

    for _ in 0..20 {
        let df = random_frame(&mut rng, 40);
        let once = cleaner.clean(df).unwrap().data;
        let twice = cleaner.clean(once.clone()).unwrap().data;

        assert!(twice.equals_missing(&once));
        assert_eq!(once.column("Price").unwrap().null_count(), 0);

        let land = f64_column(&once, "Landsize");
        let kinds = str_column(&once, "Type");
        assert!(
            land.iter()
                .zip(&kinds)
                .all(|(l, k)| k.as_deref() != Some("h") || l.unwrap() > 0.0)
        );
    }
}

// ============================================================================
// Feature Preprocessing
// ============================================================================

#[test]
fn test_preprocessor_on_cleaned_sample() {
    let df = load_and_clean(fixture("melb_sample.csv"), None).unwrap();

    let mut preprocessor = build_preprocessor();
    let features = preprocessor.fit_transform(&df).unwrap();

    // 9 numeric + 3 types + 4 methods + 2 regions
    assert_eq!(features.width(), 18);
    assert_eq!(features.height(), 10);
    assert!(preprocessor.feature_names().contains(&"Method_VB".to_string()));
    assert!(
        preprocessor
            .feature_names()
            .contains(&"Regionname_Western Metropolitan".to_string())
    );

    for name in ["Rooms", "Landsize", "YearBuilt"] {
        let values: Vec<f64> = f64_column(&features, name).into_iter().flatten().collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 1e-9, "{name} mean {mean}");
    }
}

#[test]
fn test_preprocessor_on_unseen_rows() {
    let df = load_and_clean(fixture("melb_sample.csv"), None).unwrap();
    let mut preprocessor = build_preprocessor();
    preprocessor.fit(&df).unwrap();

    let mut new_rows = df.slice(0, 1);
    new_rows
        .replace("Regionname", Series::new("Regionname".into(), ["Eastern Victoria"]))
        .unwrap();

    let features = preprocessor.transform(&new_rows).unwrap();
    assert_eq!(
        f64_column(&features, "Regionname_Northern Metropolitan"),
        vec![Some(0.0)]
    );
    assert_eq!(
        f64_column(&features, "Regionname_Western Metropolitan"),
        vec![Some(0.0)]
    );
}

#[test]
fn test_preprocessor_requires_columns() {
    let df = load_and_clean(fixture("duplicates.csv"), None).unwrap();
    let result = build_preprocessor().fit_transform(&df);
    assert!(matches!(result, Err(ProcessingError::ColumnNotFound(_))));
}

// ============================================================================
// Charts
// ============================================================================

fn assert_svg(path: &Path) {
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("<svg"), "{} is not an SVG", path.display());
}

#[test]
fn test_charts_written_into_new_directory() {
    let df = load_and_clean(fixture("melb_sample.csv"), None).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let figures = dir.path().join("figures");
    let style = PlotStyle::default();

    let price = plot_price_distribution(&df, Some(&figures), &style)
        .unwrap()
        .unwrap();
    let heatmap = plot_correlation_heatmap(&df, Some(&figures), &style)
        .unwrap()
        .unwrap();

    let y_true: Vec<f64> = f64_column(&df, "Price").into_iter().flatten().collect();
    let y_pred: Vec<f64> = y_true.iter().map(|v| v * 0.9 + 5.0e4).collect();
    let scatter = plot_true_vs_pred(&y_true, &y_pred, Some(&figures), &style)
        .unwrap()
        .unwrap();

    assert_eq!(price, figures.join(PRICE_DISTRIBUTION_FILE));
    assert_eq!(heatmap, figures.join(CORRELATION_HEATMAP_FILE));
    assert_eq!(scatter, figures.join(PREDICTION_VS_TRUE_FILE));
    for path in [&price, &heatmap, &scatter] {
        assert_svg(path);
    }
}

#[test]
fn test_charts_without_directory_write_nothing() {
    let df = load_and_clean(fixture("melb_sample.csv"), None).unwrap();
    let style = PlotStyle::default();

    assert_eq!(plot_price_distribution(&df, None, &style).unwrap(), None);
    assert_eq!(plot_correlation_heatmap(&df, None, &style).unwrap(), None);
}
