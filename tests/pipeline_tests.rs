mod common;

use atm_fraud_detection::{
    run_from_csv, validate_and_align, FraudModel, InferenceError, LogisticModel, PredictionError, SchemaError,
    Threshold, EXPECTED_COLUMNS,
};
use common::{csv_with_columns, full_csv, per1_model, CountingModel};

#[test]
fn three_rows_at_half_threshold_yield_binary_download() {
    let model = per1_model();
    let run = run_from_csv(&model, &full_csv(&["0.1", "0.5", "0.9"]), Threshold::new(0.5).unwrap()).unwrap();

    let csv = String::from_utf8(run.download_csv().unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Fraud_Prediction");
    assert_eq!(lines.len(), 4);
    assert!(lines[1..].iter().all(|l| *l == "0" || *l == "1"));
    assert_eq!(&lines[1..], &["0", "1", "1"]);
}

#[test]
fn missing_cred3_fails_before_inference() {
    let columns: Vec<&str> = EXPECTED_COLUMNS.iter().copied().filter(|c| *c != "Cred3").collect();
    let model = CountingModel::new(per1_model());

    let err = run_from_csv(&model, &csv_with_columns(&columns, &["0.9"], ""), Threshold::new(0.5).unwrap())
        .unwrap_err();

    assert!(err.to_string().contains("Cred3"));
    assert!(matches!(err, PredictionError::Schema(SchemaError::MissingColumns(_))));
    assert_eq!(model.calls(), 0);
}

#[test]
fn missing_columns_are_listed_sorted() {
    let dropped = ["qsets_normalized_tat_max", "Per9", "Dem2", "Cred1"];
    let columns: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !dropped.contains(c))
        .collect();

    let err = run_from_csv(&per1_model(), &csv_with_columns(&columns, &[], ""), Threshold::new(0.5).unwrap())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Missing columns: Cred1, Dem2, Per9, qsets_normalized_tat_max"
    );
}

#[test]
fn extra_txn_id_column_is_dropped() {
    let mut columns = vec!["TxnID"];
    columns.extend(EXPECTED_COLUMNS.iter().rev());

    let text = csv_with_columns(&columns, &["0.2", "0.8"], "txn_1");
    let dataset = atm_fraud_detection::csv_io::parse_csv(&text).unwrap();
    let aligned = validate_and_align(&dataset).unwrap();
    assert_eq!(aligned.columns(), &EXPECTED_COLUMNS);
    assert_eq!(aligned.rows()[0][0], "0.2");

    let run = run_from_csv(&per1_model(), &text, Threshold::new(0.5).unwrap()).unwrap();
    assert_eq!(run.summary.total, 2);
    assert_eq!(run.labels(), vec![0, 1]);

    // The on-screen table keeps every upload column; the model input does not
    let table = run.result_table(20);
    assert_eq!(table.columns()[0], "TxnID");
    assert!(!aligned.columns().contains(&"TxnID"));
}

#[test]
fn threshold_one_labels_everything_legit() {
    let run = run_from_csv(
        &per1_model(),
        &full_csv(&["0", "0.5", "1", "25"]),
        Threshold::new(1.0).unwrap(),
    )
    .unwrap();

    for prediction in &run.predictions {
        assert_eq!(prediction.label, u8::from(prediction.probability == 1.0));
    }
}

#[test]
fn header_only_upload_reports_zero_percent() {
    let model = CountingModel::new(per1_model());
    let run = run_from_csv(&model, &full_csv(&[]), Threshold::new(0.5).unwrap()).unwrap();

    assert_eq!(run.summary.total, 0);
    assert_eq!(run.summary.fraud_count, 0);
    assert_eq!(run.summary.fraud_pct_display(), "0.00%");
    assert_eq!(String::from_utf8(run.download_csv().unwrap()).unwrap(), "Fraud_Prediction\n");
}

#[test]
fn higher_threshold_flags_a_subset() {
    let values: Vec<String> = (0..50).map(|i| format!("{:.2}", i as f64 / 49.0)).collect();
    let values: Vec<&str> = values.iter().map(String::as_str).collect();
    let text = full_csv(&values);
    let model = per1_model();

    let low = run_from_csv(&model, &text, Threshold::new(0.3).unwrap()).unwrap();
    let high = run_from_csv(&model, &text, Threshold::new(0.7).unwrap()).unwrap();

    for (l, h) in low.labels().iter().zip(high.labels()) {
        assert!(h <= *l);
    }
    assert!(high.summary.fraud_count < low.summary.fraud_count);
}

#[test]
fn inference_is_idempotent() {
    let text = full_csv(&["0.13", "0.77", "0.5"]);
    let dataset = atm_fraud_detection::csv_io::parse_csv(&text).unwrap();
    let aligned = validate_and_align(&dataset).unwrap();
    let model = per1_model();

    assert_eq!(model.predict_proba(&aligned).unwrap(), model.predict_proba(&aligned).unwrap());
}

#[test]
fn non_numeric_cell_is_an_inference_error() {
    let text = full_csv(&["0.4", "high"]);
    let err = run_from_csv(&per1_model(), &text, Threshold::new(0.5).unwrap()).unwrap_err();

    match err {
        PredictionError::Inference(InferenceError::NonNumeric { row, column, value }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "Per1");
            assert_eq!(value, "high");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_header_fails_fast() {
    let mut columns = EXPECTED_COLUMNS.to_vec();
    columns.push("Per1");
    let text = csv_with_columns(&columns, &["0.4"], "");

    let err = run_from_csv(&per1_model(), &text, Threshold::new(0.5).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        PredictionError::Schema(SchemaError::DuplicateColumns(ref names)) if names == &["Per1".to_string()]
    ));
}

#[test]
fn malformed_csv_is_a_parse_error() {
    let text = format!("{}\n1,2\n", EXPECTED_COLUMNS.join(","));
    let err = run_from_csv(&per1_model(), &text, Threshold::new(0.5).unwrap()).unwrap_err();
    assert!(matches!(err, PredictionError::Parse(_)));
}

#[test]
fn logistic_artifact_loads_from_disk() {
    let coefficients: serde_json::Map<String, serde_json::Value> = EXPECTED_COLUMNS
        .iter()
        .map(|c| {
            let coefficient = if *c == "Per1" { 4.0 } else { 0.0 };
            (c.to_string(), serde_json::json!(coefficient))
        })
        .collect();
    let artifact = serde_json::json!({"intercept": -2.0, "coefficients": coefficients});

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, artifact.to_string()).unwrap();

    let model = LogisticModel::from_path(&path).unwrap();
    let run = run_from_csv(&model, &full_csv(&["0.5"]), Threshold::new(0.5).unwrap()).unwrap();
    assert!((run.predictions[0].probability - 0.5).abs() < 1e-12);
    assert_eq!(run.labels(), vec![1]);
}
