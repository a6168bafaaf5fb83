use realty_advisor::artifact::{CLASSIFIER_FILE, REGRESSOR_FILE, REPORT_FILE};
use realty_advisor::schema::RAW_COLUMNS;
use realty_advisor::{
    AdvisorConfig, AdvisorError, DatasetPipeline, FeatureEngineer, InferenceAdapter,
    InvestmentReport, LabeledDataset, TargetGenerator, TrainingPipeline, TrainingReport,
};
use serde_json::json;
use std::path::Path;

fn row(i: usize) -> Vec<String> {
    let cities = [("Maharashtra", "Pune"), ("Maharashtra", "Mumbai"), ("Tamil Nadu", "Chennai")];
    let (state, city) = cities[i % cities.len()];
    let transport = ["Low", "Medium", "High"][i % 3];
    let facing = ["North", "East", "West", "South", "North-East"][i % 5];
    vec![
        (i + 1).to_string(),
        state.to_string(),
        city.to_string(),
        format!("Locality_{}", i % 6),
        ["Apartment", "Villa", "Independent House"][i % 3].to_string(),
        (1 + i % 4).to_string(),
        (600 + (i * 97) % 2400).to_string(),
        (25 + (i * 41) % 400).to_string(),
        (1995 + i % 28).to_string(),
        ["Furnished", "Unfurnished", "Semi-furnished"][i % 3].to_string(),
        (i % 15).to_string(),
        "15".to_string(),
        (i % 10).to_string(),
        ((i / 2) % 10).to_string(),
        transport.to_string(),
        if i % 2 == 0 { "Yes" } else { "No" }.to_string(),
        if i % 4 == 0 { "No" } else { "Yes" }.to_string(),
        facing.to_string(),
        ["Owner", "Builder", "Broker"][i % 3].to_string(),
        if i % 3 == 0 { "Under_Construction" } else { "Ready_to_Move" }.to_string(),
        "Gym, Pool".to_string(),
    ]
}

fn write_raw_csv(path: &Path, n: usize) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    let mut header = vec!["ID"];
    header.extend(RAW_COLUMNS);
    writer.write_record(&header).unwrap();
    for i in 0..n {
        writer.write_record(row(i)).unwrap();
    }
    // exact duplicate of the first row
    writer.write_record(row(0)).unwrap();
    // unparseable size
    let mut bad = row(n);
    bad[6] = "huge".to_string();
    writer.write_record(&bad).unwrap();
    // missing price is filled with the median
    let mut missing = row(n + 1);
    missing[7] = "NA".to_string();
    writer.write_record(&missing).unwrap();
    writer.flush().unwrap();
}

fn quick_config() -> AdvisorConfig {
    let mut config = AdvisorConfig::default();
    config.classifier.epochs = 40;
    config.regressor.epochs = 60;
    config
}

#[test]
fn prepare_train_and_predict() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let labeled_path = dir.path().join("labeled.csv");
    let models = dir.path().join("models");
    write_raw_csv(&raw, 150);

    let (dataset, summary) = DatasetPipeline::new(FeatureEngineer::new(2025), TargetGenerator::default())
        .run(&raw, &labeled_path)
        .unwrap();
    assert_eq!(summary.rows_read, 153);
    assert_eq!(summary.duplicates_dropped, 1);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(dataset.len(), 151);
    assert_eq!(summary.cities, 3);

    let reloaded = LabeledDataset::load(&labeled_path).unwrap();
    assert_eq!(reloaded, dataset);

    let outcome = TrainingPipeline::new(quick_config()).train(&reloaded).unwrap();
    outcome.save(&models).unwrap();
    for file in [CLASSIFIER_FILE, REGRESSOR_FILE, REPORT_FILE] {
        assert!(models.join(file).exists(), "{file} missing");
    }
    let report = TrainingReport::load(models.join(REPORT_FILE)).unwrap();
    assert_eq!(report.rows_used, 151);
    assert_eq!(report.reference_year, 2025);

    let adapter = InferenceAdapter::from_dir(&models).unwrap();
    let request = json!({
        "State": "Maharashtra",
        "City": "Pune",
        "Locality": "Locality_12",
        "Property_Type": "Apartment",
        "BHK": 3,
        "Size_in_SqFt": "1000",
        "Price_in_Lakhs": 80,
        "Year_Built": 2015,
        "Furnished_Status": "Furnished",
        "Floor_No": 4,
        "Total_Floors": 12,
        "Nearby_Schools": 7,
        "Nearby_Hospitals": 3,
        "Public_Transport_Accessibility": "High",
        "Parking_Space": "Yes",
        "Security": "Yes",
        "Facing": "East",
        "Owner_Type": "Owner",
        "Availability_Status": "Ready_to_Move",
        "Amenities": "Gym, Pool, Clubhouse"
    });
    let prediction = adapter.predict_json(&request).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
    assert!(prediction.future_price.is_finite());

    let age = prediction
        .features
        .iter()
        .find(|f| f.name == "Age_of_Property")
        .unwrap();
    assert_eq!(age.value, "10");

    let html = InvestmentReport::render_html(&prediction, "2025-06-01T12:00:00Z");
    assert!(html.contains(&prediction.label));
    assert!(html.contains("Age_of_Property"));

    let body = serde_json::to_value(&prediction).unwrap();
    assert_eq!(body["label"], json!(prediction.label));
    assert_eq!(body["features"].as_array().unwrap().len(), 29);
}

#[test]
fn serving_tolerates_unknown_categories_but_not_bad_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let labeled_path = dir.path().join("labeled.csv");
    write_raw_csv(&raw, 60);

    let (dataset, _) = DatasetPipeline::default().run(&raw, &labeled_path).unwrap();
    let outcome = TrainingPipeline::new(quick_config()).train(&dataset).unwrap();
    let adapter = InferenceAdapter::new(outcome.classifier, outcome.regressor).unwrap();

    let mut request = json!({
        "State": "Goa",
        "City": "Panaji",
        "Locality": "Locality_999",
        "Property_Type": "Houseboat",
        "BHK": 2,
        "Size_in_SqFt": 800,
        "Price_in_Lakhs": 60,
        "Year_Built": 2000,
        "Furnished_Status": "Unknown",
        "Floor_No": 0,
        "Total_Floors": 1,
        "Nearby_Schools": 1,
        "Nearby_Hospitals": 1,
        "Public_Transport_Accessibility": "Medium",
        "Parking_Space": "No",
        "Facing": "Sideways",
        "Owner_Type": "Owner",
        "Availability_Status": "Ready_to_Move"
    });
    let prediction = adapter.predict_json(&request).unwrap();
    assert!(prediction.probability.is_finite());
    assert!(prediction.future_price.is_finite());

    request["Price_in_Lakhs"] = json!("sixty");
    match adapter.predict_json(&request) {
        Err(AdvisorError::InvalidRecord { field, .. }) => assert_eq!(field, "Price_in_Lakhs"),
        other => panic!("expected InvalidRecord, got {other:?}"),
    }
}

#[test]
fn training_rejects_dataset_built_with_other_reference_year() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.csv");
    let labeled_path = dir.path().join("labeled.csv");
    write_raw_csv(&raw, 30);

    let (dataset, _) = DatasetPipeline::new(FeatureEngineer::new(2024), TargetGenerator::default())
        .run(&raw, &labeled_path)
        .unwrap();
    let result = TrainingPipeline::new(quick_config()).train(&dataset);
    assert!(matches!(result, Err(AdvisorError::ContractViolation(_))));
}
