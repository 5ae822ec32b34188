//! Model directory save/load tests.

use boost_ensemble::io::{load_booster, model_file_path, model_files_beyond, save_booster};
use boost_ensemble::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::*;

#[test]
fn test_round_trip_preserves_predictions() {
    let ensemble = fitted_ensemble(3, true);
    let dir = TempDir::new().unwrap();
    ensemble.save_model(dir.path()).unwrap();

    for index in 0..3 {
        assert!(model_file_path(dir.path(), index).is_file());
    }
    assert!(!model_file_path(dir.path(), 3).exists());

    let restored = EnsembleModel::load_model(dir.path()).unwrap();
    assert_eq!(restored.len(), 3);
    assert!(restored.params().is_none());
    assert_eq!(restored.boosters(), ensemble.boosters());

    let (test_x, _) = regression_frame(20, 3, 77);
    let options = PredictOptions::new().with_std(true).with_shap(true);
    let before = ensemble.predict(&test_x, options).unwrap();
    let after = restored.predict(&test_x, options).unwrap();
    assert_eq!(before.predictions, after.predictions);
    assert_eq!(before.std, after.std);
    assert_eq!(before.shap_values, after.shap_values);
    assert_eq!(
        restored.get_important_features().unwrap(),
        ensemble.get_important_features().unwrap()
    );
}

#[test]
fn test_loading_stops_at_first_gap() {
    let ensemble = fitted_ensemble(3, true);
    let dir = TempDir::new().unwrap();
    ensemble.save_model(dir.path()).unwrap();
    save_booster(&ensemble.boosters()[0], model_file_path(dir.path(), 4)).unwrap();

    let restored = EnsembleModel::load_model(dir.path()).unwrap();
    assert_eq!(restored.len(), 3);
    assert_eq!(restored.boosters(), ensemble.boosters());
    assert_eq!(model_files_beyond(dir.path(), restored.len()), vec![4]);
}

#[test]
fn test_missing_first_file_is_no_models_found() {
    let ensemble = fitted_ensemble(2, true);
    let dir = TempDir::new().unwrap();
    ensemble.save_model(dir.path()).unwrap();
    fs::remove_file(model_file_path(dir.path(), 0)).unwrap();

    let err = EnsembleModel::load_model(dir.path()).unwrap_err();
    assert_eq!(err.category(), "no_models_found");
    match err {
        BoostError::NoModelsFound { path } => assert_eq!(path, dir.path()),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_empty_directory_is_no_models_found() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        EnsembleModel::load_model(dir.path()),
        Err(BoostError::NoModelsFound { .. })
    ));
}

#[test]
fn test_save_into_missing_directory_fails() {
    let ensemble = fitted_ensemble(1, true);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    assert!(matches!(
        ensemble.save_model(&missing),
        Err(BoostError::IO { .. })
    ));
    assert!(!missing.exists());
}

#[test]
fn test_corrupt_file_is_reported() {
    let ensemble = fitted_ensemble(2, true);
    let dir = TempDir::new().unwrap();
    ensemble.save_model(dir.path()).unwrap();
    fs::write(model_file_path(dir.path(), 1), "{\"format_version\": 1").unwrap();

    assert!(matches!(
        EnsembleModel::load_model(dir.path()),
        Err(BoostError::Json { .. })
    ));
}

#[test]
fn test_empty_tree_is_rejected_on_load() {
    let ensemble = fitted_ensemble(1, true);
    let dir = TempDir::new().unwrap();
    ensemble.save_model(dir.path()).unwrap();

    let path = model_file_path(dir.path(), 0);
    let mut document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let tree = &mut document["booster"]["trees"][0];
    tree["nodes"] = serde_json::json!([]);
    tree["num_leaves"] = serde_json::json!(0);
    fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

    assert!(matches!(load_booster(&path), Err(BoostError::Serialization { .. })));
    assert!(matches!(
        EnsembleModel::load_model(dir.path()),
        Err(BoostError::Serialization { .. })
    ));
}

#[test]
fn test_restored_ensemble_cannot_refit() {
    let ensemble = fitted_ensemble(1, true);
    let dir = TempDir::new().unwrap();
    ensemble.save_model(dir.path()).unwrap();

    let mut restored = EnsembleModel::load_model(dir.path()).unwrap();
    let split = regression_split(40, 3, 3);
    assert!(matches!(
        restored.fit(&[split], true),
        Err(BoostError::Config { .. })
    ));
    assert_eq!(restored.len(), 1);
}

#[test]
fn test_single_booster_file_round_trip() {
    let ensemble = fitted_ensemble(1, true);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("member.json");
    save_booster(&ensemble.boosters()[0], &path).unwrap();
    assert_eq!(load_booster(&path).unwrap(), ensemble.boosters()[0]);
}
