//! Integration tests for data loading: Skyline exports, PIN files and the
//! end-to-end path from a CSV on disk to a rendered session

use std::io::Write;
use std::path::Path;

use procal_knn::data::{load_retention_times, read_percolator, FeatureScorer, RetentionTimeConfig};
use procal_knn::error::ProcalError;
use procal_knn::render::RecordingSurface;
use procal_knn::session::BiasVarianceSession;
use procal_knn::utils::DataLoader;
use tempfile::{NamedTempFile, TempDir};

// ============================================================================
// Fixtures
// ============================================================================

const PEPTIDES: [&str; 6] = ["LGGNEQVTR", "GAGSSEPVTGLDAK", "VEATFGVDESNAK", "YILAGVENSK", "TPVISGGPYEYR", "TPVITGAPYEYR"];

/// Skyline-style export with two replicates and one row missing its retention time
fn write_skyline_export(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("Skyline_output_all_runs.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "Protein Name,Peptide Sequence,Replicate Name,Peptide Retention Time,Peptide GRAVY Score"
    )
    .unwrap();
    for run in ["161207_ProPep_50fmol_4to42_R1", "161207_ProPep_50fmol_4to42_R2"] {
        for i in 0..30 {
            let seq = PEPTIDES[i % PEPTIDES.len()];
            let gravy = -1.2 + 0.07 * i as f64;
            let rt = if run.ends_with("R1") && i == 29 {
                "#N/A".to_string()
            } else {
                format!("{:.3}", 12.0 + 25.0 * (gravy + 1.2) / 2.1)
            };
            writeln!(file, "PROCAL,{},{},{},{:.3}", seq, run, rt, gravy).unwrap();
        }
    }
    path
}

// ============================================================================
// Skyline exports
// ============================================================================

#[test]
fn test_load_default_replicate() {
    let dir = TempDir::new().unwrap();
    let path = write_skyline_export(dir.path());

    let config = RetentionTimeConfig::new(&path).with_n_test(8);
    let split = load_retention_times(&config, None).unwrap();

    // 29 usable R1 rows
    assert_eq!(split.train.len() + split.validation.len(), 29);
    assert_eq!(split.validation.len(), 8);
    for s in split.train.samples().iter().chain(split.validation.samples()) {
        assert!(s.x >= -1.2 - 1e-9 && s.x <= 0.9 + 1e-9);
        assert!(s.y >= 12.0 - 1e-9);
    }
}

#[test]
fn test_seed_controls_the_split() {
    let dir = TempDir::new().unwrap();
    let path = write_skyline_export(dir.path());

    let a = load_retention_times(&RetentionTimeConfig::new(&path).with_random_state(1), None).unwrap();
    let b = load_retention_times(&RetentionTimeConfig::new(&path).with_random_state(1), None).unwrap();
    let c = load_retention_times(&RetentionTimeConfig::new(&path).with_random_state(2), None).unwrap();

    assert_eq!(a.train, b.train);
    assert_eq!(a.validation, b.validation);
    assert_ne!(a.validation, c.validation);
}

#[test]
fn test_scorer_derives_feature_from_sequence() {
    let dir = TempDir::new().unwrap();
    let path = write_skyline_export(dir.path());

    let scorer = |seq: &str| -> procal_knn::Result<f64> {
        Ok(seq.chars().filter(|c| "AILMFVW".contains(*c)).count() as f64 / seq.len() as f64)
    };
    let config = RetentionTimeConfig::new(&path).with_replicate_stem("R2");
    let split = load_retention_times(&config, Some(&scorer as &dyn FeatureScorer)).unwrap();

    assert_eq!(split.train.len() + split.validation.len(), 30);
    for s in split.train.samples() {
        assert!((0.0..=1.0).contains(&s.x));
    }
}

#[test]
fn test_missing_columns_and_files() {
    let dir = TempDir::new().unwrap();
    let path = write_skyline_export(dir.path());

    let config = RetentionTimeConfig::new(&path).with_feature_column("SSRCalc 3.0");
    assert!(matches!(
        load_retention_times(&config, None),
        Err(ProcalError::ColumnNotFound(_))
    ));

    let config = RetentionTimeConfig::new(dir.path().join("missing.csv"));
    assert!(matches!(
        load_retention_times(&config, None),
        Err(ProcalError::DataError(_))
    ));
}

#[test]
fn test_file_info() {
    let dir = TempDir::new().unwrap();
    let path = write_skyline_export(dir.path());

    let info = DataLoader::new().get_file_info(&path).unwrap();
    assert_eq!(info.n_rows, 60);
    assert_eq!(info.n_cols, 5);
    assert!(info.columns.contains(&"Peptide GRAVY Score".to_string()));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_loaded_data_drives_a_session() {
    let dir = TempDir::new().unwrap();
    let path = write_skyline_export(dir.path());

    let split = load_retention_times(&RetentionTimeConfig::new(&path).with_n_test(9), None).unwrap();
    let n_train = split.train.len();
    let mut session = BiasVarianceSession::new(split.train, split.validation).unwrap();
    let mut surface = RecordingSurface::new();

    session.inspect_data(&mut surface).unwrap();
    for k in [n_train, 5, 1] {
        session.fit_and_record(k, &mut surface).unwrap();
    }
    assert!(session.fit_and_record(n_train + 1, &mut surface).is_err());

    assert_eq!(session.history().len(), 3);
    assert_eq!(surface.show_count(), 4);
    // a linear trend is fitted better by a flexible model than by the mean
    let entries = session.history().entries();
    assert!(entries[2].train_mse < entries[0].train_mse);
}

// ============================================================================
// Percolator input
// ============================================================================

#[test]
fn test_read_pin_file() {
    let mut file = tempfile::Builder::new().suffix(".pin").tempfile().unwrap();
    writeln!(file, "SpecId\tLabel\tScanNr\tExpMass\tCalcMass\tdeltCn\tPeptide\tProteins").unwrap();
    writeln!(file, "DefaultDirection\t-\t-\t-\t-\t1.0\t-\t-").unwrap();
    writeln!(file, "target_0_1001_2_1\t1\t1001\t1043.56\t1043.55\t0.42\tK.LGGNEQVTR.A\tPROCAL\tsp|P02769").unwrap();
    writeln!(file, "decoy_0_1001_2_1\t-1\t1001\t1043.56\t1043.57\t0.11\tK.RTVQENGGL.A\tdecoy_PROCAL").unwrap();
    writeln!(file).unwrap();
    file.flush().unwrap();

    let df = read_percolator(file.path()).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.width(), 8);
    let scans = df.column("ScanNr").unwrap().as_materialized_series().f64().unwrap().clone();
    assert_eq!(scans.get(0), Some(1001.0));
}

#[test]
fn test_pin_file_missing() {
    let file = NamedTempFile::new().unwrap();
    let missing = file.path().with_extension("nope");
    assert!(read_percolator(&missing).is_err());
}
