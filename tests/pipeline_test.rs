use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rusty_frame::data::error::FrameError;
use rusty_frame::data::loader::{load_columns_chunked, load_csv};
use rusty_frame::data::model::{Column, Dtype};
use rusty_frame::pipeline::{
    extract_subset, profile, RunConfig, INITIAL_REPORT_FILE, OPTIMIZED_REPORT_FILE, SUBSET_FILE,
};
use rusty_frame::state::{FigureState, PlotColumns};

const CRIMES: &str = "\
DR_NO,Date Rptd,AREA NAME,Vict Age,Vict Sex,Vict Descent,LAT,LON
190326475,03/01/2020 12:00:00 AM,Wilshire,0,M,O,34.0375,-118.3506
200106753,02/09/2020 12:00:00 AM,Central,47,M,O,34.0444,-118.2628
200320258,11/11/2020 12:00:00 AM,Southwest,19,X,X,34.021,-118.3002
200907217,05/10/2023 12:00:00 AM,Van Nuys,19,M,O,34.1576,-118.4387
200412582,09/09/2020 12:00:00 AM,Hollenbeck,28,,,34.082,-118.213
200209713,05/03/2020 12:00:00 AM,Rampart,41,M,H,34.0749,-118.2605
200905193,06/08/2020 12:00:00 AM,Van Nuys,25,F,H,34.1925,-118.4462
200812098,09/09/2020 12:00:00 AM,West LA,27,F,W,34.0583,-118.4386
";

fn write_source(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("crimes.csv");
    fs::write(&path, body).unwrap();
    path
}

fn config_for(dir: &tempfile::TempDir, body: &str) -> RunConfig {
    let mut config = RunConfig::new(write_source(dir.path(), body));
    config.output_dir = dir.path().to_path_buf();
    config.chunk_size = 3;
    config.show_plots = false;
    config
}

#[test]
fn profile_writes_both_reports_and_shrinks_memory() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir, CRIMES);

    let profile = profile(&config).unwrap();
    assert!(profile.optimized.total_mb < profile.initial.total_mb);
    assert_eq!(profile.initial.get("Vict Age").unwrap().dtype, "int64");
    assert_eq!(profile.optimized.get("Vict Age").unwrap().dtype, "int8");
    assert_eq!(profile.optimized.get("Vict Sex").unwrap().dtype, "category");
    assert_eq!(profile.optimized.get("DR_NO").unwrap().dtype, "int32");

    for name in [INITIAL_REPORT_FILE, OPTIMIZED_REPORT_FILE] {
        let text = fs::read_to_string(dir.path().join(name)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 8);
        for entry in object.values() {
            assert!(entry["memory_mb"].is_number());
            assert!(entry["percent_of_total"].is_number());
            assert!(entry["dtype"].is_string());
        }
    }
}

#[test]
fn subset_round_trips_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir, CRIMES);

    let subset = extract_subset(&config).unwrap();
    assert_eq!(subset.column_names(), config.columns.as_slice());
    assert_eq!(subset.n_rows(), 8);

    let reloaded = load_csv(&dir.path().join(SUBSET_FILE)).unwrap();
    assert_eq!(reloaded.column_names(), subset.column_names());
    assert_eq!(reloaded.n_rows(), subset.n_rows());

    for (name, original) in subset.iter() {
        let back = reloaded.column(name).unwrap();
        match (original.to_f64(), back.to_f64()) {
            (Some(a), Some(b)) => {
                for (x, y) in a.iter().zip(&b) {
                    assert!(x == y || (x.is_nan() && y.is_nan()), "{name}: {x} != {y}");
                }
            }
            _ => assert_eq!(original.to_text(), back.to_text(), "{name}"),
        }
    }
}

#[test]
fn subset_without_some_source_columns_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), CRIMES);
    let columns = vec!["LAT".to_string(), "Vict Sex".to_string()];

    let subset = load_columns_chunked(&path, &columns, 2).unwrap();
    assert_eq!(subset.column_names(), columns.as_slice());
    assert!(subset.column("AREA NAME").is_none());
    assert_eq!(subset.column("LAT").unwrap().dtype(), Dtype::Float64);
}

#[test]
fn subset_with_absent_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&dir, CRIMES);
    config.columns.push("Weapon Used Cd".to_string());

    let err = extract_subset(&config).unwrap_err();
    let cause = err.downcast_ref::<FrameError>().unwrap();
    assert!(matches!(cause, FrameError::ColumnNotFound(name) if name == "Weapon Used Cd"));
    assert!(!dir.path().join(SUBSET_FILE).exists());
}

#[test]
fn missing_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::new(dir.path().join("nope.csv"));
    config.output_dir = dir.path().to_path_buf();

    let err = profile(&config).unwrap_err();
    assert!(format!("{err:#}").contains("nope.csv"));
    assert!(!dir.path().join(INITIAL_REPORT_FILE).exists());
}

#[test]
fn three_by_five_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let body = "kind,small,ratio\na,1,0.5\nb,2,1.25\na,3,2.0\nb,4,0.75\na,5,3.5\n";
    let config = config_for(&dir, body);

    let profile = profile(&config).unwrap();
    assert_eq!(profile.optimized.get("kind").unwrap().dtype, "category");
    assert_eq!(profile.optimized.get("small").unwrap().dtype, "int8");
    assert_eq!(profile.optimized.get("ratio").unwrap().dtype, "float32");
    assert!(profile.optimized.total_mb < profile.initial.total_mb);
}

#[test]
fn zero_row_source_gives_zero_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir, "a,b,c\n");

    let profile = profile(&config).unwrap();
    assert_eq!(profile.initial.total_mb, 0.0);
    assert_eq!(profile.initial.columns.len(), 3);
    assert!(profile
        .initial
        .columns
        .iter()
        .all(|(_, m)| m.memory_mb == 0.0 && m.percent_of_total == 0.0));
}

#[test]
fn figure_from_subset_has_all_panels() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir, CRIMES);
    let subset = extract_subset(&config).unwrap();

    let figure = FigureState::from_table(&subset, &PlotColumns::default());
    assert_eq!(figure.panel_count(), 4);

    let heatmap = figure.heatmap.unwrap();
    assert_eq!(
        heatmap.names,
        vec!["DR_NO", "Vict Age", "LAT", "LON"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
    let bar = figure.bar.unwrap();
    assert_eq!(bar.counts[0], ("M".to_string(), 4));
    assert_eq!(bar.total(), 7);
    assert!(matches!(subset.column("Vict Sex"), Some(Column::Text(_))));
}
