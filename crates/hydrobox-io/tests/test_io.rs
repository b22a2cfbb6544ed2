//! Datasets and connection files on disk

use std::io::Write;

use chrono::{Datelike, NaiveDate};
use hydrobox_io::{load_dataset, read_timeseries_csv, ConnectionDescriptor, Dataset, Error};
use proptest::prelude::*;

fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("hydrobox_io_{}_{name}", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn discharge_dataset_is_three_daily_years() {
    let q = load_dataset(Dataset::Discharge).unwrap();
    assert_eq!(q.len(), 1096);
    let index = q.index().datetimes().unwrap();
    assert_eq!(index[0].date(), NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
    assert_eq!(index[1095].year(), 2012);
    assert!(index.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));

    let missing = q.values().iter().filter(|v| v.is_nan()).count();
    assert_eq!(missing, 4);
    assert!(q.values().iter().filter(|v| !v.is_nan()).all(|v| *v > 0.0));
}

#[test]
fn csv_round_trips_through_a_file() {
    let path = temp_file("series.csv", "time,level\n20200101,1.0\n20200102,2.0\n");
    let s = read_timeseries_csv(&path).unwrap();
    assert_eq!(s.name(), Some("level"));
    assert_eq!(s.values(), &[1.0, 2.0]);
    std::fs::remove_file(path).ok();

    assert!(matches!(read_timeseries_csv("/nonexistent/hydrobox.csv"), Err(Error::Io(_))));
}

#[test]
fn connection_file_fills_missing_fields() {
    let path = temp_file(
        "hbconnect",
        "driver=postgresql\nhost=localhost\nport=5432\nuser=hydro\npassword=pw\ndbname=gauges\n",
    );
    let from_file = ConnectionDescriptor::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(from_file.is_valid());

    let d = ConnectionDescriptor::new().with_dbname("other").or(from_file);
    assert_eq!(
        d.connection_string().unwrap(),
        "postgresql://hydro:pw@localhost:5432/other"
    );
}

#[test]
fn missing_connection_file_is_an_error() {
    let err = ConnectionDescriptor::from_file("/nonexistent/.hbconnect").unwrap_err();
    assert!(matches!(err, Error::ConnectionFile { .. }));
}

proptest! {
    #[test]
    fn any_missing_field_blocks_the_connection_string(mask in 0u8..63) {
        let mut d = ConnectionDescriptor::new();
        if mask & 1 != 0 { d = d.with_driver("mysql"); }
        if mask & 2 != 0 { d = d.with_host("h"); }
        if mask & 4 != 0 { d = d.with_port(3306); }
        if mask & 8 != 0 { d = d.with_user("u"); }
        if mask & 16 != 0 { d = d.with_password("p"); }
        if mask & 32 != 0 { d = d.with_dbname("db"); }
        prop_assert!(!d.is_valid());
        let is_incomplete = matches!(d.connection_string(), Err(Error::IncompleteDescriptor { .. }));
        prop_assert!(is_incomplete);
        prop_assert_eq!(d.missing().len(), 6 - mask.count_ones() as usize);
    }
}
