use queue_desk::{Record, json_to_csv, prepare_json_csv_download};
use serde_json::json;

fn records(value: serde_json::Value) -> Vec<Record> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn empty_input_is_empty_text() {
    assert_eq!(json_to_csv(&[]), "");
}

#[test]
fn cells_are_json_encoded_and_semicolon_joined() {
    let rows = records(json!([
        {"name": "Ana", "age": 31, "vip": true},
        {"name": "Bruno; Jr", "age": 7, "vip": false}
    ]));
    assert_eq!(
        json_to_csv(&rows),
        "name;age;vip\r\n\"Ana\";31;true\r\n\"Bruno; Jr\";7;false"
    );
}

#[test]
fn null_and_missing_cells_both_blank() {
    let rows = records(json!([
        {"a": 1, "b": null},
        {"a": 2}
    ]));
    assert_eq!(json_to_csv(&rows), "a;b\r\n1;\"\"\r\n2;\"\"");
}

#[test]
fn embedded_quotes_use_json_escaping() {
    let rows = records(json!([{"quote": "say \"hi\""}]));
    assert_eq!(json_to_csv(&rows), "quote\r\n\"say \\\"hi\\\"\"");
}

#[test]
fn download_wraps_semicolon_format() {
    let rows = records(json!([{"x": "y"}]));
    let download = prepare_json_csv_download(&rows, "attendance").unwrap();
    assert_eq!(download.filename, "attendance.csv");
    assert_eq!(download.body, "x\r\n\"y\"");
    assert!(!download.body.starts_with('\u{FEFF}'));
}
