use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const ALIGNMENT: &str = r#"{
    "name": "Test Road",
    "CoordGeom": [
        {"Type": "Line", "Start": {"x": 0.0, "y": 0.0}, "End": {"x": 100.0, "y": 0.0}},
        {"Type": "Curve", "rot": "ccw",
         "Start": {"x": 100.0, "y": 0.0}, "End": {"x": 200.0, "y": 100.0},
         "Center": {"x": 100.0, "y": 100.0}}
    ],
    "Profile": {
        "ProfAlign": [
            {"name": "FG",
             "PVI": [{"station": 0.0, "elevation": 10.0},
                     {"station": 100.0, "elevation": 12.0},
                     {"station": 250.0, "elevation": 9.0}],
             "Curves": [{"Type": "ParaCurve", "station": 100.0, "length": 40.0}]}
        ],
        "ProfSurf": [
            {"name": "EG", "points": [[0.0, 11.0], [250.0, 11.0]]}
        ]
    }
}"#;

fn alignment_file() -> assert_fs::NamedTempFile {
    let file = assert_fs::NamedTempFile::new("road.json").unwrap();
    file.write_str(ALIGNMENT).unwrap();
    file
}

#[test]
fn sample_command() {
    let file = alignment_file();
    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["sample", file.path().to_str().unwrap(), "--step", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.000,0.000,0.000"))
        .stdout(predicate::str::contains("50.000,50.000,0.000"))
        .stdout(predicate::str::contains("257.080,200.000,100.000"));
}

#[test]
fn offset_command() {
    let file = alignment_file();
    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args([
            "offset",
            file.path().to_str().unwrap(),
            "5",
            "--step",
            "50",
            "--side",
            "right",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("50.000,50.000,-5.000"));
}

#[test]
fn stations_command() {
    let file = alignment_file();
    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args([
            "stations",
            file.path().to_str().unwrap(),
            "--line",
            "50",
            "--curve",
            "100",
        ])
        .assert()
        .success()
        .stdout("0.000\n50.000\n100.000\n200.000\n257.080\n");
}

#[test]
fn station_offset_command() {
    let file = alignment_file();
    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["station-offset", file.path().to_str().unwrap(), "40", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Station: 40.000 Offset: -3.000"));
}

#[test]
fn profile_command() {
    let file = alignment_file();
    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["profile", file.path().to_str().unwrap(), "--step", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50.000,11.000,0.02000,11.000"))
        .stdout(predicate::str::contains("250.000,9.000,-0.02000,11.000"));
}

#[test]
fn cut_fill_command() {
    let file = alignment_file();
    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["cut-fill", file.path().to_str().unwrap(), "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cut 1.000 at station 0.000"));

    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["cut-fill", file.path().to_str().unwrap(), "80", "--surface", "EG"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fill 0.600 at station 80.000"));
}

#[test]
fn layout_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let pis = dir.child("pis.json");
    pis.write_str(
        r#"[{"point": {"x": 0.0, "y": 0.0}},
            {"point": {"x": 200.0, "y": 0.0}, "radius": 100.0},
            {"point": {"x": 200.0, "y": 200.0}}]"#,
    )
    .unwrap();
    let output = dir.child("road.json");

    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args([
            "layout",
            pis.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--sta-start",
            "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 elements, stations 100.000 to 457.080"));
    output.assert(predicate::str::contains("\"CoordGeom\""));

    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["sample", output.path().to_str().unwrap(), "--step", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("200.000,100.000,0.000"));
    dir.close().unwrap();
}

#[test]
fn broken_document_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("broken.json");
    input
        .write_str(r#"{"CoordGeom": [{"Type": "Curve", "Start": {"x": 0.0, "y": 0.0}, "End": {"x": 1.0, "y": 1.0}}]}"#)
        .unwrap();

    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["sample", input.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field 'rot'"));

    Command::cargo_bin("road_geometry_cli")
        .unwrap()
        .args(["--lossy", "sample", input.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Skipped element 0 (Curve)"));
    dir.close().unwrap();
}
