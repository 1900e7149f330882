use road_geometry::alignment::{Alignment, AlignmentData};
use road_geometry::profile::{ProfileKind, SkipReason, VerticalElement, VerticalGeometry};

const DOCUMENT: &str = r#"{
    "name": "Main Street",
    "staStart": 0.0,
    "CoordGeom": [
        {"Type": "Line", "Start": {"x": 0.0, "y": 0.0}, "End": {"x": 0.0, "y": 400.0}}
    ],
    "Profile": {
        "name": "Main Street",
        "ProfAlign": [
            {
                "name": "FG",
                "PVI": [
                    {"station": 0.0, "elevation": 50.0},
                    {"station": 200.0, "elevation": 54.0},
                    {"station": 400.0, "elevation": 52.0}
                ],
                "Curves": [
                    {"Type": "ParaCurve", "station": 200.0, "length": 80.0},
                    {"Type": "CircCurve", "station": 400.0, "length": 20.0},
                    {"Type": "ParaCurve", "station": 123.0, "length": 10.0}
                ]
            },
            {
                "name": "Alt",
                "PVI": [
                    {"station": 0.0, "elevation": 50.0},
                    {"station": 200.0, "elevation": 52.0},
                    {"station": 400.0, "elevation": 50.0}
                ],
                "Curves": [
                    {"Type": "UnsymParaCurve", "station": 200.0, "length": 100.0,
                     "lengthIn": 60.0, "lengthOut": 40.0}
                ]
            }
        ],
        "ProfSurf": [
            {"name": "EG", "points": [[0.0, 51.0], [150.0, 52.0], [400.0, 53.0]]}
        ]
    }
}"#;

fn alignment() -> Alignment {
    let _ = env_logger::builder().is_test(true).try_init();
    let data: AlignmentData = serde_json::from_str(DOCUMENT).unwrap();
    Alignment::from_data(data).unwrap()
}

#[test]
fn design_profile_is_assembled() {
    let align = alignment();
    let profiles = align.profiles().unwrap();
    let fg = profiles.design(None).unwrap();
    assert_eq!(fg.name(), "FG");
    assert_eq!(fg.kind(), ProfileKind::Design);
    let kinds: Vec<&str> = fg.elements().iter().map(VerticalElement::kind).collect();
    assert_eq!(kinds, vec!["Tangent", "ParaCurve", "Tangent"]);
    assert_eq!(fg.station_range(), Some((0.0, 400.0)));

    // Grades +0.02 and -0.01 meet at the PVI; the curve is a crest.
    assert!((fg.elevation_at_station(100.0).unwrap() - 52.0).abs() < 1e-9);
    assert!((fg.elevation_at_station(160.0).unwrap() - 53.2).abs() < 1e-9);
    let at_pvi = fg.elevation_at_station(200.0).unwrap();
    assert!((at_pvi - (54.0 - 0.03 * 80.0 / 8.0)).abs() < 1e-9);
    assert!((fg.grade_at_station(300.0).unwrap() + 0.01).abs() < 1e-12);
}

#[test]
fn bad_curves_become_warnings() {
    let align = alignment();
    let profiles = align.profiles().unwrap();
    let warnings: Vec<_> = profiles.warnings().collect();
    assert_eq!(warnings.len(), 2);
    assert!(matches!(warnings[0].reason, SkipReason::NoMatchingPvi));
    assert!(matches!(warnings[1].reason, SkipReason::TerminalPvi));
}

#[test]
fn asymmetric_profile_by_name() {
    let align = alignment();
    let profiles = align.profiles().unwrap();
    let alt = profiles.design(Some("Alt")).unwrap();
    let curve = alt
        .elements()
        .iter()
        .find_map(|e| match e {
            VerticalElement::Parabola(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert!(curve.is_asymmetric());
    assert_eq!(curve.station_range(), (140.0, 240.0));
    let (station, _) = alt.high_low_points()[0];
    assert!(station > 140.0 && station <= 200.0);
}

#[test]
fn point3_uses_design_elevation() {
    let align = alignment();
    let p = align.point3_at_station(100.0, None).unwrap();
    assert!(p.x.abs() < 1e-9);
    assert!((p.y - 100.0).abs() < 1e-9);
    assert!((p.z - 52.0).abs() < 1e-9);
    assert!(align.point3_at_station(100.0, Some("missing")).is_err());
}

#[test]
fn cut_and_fill_against_ground() {
    let align = alignment();
    let profiles = align.profiles().unwrap();
    // Ground 51 under a design of 50 at the start is a cut.
    assert!((profiles.cut_fill_at_station(0.0, None, None).unwrap() + 1.0).abs() < 1e-9);
    // Ground 52.04 under a design of 53.2 is a fill.
    let fill = profiles.cut_fill_at_station(160.0, None, Some("EG")).unwrap();
    assert!((fill - (53.2 - 52.0 - 10.0 / 250.0)).abs() < 1e-9);

    let points = profiles.generate_profile_points(100.0, None, None).unwrap();
    assert_eq!(points.len(), 5);
    assert!(points.iter().all(|p| p.surface_elevation.is_some()));
    assert!((points[1].grade - 0.02).abs() < 1e-12);
}
