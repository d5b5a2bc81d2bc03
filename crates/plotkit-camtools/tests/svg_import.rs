use plotkit_camtools::{load_svg_paths, parse_svg_paths, FileFormatError, ToolpathEmitter};
use plotkit_core::{CartesianParams, MachineProfile, PathSegment, Point};

const TRACED: &str = r##"<?xml version="1.0" standalone="no"?>
<svg version="1.0" xmlns="http://www.w3.org/2000/svg"
 width="100.000000pt" height="100.000000pt" viewBox="0 0 100.000000 100.000000">
<metadata>
Created by potrace 1.16
</metadata>
<g transform="translate(0.000000,100.000000) scale(0.100000,-0.100000)"
fill="#000000" stroke="none">
<path d="M100 900 l500 0 0 -500 -500 0 z"/>
<path d="M700 300 c0 100 100 100 100 0"/>
</g>
</svg>
"##;

fn assert_close(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-3 && (actual.y - expected.y).abs() < 1e-3,
        "{actual:?} != {expected:?}"
    );
}

#[test]
fn test_traced_document_applies_group_transform() {
    let paths = parse_svg_paths(TRACED).unwrap();
    assert_eq!(paths.len(), 2);

    let square = &paths[0];
    assert_eq!(square.len(), 4);
    assert_close(square.segments[0].start(), Point::new(10.0, 10.0));
    assert_close(square.segments[0].end(), Point::new(60.0, 10.0));
    assert_close(square.segments[3].end(), Point::new(10.0, 10.0));

    match paths[1].segments[0] {
        PathSegment::CubicBezier { start, end, .. } => {
            assert_close(start, Point::new(70.0, 70.0));
            assert_close(end, Point::new(80.0, 70.0));
        }
        ref other => panic!("expected a cubic, got {other:?}"),
    }
}

#[test]
fn test_nested_groups_compose() {
    let doc = r#"<svg>
<g transform="translate(10,0)">
  <g transform="scale(2)">
    <path d="M1 1 L2 1" transform="translate(0,5)"/>
  </g>
  <path d="M0 0 L1 0"/>
</g>
<path d="M0 0 L1 1"/>
</svg>"#;
    let paths = parse_svg_paths(doc).unwrap();
    assert_eq!(paths.len(), 3);
    assert_close(paths[0].segments[0].start(), Point::new(12.0, 12.0));
    assert_close(paths[0].segments[0].end(), Point::new(14.0, 12.0));
    assert_close(paths[1].segments[0].end(), Point::new(11.0, 0.0));
    assert_close(paths[2].segments[0].end(), Point::new(1.0, 1.0));
}

#[test]
fn test_document_without_paths_is_empty() {
    let paths = parse_svg_paths("<svg><g></g></svg>").unwrap();
    assert!(paths.is_empty());
}

#[test]
fn test_empty_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.svg");
    std::fs::write(&path, "  \n").unwrap();
    assert!(matches!(
        load_svg_paths(&path),
        Err(FileFormatError::EmptyFile(_))
    ));
}

#[test]
fn test_traced_document_emits_toolpath() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversion-output.svg");
    std::fs::write(&path, TRACED).unwrap();

    let paths = load_svg_paths(&path).unwrap();
    let profile = MachineProfile::cartesian(CartesianParams::default());
    let toolpath = ToolpathEmitter::emit_paths(&profile, &paths).unwrap();

    // The square is one stroke; the curve sits more than 30 units away.
    assert_eq!(toolpath.stats.lifts, 2);
    assert_eq!(toolpath.stats.segments, 5);
}
