use plotkit_camtools::{fit_scale, sample_cubic, PathFlattener};
use plotkit_core::{FlattenSettings, PathSegment, Point, VectorPath};
use proptest::prelude::*;

fn point() -> impl Strategy<Value = Point> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn lift_iff_gap_reaches_threshold(a in point(), b in point(), c in point(), d in point()) {
        let settings = FlattenSettings::default();
        let mut flattener = PathFlattener::new(settings);
        flattener.flatten_segment(&PathSegment::Line { start: a, end: b }, 1.0);
        let next = flattener.flatten_segment(&PathSegment::Line { start: c, end: d }, 1.0);

        let continuous = (c.x - b.x).abs() < settings.lift_threshold
            && (c.y - b.y).abs() < settings.lift_threshold;
        prop_assert_eq!(next.lift, !continuous);
    }

    #[test]
    fn samples_end_at_curve_end(p0 in point(), p1 in point(), p2 in point(), p3 in point(), n in 1usize..32) {
        let samples = sample_cubic(p0, p1, p2, p3, n);
        prop_assert_eq!(samples.len(), n);
        prop_assert_eq!(samples[n - 1], p3);
    }

    #[test]
    fn fitted_paths_stay_on_canvas(
        segments in prop::collection::vec((0.1f64..500.0, 0.1f64..500.0, 0.1f64..500.0, 0.1f64..500.0), 1..20)
    ) {
        let path = VectorPath::new(
            segments
                .into_iter()
                .map(|(x0, y0, x1, y1)| PathSegment::Line {
                    start: Point::new(x0, y0),
                    end: Point::new(x1, y1),
                })
                .collect(),
        );
        let bounds = path.bbox();
        let scale = fit_scale(std::slice::from_ref(&path), 300.0, 200.0);
        prop_assert!(bounds.max_x * scale <= 300.0 + 1e-9);
        prop_assert!(bounds.max_y * scale <= 200.0 + 1e-9);
    }
}
