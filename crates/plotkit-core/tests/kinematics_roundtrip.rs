//! Round-trip properties of the kinematics models

use plotkit_core::{
    BoundingBox, CartesianParams, InverseModel, Kinematics, MachineProfile, Point,
    StringPulleyParams,
};
use proptest::prelude::*;

fn pulley_profile(inverse: InverseModel) -> MachineProfile {
    MachineProfile::string_pulley(StringPulleyParams {
        inverse,
        ..StringPulleyParams::default()
    })
}

proptest! {
    #[test]
    fn cartesian_roundtrip(
        x in 0.0f64..300.0,
        y in 0.0f64..300.0,
        head in -100.0f64..100.0,
        ox in -100.0f64..100.0,
        oy in -100.0f64..100.0,
    ) {
        let profile = MachineProfile::cartesian(CartesianParams {
            head_x_offset: head,
            offset_x: ox,
            offset_y: oy,
        });
        let k = profile.kinematics();
        let (a, b) = k.to_native(Point::new(x, y));
        let back = k.from_native(a, b);
        prop_assert!((back.x - x).abs() < 1e-9);
        prop_assert!((back.y - y).abs() < 1e-9);
    }

    #[test]
    fn string_pulley_roundtrip_on_canvas(x in 0.0f64..300.0, y in 0.0f64..300.0) {
        let k = pulley_profile(InverseModel::Anchored).kinematics();
        let (left, right) = k.to_native(Point::new(x, y));
        let back = k.from_native(left, right);
        prop_assert!((back.x - x).abs() < 1e-6, "x {} -> {}", x, back.x);
        prop_assert!((back.y - y).abs() < 1e-6, "y {} -> {}", y, back.y);
    }

    #[test]
    fn string_lengths_are_positive(x in -200.0f64..500.0, y in 0.0f64..500.0) {
        let k = pulley_profile(InverseModel::Anchored).kinematics();
        let (left, right) = k.to_native(Point::new(x, y));
        prop_assert!(left > 0.0);
        prop_assert!(right > 0.0);
    }

    #[test]
    fn bounding_box_only_widens(points in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 1..64)) {
        let mut bounds = BoundingBox::new();
        for (x, y) in points {
            let before = bounds;
            bounds.include(Point::new(x, y));
            prop_assert!(bounds.contains(&before));
            prop_assert!(bounds.min_x <= x && x <= bounds.max_x);
            prop_assert!(bounds.min_y <= y && y <= bounds.max_y);
        }
    }
}

#[test]
fn center_distance_fallback_for_infeasible_lengths() {
    let profile = pulley_profile(InverseModel::CenterDistance);
    let k = profile.kinematics();
    // x' = (D^2 + 1) / 2 is far beyond D, so the radicand is negative.
    let p = k.from_native(1.0, 0.0);
    assert_eq!(p.y, 10.0);
    assert_eq!(p, k.from_native(1.0, 0.0));
}

#[test]
fn fallback_value_follows_profile() {
    let mut profile = pulley_profile(InverseModel::Anchored);
    profile.degenerate_fallback = 42.0;
    let p = profile.kinematics().from_native(1.0, 1000.0);
    assert_eq!(p.y, 42.0);
}

#[test]
fn triangulation_sanity_at_origin() {
    let profile = pulley_profile(InverseModel::Anchored);
    let (left, right) = profile.kinematics().to_native(Point::new(0.0, 0.0));
    let expected = (60.0f64.powi(2) + (-40.0f64 + 22.5).powi(2)).sqrt();
    assert!((left - right).abs() < 1e-12);
    assert!((left - expected).abs() < 1e-12);
}
