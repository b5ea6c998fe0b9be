use crate::geom::{Coverage, ElevationField, InsufficientDataError, Point2, TriangulatedField};
use crate::model::SurfacePoint;

fn scattered_points(count: usize) -> Vec<SurfacePoint> {
    // Fixed LCG so the sample set is stable across runs.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..count)
        .map(|_| {
            SurfacePoint::new(
                512_000.0 + next() * 400.0,
                6_180_000.0 + next() * 300.0,
                40.0 + next() * 15.0,
            )
        })
        .collect()
}

#[test]
fn interpolation_is_exact_at_every_sample() {
    let points = scattered_points(40);
    let field = TriangulatedField::build(&points).unwrap();

    for p in &points {
        let sample = field.sample(p.position());
        assert_eq!(sample.coverage, Coverage::Inside);
        assert!(
            (sample.elevation - p.elevation).abs() <= 1e-9,
            "sample at ({}, {}) gave {} instead of {}",
            p.easting,
            p.northing,
            sample.elevation,
            p.elevation
        );
    }
}

#[test]
fn reproduces_a_plane_inside_the_hull() {
    let plane = |x: f64, y: f64| 0.02 * x - 0.01 * y + 5.0;
    let points: Vec<SurfacePoint> = [
        (0.0, 0.0),
        (100.0, 0.0),
        (100.0, 80.0),
        (0.0, 80.0),
        (40.0, 30.0),
        (70.0, 60.0),
    ]
    .into_iter()
    .map(|(x, y)| SurfacePoint::new(x, y, plane(x, y)))
    .collect();
    let field = TriangulatedField::build(&points).unwrap();

    for (x, y) in [(10.0, 10.0), (55.5, 41.25), (99.0, 79.0), (50.0, 0.0)] {
        let z = field.elevation_at(x, y);
        assert!((z - plane(x, y)).abs() < 1e-9, "({x}, {y}) -> {z}");
    }
}

#[test]
fn borehole_on_triangle_edge_is_interpolated() {
    let points = [
        SurfacePoint::new(500_000.0, 200_000.0, 100.5),
        SurfacePoint::new(500_100.0, 200_100.0, 102.3),
        SurfacePoint::new(500_200.0, 200_000.0, 99.8),
    ];
    let field = TriangulatedField::build(&points).unwrap();

    let sample = field.sample(Point2::new(500_050.0, 200_050.0));
    assert_eq!(sample.coverage, Coverage::Inside);
    assert!((sample.elevation - 101.4).abs() < 1e-9);
    assert_eq!(field.triangle_count(), 1);
}

#[test]
fn outside_hull_uses_nearest_sample() {
    let points = [
        SurfacePoint::new(0.0, 0.0, 10.0),
        SurfacePoint::new(10.0, 0.0, 20.0),
        SurfacePoint::new(0.0, 10.0, 30.0),
    ];
    let field = TriangulatedField::build(&points).unwrap();

    let sample = field.sample(Point2::new(12.0, 1.0));
    assert_eq!(sample.coverage, Coverage::Extrapolated);
    assert_eq!(sample.elevation, 20.0);

    // Inside the bounding box but beyond the hypotenuse.
    let sample = field.sample(Point2::new(9.0, 9.0));
    assert_eq!(sample.coverage, Coverage::Extrapolated);
    assert!(!field.covers(Point2::new(9.0, 9.0)));
}

#[test]
fn fewer_than_three_points_is_insufficient() {
    let points = [
        SurfacePoint::new(0.0, 0.0, 1.0),
        SurfacePoint::new(1.0, 1.0, 2.0),
    ];
    let err = TriangulatedField::build(&points).unwrap_err();
    assert_eq!(err, InsufficientDataError { usable: 2 });

    let err = TriangulatedField::build(&[]).unwrap_err();
    assert_eq!(err.usable, 0);
}

#[test]
fn collinear_points_are_insufficient() {
    let points: Vec<SurfacePoint> = (0..6)
        .map(|i| SurfacePoint::new(f64::from(i), 2.0 * f64::from(i), 5.0))
        .collect();
    let err = TriangulatedField::build(&points).unwrap_err();
    assert_eq!(err.usable, 6);
}

#[test]
fn non_finite_samples_are_ignored() {
    let points = [
        SurfacePoint::new(0.0, 0.0, 1.0),
        SurfacePoint::new(f64::NAN, 5.0, 1.0),
        SurfacePoint::new(10.0, 0.0, 1.0),
        SurfacePoint::new(0.0, 10.0, f64::INFINITY),
    ];
    let err = TriangulatedField::build(&points).unwrap_err();
    assert_eq!(err.usable, 2);
}

#[test]
fn duplicate_samples_are_tolerated() {
    let points = [
        SurfacePoint::new(0.0, 0.0, 1.0),
        SurfacePoint::new(10.0, 0.0, 2.0),
        SurfacePoint::new(0.0, 10.0, 3.0),
        SurfacePoint::new(10.0, 0.0, 2.0),
        SurfacePoint::new(10.0, 10.0, 4.0),
    ];
    let field = TriangulatedField::build(&points).unwrap();
    assert!((field.elevation_at(10.0, 0.0) - 2.0).abs() < 1e-12);

    let mesh = field.mesh();
    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn build_is_deterministic() {
    let points = scattered_points(25);
    let a = TriangulatedField::build(&points).unwrap();
    let b = TriangulatedField::build(&points).unwrap();
    assert_eq!(a.mesh(), b.mesh());

    let q = Point2::new(512_123.0, 6_180_111.0);
    assert_eq!(a.sample(q), b.sample(q));
}

#[test]
fn mesh_is_in_world_coordinates() {
    let points = scattered_points(12);
    let field = TriangulatedField::build(&points).unwrap();
    let mesh = field.mesh();
    let bounds = field.bounds();

    assert!(mesh.validate().is_ok());
    for p in &mesh.positions {
        assert!(bounds.contains_point(Point2::new(p[0], p[1]), 1e-6));
    }
}
