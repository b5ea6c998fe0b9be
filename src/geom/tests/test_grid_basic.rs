use crate::geom::{ElevationField, Point2, TriangulatedField, resample_grid};
use crate::model::SurfacePoint;

fn square_plane() -> TriangulatedField {
    let plane = |x: f64, y: f64| x + 2.0 * y;
    let points: Vec<SurfacePoint> = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
        .into_iter()
        .map(|(x, y)| SurfacePoint::new(x, y, plane(x, y)))
        .collect();
    TriangulatedField::build(&points).unwrap()
}

#[test]
fn resample_fully_covered_square() {
    let field = square_plane();
    let mesh = resample_grid(&field, 5);

    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.vertex_count(), 25);
    assert_eq!(mesh.triangle_count(), 4 * 4 * 2);
    for p in &mesh.positions {
        assert!((p[2] - (p[0] + 2.0 * p[1])).abs() < 1e-9);
    }
}

#[test]
fn resample_masks_nodes_outside_hull() {
    let points = [
        SurfacePoint::new(0.0, 0.0, 1.0),
        SurfacePoint::new(10.0, 0.0, 1.0),
        SurfacePoint::new(0.0, 10.0, 1.0),
    ];
    let field = TriangulatedField::build(&points).unwrap();
    let mesh = resample_grid(&field, 3);

    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.triangle_count(), 4);
    for p in &mesh.positions {
        assert!(field.covers(Point2::new(p[0], p[1])));
    }
}

#[test]
fn resolution_below_two_is_clamped() {
    let field = square_plane();
    let mesh = resample_grid(&field, 0);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}
