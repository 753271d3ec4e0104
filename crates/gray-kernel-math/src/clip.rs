//! Clipping of planar convex polygons against axis-aligned boxes.

use crate::{Aabb3, Point3, Vec3};

/// Relative area below which a clipped polygon counts as degenerate.
const DEGENERATE_AREA_RATIO: f64 = 1e-12;

/// Clip a planar convex polygon against a box.
///
/// Each of the six box slabs is applied in turn (Sutherland-Hodgman); points
/// on a slab boundary are kept. Returns an empty vector when the result has
/// no area, which includes polygons that only touch the box along an edge.
pub fn clip_convex_polygon(vertices: &[Point3], aabb: &Aabb3) -> Vec<Point3> {
    let original_area = polygon_area(vertices);
    if vertices.len() < 3 || original_area <= 0.0 {
        return Vec::new();
    }

    let mut poly = vertices.to_vec();
    let mut scratch = Vec::with_capacity(vertices.len() + 6);
    for axis in 0..3 {
        // Keep p[axis] >= min[axis], then p[axis] <= max[axis].
        clip_half_space(&poly, &mut scratch, axis, aabb.min[axis], 1.0);
        std::mem::swap(&mut poly, &mut scratch);
        clip_half_space(&poly, &mut scratch, axis, aabb.max[axis], -1.0);
        std::mem::swap(&mut poly, &mut scratch);
        if poly.is_empty() {
            return poly;
        }
    }

    if polygon_area(&poly) <= original_area * DEGENERATE_AREA_RATIO {
        poly.clear();
    }
    poly
}

/// Bounding box of the part of a planar convex polygon inside `aabb`.
///
/// The bound is clamped to `aabb` so round-off in the clipping never leaks
/// outside it.
pub fn polygon_extents_in_box(vertices: &[Point3], aabb: &Aabb3) -> Option<Aabb3> {
    let clipped = clip_convex_polygon(vertices, aabb);
    Aabb3::from_points(&clipped)?.intersection(aabb)
}

/// Keep the part of `input` where `sign * (p[axis] - bound) >= 0`.
fn clip_half_space(input: &[Point3], output: &mut Vec<Point3>, axis: usize, bound: f64, sign: f64) {
    output.clear();
    let Some(mut prev) = input.last() else {
        return;
    };
    let mut prev_dist = sign * (prev[axis] - bound);
    for cur in input {
        let cur_dist = sign * (cur[axis] - bound);
        if (prev_dist >= 0.0) != (cur_dist >= 0.0) {
            let s = prev_dist / (prev_dist - cur_dist);
            let mut crossing = prev + (cur - prev) * s;
            crossing[axis] = bound;
            output.push(crossing);
        }
        if cur_dist >= 0.0 {
            output.push(*cur);
        }
        prev = cur;
        prev_dist = cur_dist;
    }
}

/// Area of a planar polygon.
fn polygon_area(vertices: &[Point3]) -> f64 {
    let Some(first) = vertices.first() else {
        return 0.0;
    };
    let mut twice_area = Vec3::zeros();
    for pair in vertices.windows(2) {
        twice_area += (pair[0] - first).cross(&(pair[1] - first));
    }
    0.5 * twice_area.norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb3 {
        Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_polygon_inside_is_unchanged() {
        let tri = [
            Point3::new(0.1, 0.1, 0.5),
            Point3::new(0.9, 0.1, 0.5),
            Point3::new(0.1, 0.9, 0.5),
        ];
        let clipped = clip_convex_polygon(&tri, &unit_box());
        assert_eq!(clipped.len(), 3);
        assert!((polygon_area(&clipped) - 0.32).abs() < 1e-12);
    }

    #[test]
    fn test_large_square_clipped_to_box_face() {
        let square = [
            Point3::new(-1.0, -1.0, 0.25),
            Point3::new(2.0, -1.0, 0.25),
            Point3::new(2.0, 2.0, 0.25),
            Point3::new(-1.0, 2.0, 0.25),
        ];
        let clipped = clip_convex_polygon(&square, &unit_box());
        assert!((polygon_area(&clipped) - 1.0).abs() < 1e-12);
        let ext = polygon_extents_in_box(&square, &unit_box()).unwrap();
        assert_eq!(ext.min, Point3::new(0.0, 0.0, 0.25));
        assert_eq!(ext.max, Point3::new(1.0, 1.0, 0.25));
    }

    #[test]
    fn test_polygon_in_box_face_plane_is_kept() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.0, 0.5, 0.0),
        ];
        assert_eq!(clip_convex_polygon(&tri, &unit_box()).len(), 3);
    }

    #[test]
    fn test_edge_touch_is_empty() {
        // Triangle standing on the x = 1 face, otherwise outside the box.
        let tri = [
            Point3::new(1.0, 0.2, 0.2),
            Point3::new(1.0, 0.8, 0.2),
            Point3::new(2.0, 0.5, 0.8),
        ];
        assert!(clip_convex_polygon(&tri, &unit_box()).is_empty());
        assert!(polygon_extents_in_box(&tri, &unit_box()).is_none());
    }

    #[test]
    fn test_disjoint_polygon_is_empty() {
        let tri = [
            Point3::new(3.0, 3.0, 3.0),
            Point3::new(4.0, 3.0, 3.0),
            Point3::new(3.0, 4.0, 3.0),
        ];
        assert!(clip_convex_polygon(&tri, &unit_box()).is_empty());
    }
}
