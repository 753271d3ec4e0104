use approx::assert_relative_eq;
use gray_kernel_math::{Aabb3, Point3, RigidTransform, Vec3};
use gray_kernel_raytrace::intersect::{
    Cylinder, Ellipsoid, Parallelepiped, Parallelogram, Sphere, Torus, Triangle,
};
use gray_kernel_raytrace::{BezierScratch, Face, Ray, Shape, SurfaceHit, Viewable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn trace(shape: impl Into<Shape>, ray: &Ray, max_dist: f64) -> Option<SurfaceHit> {
    shape
        .into()
        .find_intersection(ray, max_dist, &mut BezierScratch::new())
        .unwrap()
}

/// The outward normal must oppose the ray on front hits and follow it on
/// back hits.
fn assert_face_consistent(hit: &SurfaceHit, ray: &Ray) {
    let along = ray.dir().dot(&hit.normal);
    match hit.face {
        Face::Front => assert!(along < 0.0, "front hit with normal along ray"),
        Face::Back => assert!(along > 0.0, "back hit with normal against ray"),
    }
}

#[test]
fn sphere_scenario() {
    let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
    let hit = trace(Sphere::new(Point3::origin(), 1.0), &ray, 100.0).unwrap();
    assert_relative_eq!(hit.t, 4.0, epsilon = 1e-12);
    assert_eq!(hit.face, Face::Front);
    assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    assert_relative_eq!(hit.normal.into_inner(), -Vec3::z(), epsilon = 1e-12);
}

#[test]
fn sphere_round_trip_finds_nearer_point() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let center = Point3::new(
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
        );
        let radius = rng.random_range(0.5..3.0);
        let sphere = Sphere::new(center, radius);
        let dir = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        )
        .normalize();
        let on_surface = center + dir * radius;
        let origin = on_surface + dir * 10.0;
        let ray = Ray::new(origin, -dir);
        let hit = trace(sphere, &ray, 100.0).unwrap();
        assert_relative_eq!(hit.t, 10.0, max_relative = 1e-9);
        assert_relative_eq!(hit.point, on_surface, max_relative = 1e-9);
        assert_eq!(hit.face, Face::Front);
    }
}

#[test]
fn tangent_rays_miss() {
    // Each ray grazes its shape at exactly one point. Radii are powers of
    // two so the discriminant is exactly zero.
    let graze_x = Ray::new(Point3::new(-5.0, 1.0, 0.0), Vec3::x());
    let shapes: [Shape; 3] = [
        Sphere::new(Point3::origin(), 1.0).into(),
        Ellipsoid::new(Point3::origin(), 4.0, 1.0, 2.0).into(),
        Cylinder::new(Point3::origin(), Vec3::z(), 1.0, 4.0).into(),
    ];
    let mut scratch = BezierScratch::new();
    for shape in &shapes {
        let first = shape.find_intersection(&graze_x, 100.0, &mut scratch).unwrap();
        let again = shape.find_intersection(&graze_x, 100.0, &mut scratch).unwrap();
        assert!(first.is_none());
        assert_eq!(first, again);
    }
}

#[test]
fn face_orientation_matches_normals() {
    let shapes: Vec<Shape> = vec![
        Sphere::new(Point3::new(0.5, 0.0, 0.0), 2.0).into(),
        Ellipsoid::new(Point3::new(0.0, 0.5, 0.0), 3.0, 2.0, 2.5)
            .with_axes(Vec3::new(0.0, 1.0, 1.0), Vec3::x())
            .into(),
        Triangle::new(
            Point3::new(-4.0, -4.0, 0.5),
            Point3::new(4.0, -4.0, 0.0),
            Point3::new(0.0, 4.0, -0.5),
        )
        .into(),
        Parallelepiped::new(
            Point3::new(-2.0, -2.0, -2.0),
            Point3::new(2.0, -2.0, -2.0),
            Point3::new(-1.0, 2.0, -2.0),
            Point3::new(-2.0, -1.5, 2.0),
        )
        .into(),
        Cylinder::new(Point3::origin(), Vec3::new(1.0, 1.0, 0.0), 1.5, 3.0).into(),
        Torus::new(Point3::origin(), Vec3::z(), 2.0, 0.75).into(),
    ];
    let mut rng = StdRng::seed_from_u64(11);
    let mut scratch = BezierScratch::new();
    let mut fronts = 0;
    let mut backs = 0;
    for _ in 0..500 {
        let origin = Point3::new(
            rng.random_range(-6.0..6.0),
            rng.random_range(-6.0..6.0),
            rng.random_range(-6.0..6.0),
        );
        let target = Point3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let ray = Ray::new(origin, target - origin);
        for shape in &shapes {
            if let Some(hit) = shape.find_intersection(&ray, 100.0, &mut scratch).unwrap() {
                assert!(hit.t > 0.0 && hit.t < 100.0);
                assert_face_consistent(&hit, &ray);
                match hit.face {
                    Face::Front => fronts += 1,
                    Face::Back => backs += 1,
                }
            }
        }
    }
    assert!(fronts > 0 && backs > 0);
}

#[test]
fn torus_scenario_alternates_faces() {
    let torus = Torus::new(Point3::origin(), Vec3::y(), 2.0, 0.5);
    let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vec3::x());
    let hits = torus.all_hits(&ray);
    let ts: Vec<f64> = hits.iter().map(|h| h.t).collect();
    assert_eq!(ts.len(), 4);
    for (t, expected) in ts.iter().zip([2.5, 3.5, 6.5, 7.5]) {
        assert_relative_eq!(*t, expected, epsilon = 1e-8);
    }
    let faces: Vec<Face> = hits.iter().map(|h| h.face).collect();
    assert_eq!(faces, vec![Face::Front, Face::Back, Face::Front, Face::Back]);
    for hit in &hits {
        assert_face_consistent(hit, &ray);
    }

    // Nearest hit and the cut-off just before it.
    let first = torus.intersect(&ray, 100.0).unwrap();
    assert_relative_eq!(first.t, 2.5, epsilon = 1e-8);
    assert!(torus.intersect(&ray, 2.4).is_none());
}

#[test]
fn parallelepiped_static_test_matches_member() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut hits = 0;
    for _ in 0..1000 {
        let mut random_vec = |scale: f64| {
            Vec3::new(
                rng.random_range(-scale..scale),
                rng.random_range(-scale..scale),
                rng.random_range(-scale..scale),
            )
        };
        let a = Point3::from(random_vec(1.0));
        let (ab, ac, ad) = (random_vec(2.0), random_vec(2.0), random_vec(2.0));
        if ab.cross(&ac).dot(&ad).abs() < 0.1 {
            continue;
        }
        let origin = Point3::from(random_vec(4.0));
        let dir = random_vec(1.0);
        if dir.norm() < 1e-3 {
            continue;
        }
        let ray = Ray::new(origin, dir);
        let max_dist = rng.random_range(0.5..10.0);

        let ppd = Parallelepiped::new(a, a + ab, a + ac, a + ad);
        let quick =
            Parallelepiped::quick_intersect_slabs(&ray.origin, ray.dir(), max_dist, ppd.slabs());
        assert_eq!(quick, ppd.quick_intersect(&ray, max_dist));

        let expected = quick.and_then(|(t_in, t_out)| {
            if t_in > 0.0 {
                Some((t_in, Face::Front))
            } else if t_out > 0.0 && t_out < max_dist {
                Some((t_out, Face::Back))
            } else {
                None
            }
        });
        let member = ppd.intersect(&ray, max_dist).map(|h| (h.t, h.face));
        assert_eq!(member, expected);
        hits += usize::from(member.is_some());
    }
    assert!(hits > 50);
}

#[test]
fn parallelogram_uv_and_culling_are_consistent() {
    let pg = Parallelogram::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(3.0, 1.0, 0.0),
    );
    let ray = Ray::new(Point3::new(1.5, 0.5, 1.0), -Vec3::z());
    let hit = trace(pg.clone(), &ray, 10.0).unwrap();
    assert_eq!(hit.face, Face::Front);
    let uv = hit.uv.unwrap();
    assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
    let below = Ray::new(Point3::new(1.5, 0.5, -1.0), Vec3::z());
    assert_eq!(trace(pg, &below, 10.0).unwrap().face, Face::Back);
}

#[test]
fn transformed_shapes_move_together() {
    let xf = RigidTransform::rotation_z(std::f64::consts::FRAC_PI_2)
        .then(&RigidTransform::translation(0.0, 0.0, 10.0));
    let mut shapes: Vec<Shape> = vec![
        Sphere::new(Point3::new(3.0, 0.0, 0.0), 1.0).into(),
        Ellipsoid::new(Point3::new(3.0, 0.0, 0.0), 1.0, 1.0, 1.0).into(),
        Parallelepiped::axis_aligned(Point3::new(2.0, -1.0, -1.0), Point3::new(4.0, 1.0, 1.0)).into(),
    ];
    for shape in &mut shapes {
        shape.transform(&xf);
    }
    // All three were centred at (3, 0, 0) and now sit near the same point.
    for shape in &shapes {
        let aabb = shape.aabb();
        let center = nalgebra::center(&aabb.min, &aabb.max);
        let placed = xf.apply_point(&Point3::new(3.0, 0.0, 0.0));
        assert_relative_eq!(center, placed, epsilon = 1e-9);
    }
}

#[test]
fn near_axial_cylinder_rays_leave_through_cap() {
    let cylinder = Cylinder::new(Point3::origin(), Vec3::z(), 1.0, 4.0);
    for tilt in [1e-5, 1e-7, 1e-9, 1e-12] {
        for start in [Point3::new(0.5, 0.0, 0.0), Point3::new(-0.3, 0.6, -1.0)] {
            let ray = Ray::new(start, Vec3::new(tilt, 0.0, 1.0));
            let hit = trace(cylinder.clone(), &ray, 100.0)
                .unwrap_or_else(|| panic!("no hit for tilt {tilt} from {start}"));
            assert_eq!(hit.face, Face::Back);
            assert_relative_eq!(hit.t, 2.0 - start.z, epsilon = 1e-9);
            assert_relative_eq!(hit.normal.into_inner(), Vec3::z(), epsilon = 1e-12);

            let down = Ray::new(start, Vec3::new(tilt, 0.0, -1.0));
            let hit = trace(cylinder.clone(), &down, 100.0).unwrap();
            assert_relative_eq!(hit.t, 2.0 + start.z, epsilon = 1e-9);
            assert_relative_eq!(hit.normal.into_inner(), -Vec3::z(), epsilon = 1e-12);
        }
    }
}

#[test]
fn large_radius_quadrics_hit() {
    let r = 2e6;
    let toward = Ray::new(Point3::new(0.0, 0.0, -5e6), Vec3::z());
    let outward = Ray::new(Point3::origin(), Vec3::x());

    for shape in [
        Shape::from(Sphere::new(Point3::origin(), r)),
        Shape::from(Ellipsoid::new(Point3::origin(), r, r, r)),
        Shape::from(Ellipsoid::new(Point3::origin(), r, 4e6, r)),
    ] {
        let hit = trace(shape.clone(), &toward, 1e8).unwrap();
        assert_eq!(hit.face, Face::Front);
        assert_relative_eq!(hit.t, 3e6, max_relative = 1e-9);

        let hit = trace(shape, &outward, 1e8).unwrap();
        assert_eq!(hit.face, Face::Back);
        assert_relative_eq!(hit.t, r, max_relative = 1e-9);
    }

    let wide = Cylinder::new(Point3::origin(), Vec3::z(), r, 10.0);
    let side = Ray::new(Point3::new(-5e6, 0.0, 1.0), Vec3::x());
    let hit = trace(wide.clone(), &side, 1e8).unwrap();
    assert_eq!(hit.face, Face::Front);
    assert_relative_eq!(hit.t, 3e6, max_relative = 1e-9);
    let hit = trace(wide, &outward, 1e8).unwrap();
    assert_eq!(hit.face, Face::Back);
    assert_relative_eq!(hit.t, r, max_relative = 1e-9);
}

#[test]
fn parallelepiped_extents_ignore_contact_without_overlap() {
    let cube = Parallelepiped::axis_aligned(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
    for axis in 0..3 {
        for (lo, hi) in [(-1.0, 0.0), (1.0, 2.0)] {
            let mut min = Point3::origin();
            let mut max = Point3::new(1.0, 1.0, 1.0);
            min[axis] = lo;
            max[axis] = hi;
            let touching = Aabb3::new(min, max);
            assert!(cube.extents_in_box(&touching).is_none(), "face contact on axis {axis} at {lo}");
        }
    }

    // Sharing only an edge.
    let edge = Aabb3::new(Point3::new(1.0, 1.0, 0.0), Point3::new(2.0, 2.0, 1.0));
    assert!(cube.extents_in_box(&edge).is_none());

    // A flat box inside the solid never meets its surface.
    let sheet = Aabb3::new(Point3::new(0.2, 0.2, 0.5), Point3::new(0.8, 0.8, 0.5));
    assert!(cube.extents_in_box(&sheet).is_none());

    let overlapping = Aabb3::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 2.0, 2.0));
    let ext = cube.extents_in_box(&overlapping).unwrap();
    assert_relative_eq!(ext.min, Point3::new(0.5, 0.5, 0.5), epsilon = 1e-12);
    assert_relative_eq!(ext.max, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-12);

    // Through the trait, the other solids agree on face contact.
    let sphere: Shape = Sphere::new(Point3::origin(), 1.0).into();
    let beside = Aabb3::new(Point3::new(1.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0));
    assert!(sphere.extents_in_box(&beside).is_none());
    let shape: Shape = cube.into();
    assert!(shape.extents_in_box(&Aabb3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0))).is_none());
}
