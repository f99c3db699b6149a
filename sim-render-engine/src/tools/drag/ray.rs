use bevy::prelude::*;
use bevy::render::primitives::Aabb;

/// A ray/renderable intersection candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub body_id: i32,
    pub distance: f32,
}

/// Test the ray against a renderable's local-space bounds under its world
/// transform. Returns the hit distance along the ray.
pub fn ray_hits_bounds(
    origin: Vec3,
    dir: Vec3,
    xf: &GlobalTransform,
    bounds: &Aabb,
) -> Option<f32> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    ray_aabb_hit_t(o_local, d_local, bounds.min().into(), bounds.max().into())
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = Vec3::new(
        if ray_direction.x != 0.0 { 1.0 / ray_direction.x } else { f32::INFINITY },
        if ray_direction.y != 0.0 { 1.0 / ray_direction.y } else { f32::INFINITY },
        if ray_direction.z != 0.0 { 1.0 / ray_direction.z } else { f32::INFINITY },
    );

    let (mut tmin, mut tmax) = ((min.x - ray_origin.x) * inv.x, (max.x - ray_origin.x) * inv.x);
    if tmin > tmax {
        std::mem::swap(&mut tmin, &mut tmax);
    }

    let (mut tymin, mut tymax) = ((min.y - ray_origin.y) * inv.y, (max.y - ray_origin.y) * inv.y);
    if tymin > tymax {
        std::mem::swap(&mut tymin, &mut tymax);
    }

    if (tmin > tymax) || (tymin > tmax) {
        return None;
    }
    if tymin > tmin {
        tmin = tymin;
    }
    if tymax < tmax {
        tmax = tymax;
    }

    let (mut tzmin, mut tzmax) = ((min.z - ray_origin.z) * inv.z, (max.z - ray_origin.z) * inv.z);
    if tzmin > tzmax {
        std::mem::swap(&mut tzmin, &mut tzmax);
    }

    if (tmin > tzmax) || (tzmin > tmax) {
        return None;
    }
    if tzmin > tmin {
        tmin = tzmin;
    }
    if tzmax < tmax {
        tmax = tzmax;
    }

    if tmax < 0.0 {
        return None;
    }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}

/// Walk hits near-to-far and return the first that is draggable: only
/// renderables tagged with a positive body id qualify, no matter how close
/// an undraggable hit sits in front of them.
pub fn first_draggable(mut hits: Vec<RayHit>) -> Option<RayHit> {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits.into_iter().find(|hit| hit.body_id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_test_hits_a_unit_box_straight_on() {
        let t = ray_aabb_hit_t(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn slab_test_misses_to_the_side() {
        let t = ray_aabb_hit_t(
            Vec3::new(3.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, None);
    }

    #[test]
    fn slab_test_from_inside_returns_the_exit() {
        let t = ray_aabb_hit_t(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn transformed_bounds_shift_the_hit_distance() {
        let bounds = Aabb::from_min_max(Vec3::splat(-0.5), Vec3::splat(0.5));
        let xf = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, -2.0));
        let t = ray_hits_bounds(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), &xf, &bounds);
        assert_eq!(t, Some(1.5));
    }

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn world_body_and_untagged_hits_never_win() {
        let e = entities(2);
        let hits = vec![
            RayHit { entity: e[0], body_id: 0, distance: 1.0 },
            RayHit { entity: e[1], body_id: -1, distance: 2.0 },
        ];
        assert_eq!(first_draggable(hits), None);
    }

    #[test]
    fn nearest_draggable_wins_even_behind_scenery() {
        let e = entities(3);
        let plane = RayHit { entity: e[0], body_id: 0, distance: 1.0 };
        let far = RayHit { entity: e[1], body_id: 2, distance: 5.0 };
        let near = RayHit { entity: e[2], body_id: 1, distance: 3.0 };
        let hit = first_draggable(vec![plane, far, near]).unwrap();
        assert_eq!(hit.body_id, 1);
        assert_eq!(hit.distance, 3.0);
    }
}
