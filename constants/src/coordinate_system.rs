use bevy::math::{Quat, Vec3};

/// Frame a value is expressed in when it crosses the physics/render boundary.
///
/// The physics engine is Z-up right-handed; the render engine is Y-up. Every
/// strided reader below takes the target frame explicitly so a caller can
/// never pick up an accidental double conversion: the swizzle happens on the
/// read, and values that already crossed the boundary must not be fed back in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Z-up right-handed, exactly as stored in the model columns.
    Physics,
    /// Y-up, as consumed by the render engine (Z→Y, -Y→Z, X→X).
    Render,
}

/// Read the position at `index` from a stride-3 column, converted to `frame`.
pub fn position_at(column: &[f64], index: usize, frame: Frame) -> Vec3 {
    let base = index * 3;
    match frame {
        Frame::Physics => Vec3::new(
            column[base] as f32,
            column[base + 1] as f32,
            column[base + 2] as f32,
        ),
        Frame::Render => Vec3::new(
            column[base] as f32,
            column[base + 2] as f32,
            -(column[base + 1] as f32),
        ),
    }
}

/// Read the quaternion at `index` from a stride-4 column, converted to `frame`.
pub fn quaternion_at(column: &[f64], index: usize, frame: Frame) -> Quat {
    let base = index * 4;
    let q = [
        column[base] as f32,
        column[base + 1] as f32,
        column[base + 2] as f32,
        column[base + 3] as f32,
    ];
    match frame {
        Frame::Physics => Quat::from_xyzw(q[0], q[1], q[2], q[3]),
        Frame::Render => Quat::from_xyzw(-q[1], -q[3], q[2], -q[0]),
    }
}

/// Swizzle an interleaved xyz triple buffer (mesh vertices or normals) from
/// the physics frame to the render frame, in place. Not an involution: it must
/// run at most once per buffer.
pub fn swizzle_triples_in_place(points: &mut [f32]) {
    for p in points.chunks_exact_mut(3) {
        let y = p[1];
        p[1] = p[2];
        p[2] = -y;
    }
}

/// Convert a render-frame vector back into the physics frame. Drag
/// displacements are handed to the physics engine in its own convention.
pub fn to_physics_vec(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}
