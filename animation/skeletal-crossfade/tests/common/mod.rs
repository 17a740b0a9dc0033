//! Common test sources and fixtures

#![allow(dead_code)]

use glam::{Quat, Vec3};
use rstest::fixture;
use skeletal_crossfade::source::ROOT_PARENT;
use skeletal_crossfade::{InMemorySource, SourceClip, SourceTransform, Transform};

pub const FRAME_DURATION: f32 = 1.0 / 30.0;
pub const EPSILON: f32 = 1e-4;

/// Root plus one child; "step" moves the child by +X on frame 1
#[fixture]
pub fn root_and_child() -> InMemorySource {
    InMemorySource::new()
        .with_bone(
            "root",
            ROOT_PARENT,
            SourceTransform::new(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY),
        )
        .with_bone(
            "child",
            0,
            SourceTransform::new(Vec3::new(0.0, 2.0, 0.0), Quat::IDENTITY),
        )
        .with_clip(SourceClip::from_fn("step", 2, 2, |bone, frame| {
            if bone == 1 && frame == 1 {
                SourceTransform::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY)
            } else {
                SourceTransform::IDENTITY
            }
        }))
        .with_clip(SourceClip::from_fn("still", 2, 3, |_, _| {
            SourceTransform::IDENTITY
        }))
}

/// A small humanoid-ish chain with an IK helper in the middle of the
/// source order
#[fixture]
pub fn rig() -> InMemorySource {
    let bones: [(&str, i32, Vec3, Quat); 6] = [
        ("pelvis", ROOT_PARENT, Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY),
        ("spine", 0, Vec3::new(0.0, 0.3, 0.0), Quat::from_rotation_x(0.1)),
        ("ik_foot_target", 0, Vec3::new(0.2, -1.0, 0.0), Quat::IDENTITY),
        ("thigh", 0, Vec3::new(0.2, -0.1, 0.0), Quat::from_rotation_z(0.05)),
        ("shin", 3, Vec3::new(0.0, -0.45, 0.0), Quat::IDENTITY),
        ("head", 1, Vec3::new(0.0, 0.5, 0.0), Quat::from_rotation_y(-0.2)),
    ];

    let mut source = InMemorySource::new();
    for (name, parent, position, rotation) in bones {
        source = source.with_bone(name, parent, SourceTransform::new(position, rotation));
    }

    source
        .with_clip(SourceClip::from_fn("walk", 6, 8, |bone, frame| {
            let angle = frame as f32 * 0.2 + bone as f32 * 0.05;
            SourceTransform::new(
                Vec3::new(0.0, 0.01 * frame as f32, 0.0),
                Quat::from_rotation_x(angle.sin() * 0.4),
            )
        }))
        .with_clip(SourceClip::from_fn("run", 6, 5, |bone, frame| {
            let angle = frame as f32 * 0.5 - bone as f32 * 0.1;
            SourceTransform::new(
                Vec3::new(0.02 * frame as f32, 0.0, 0.0),
                Quat::from_rotation_x(angle.cos() * 0.7),
            )
        }))
}

/// Source whose keyframes are all identity offsets, in two clips of the
/// given lengths
pub fn identity_offsets(frames_a: usize, frames_b: usize) -> InMemorySource {
    InMemorySource::new()
        .with_bone(
            "root",
            ROOT_PARENT,
            SourceTransform::new(Vec3::new(0.5, 0.0, 0.0), Quat::from_rotation_z(0.7)),
        )
        .with_bone(
            "arm",
            0,
            SourceTransform::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_x(-0.4)),
        )
        .with_clip(SourceClip::from_fn("a", 2, frames_a, |_, _| {
            SourceTransform::IDENTITY
        }))
        .with_clip(SourceClip::from_fn("b", 2, frames_b, |_, _| {
            SourceTransform::IDENTITY
        }))
}

pub fn assert_transform_eq(actual: &Transform, expected: &Transform) {
    assert!(
        actual.abs_diff_eq(expected, EPSILON),
        "transforms differ:\n  actual:   {actual:?}\n  expected: {expected:?}"
    );
}
