//! World transform resolution
//!
//! Bones are stored parent-before-child, so one forward pass over the bone
//! list composes every local transform with its already resolved parent.
//! For each bone `b` at frame `f`:
//!
//! ```text
//! world[b][f] = local_keyframe[b][f] ∘ local_bind[b]
//! world[b][f] = world[b][f] ∘ world[parent(b)][f]    (non-root bones)
//! ```

use super::interpolation::interpolate;
use super::state::PlaybackState;
use super::types::Transform;
use crate::error::{AnimationError, Result};
use crate::skeleton::{AnimationClip, SkeletonBone};

/// World-space bind pose: the resolver with identity keyframe offsets
///
/// Every parent must precede its child in `bones`, otherwise
/// [`AnimationError::InvalidParent`] is returned.
pub fn resolve_bind_pose(bones: &[SkeletonBone]) -> Result<Vec<Transform>> {
    let mut world: Vec<Transform> = Vec::with_capacity(bones.len());
    for (index, bone) in bones.iter().enumerate() {
        let resolved = match bone.parent {
            Some(parent) if parent < index => bone.local_bind.compose(&world[parent]),
            Some(parent) => {
                return Err(AnimationError::InvalidParent {
                    bone: index,
                    parent: i32::try_from(parent).unwrap_or(i32::MAX),
                });
            }
            None => bone.local_bind,
        };
        world.push(resolved);
    }
    Ok(world)
}

/// Resolve every bone of `clip` at `frame` into its world keyframe cache
pub fn resolve_frame(clip: &mut AnimationClip, frame: usize) -> Result<()> {
    clip.check_frame(frame)?;

    let bones = clip.bones_mut();
    for index in 0..bones.len() {
        let bone = &bones[index];
        let mut world = bone.local_keyframes[frame].compose(&bone.local_bind);
        if let Some(parent) = bone.parent {
            world = world.compose(&bones[parent].world_keyframes[frame]);
        }
        bones[index].world_keyframes[frame] = world;
    }
    Ok(())
}

/// Sub-frame world pose of `clip` at the clock position
///
/// Resolves the current frame and the following one (wrapping to frame 0
/// after the last) and blends them by the clock's sub-frame fraction.
pub fn sample_world_pose(
    clip: &mut AnimationClip,
    playback: &PlaybackState,
) -> Result<Vec<Transform>> {
    let current = playback.current_frame;
    let next = playback.next_frame(clip.frame_count());

    resolve_frame(clip, current)?;
    resolve_frame(clip, next)?;

    Ok(clip
        .bones()
        .iter()
        .map(|bone| {
            interpolate(
                &bone.world_keyframes[current],
                &bone.world_keyframes[next],
                playback.sub_frame,
            )
        })
        .collect())
}

/// Local animated pose (`keyframe ∘ bind`, no parent composition) at a
/// fractional frame position in `[0, frame_count)`
pub fn local_pose_at(clip: &AnimationClip, position: f32) -> Result<Vec<Transform>> {
    let frame_count = clip.frame_count();
    if !position.is_finite() || position < 0.0 || position >= frame_count as f32 {
        return Err(AnimationError::FrameOutOfRange {
            frame: if position.is_finite() && position > 0.0 {
                position as usize
            } else {
                0
            },
            frame_count,
        });
    }

    let current = (position.floor() as usize).min(frame_count - 1);
    let next = (current + 1) % frame_count;
    let t = position - current as f32;

    Ok(clip
        .bones()
        .iter()
        .map(|bone| {
            let a = bone.local_keyframes[current].compose(&bone.local_bind);
            let b = bone.local_keyframes[next].compose(&bone.local_bind);
            interpolate(&a, &b, t)
        })
        .collect())
}
