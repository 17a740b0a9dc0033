//! Crossfade blend strategies
//!
//! Two strategies drive the pair of clips. [`DiscreteCrossfade`] plays one
//! clip at a time at the fixed sample rate and switches clips when the
//! active one reaches its last frame; its world pose feeds the skinning
//! matrices. [`SpeedPoseBlend`] samples both clips at a shared loop phase
//! whose speed ramps from clip A to clip B and returns a local pose.
//!
//! Both advance the transition progress first, every tick, and never reset
//! it on a switch.

use super::bone_transform::{local_pose_at, sample_world_pose};
use super::state::{ClipSlot, PipelineState};
use super::types::{Lerp, Transform};
use crate::config::BlendMode;
use crate::error::{AnimationError, Result};
use crate::skeleton::AnimationClip;

/// Coordinate space of a [`Pose`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseSpace {
    /// Bone transforms relative to the skeleton root
    World,
    /// Bone transforms relative to their parent
    Local,
}

/// Per-bone transforms produced by one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub space: PoseSpace,
    pub transforms: Vec<Transform>,
}

/// The two crossfaded clips
#[derive(Debug, Clone)]
pub struct ClipPair {
    a: AnimationClip,
    b: AnimationClip,
}

impl ClipPair {
    /// Pair two clips of the same skeleton; clip A starts active
    pub fn new(mut a: AnimationClip, mut b: AnimationClip) -> Result<Self> {
        if a.name() == b.name() {
            return Err(AnimationError::DuplicateClip(a.name().to_string()));
        }
        if a.bone_count() != b.bone_count() {
            return Err(AnimationError::BoneCountMismatch {
                clip: b.name().to_string(),
                expected: a.bone_count(),
                actual: b.bone_count(),
            });
        }
        a.set_active(true);
        b.set_active(false);
        Ok(Self { a, b })
    }

    pub fn get(&self, slot: ClipSlot) -> &AnimationClip {
        match slot {
            ClipSlot::A => &self.a,
            ClipSlot::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, slot: ClipSlot) -> &mut AnimationClip {
        match slot {
            ClipSlot::A => &mut self.a,
            ClipSlot::B => &mut self.b,
        }
    }

    /// Mark `slot` active and the other clip inactive
    fn activate(&mut self, slot: ClipSlot) {
        self.get_mut(slot).set_active(true);
        self.get_mut(slot.other()).set_active(false);
    }

    pub fn bone_count(&self) -> usize {
        self.a.bone_count()
    }

    /// Loop speed of a clip: `reference_frame_rate / frame_count`
    pub fn speed(&self, slot: ClipSlot, reference_frame_rate: f32) -> f32 {
        reference_frame_rate / self.get(slot).frame_count() as f32
    }
}

/// Strategy combining the two clips each tick
pub trait BlendStrategy: std::fmt::Debug {
    fn mode(&self) -> BlendMode;

    /// Advance `state` by `delta` seconds and produce the pose for this tick
    fn advance(&self, clips: &mut ClipPair, state: &mut PipelineState, delta: f32) -> Result<Pose>;
}

/// Single active clip at the fixed sample rate, hard switch at clip end
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteCrossfade;

impl BlendStrategy for DiscreteCrossfade {
    fn mode(&self) -> BlendMode {
        BlendMode::DiscreteSwitch
    }

    fn advance(&self, clips: &mut ClipPair, state: &mut PipelineState, delta: f32) -> Result<Pose> {
        state.blend.advance_progress(delta)?;

        let finishing = state.blend.active();
        let last_frame = clips.get(finishing).frame_count() - 1;
        if state.playback.current_frame >= last_frame {
            let next = state.blend.switch();
            clips.activate(next);
            log::debug!(
                "Switching from '{}' to '{}' (progress {:.3})",
                clips.get(finishing).name(),
                clips.get(next).name(),
                state.blend.transition_progress
            );
        }

        let active = state.blend.active();
        let frame_count = clips.get(active).frame_count();
        state
            .playback
            .advance(delta, state.frame_duration, frame_count)?;

        if state.blend.is_transitioning {
            state.playback.reset();
        }

        let transforms = sample_world_pose(clips.get_mut(active), &state.playback)?;
        state.blend.clear_transition();

        Ok(Pose {
            space: PoseSpace::World,
            transforms,
        })
    }
}

/// Both clips sampled at one loop phase, speed and pose weighted by the
/// transition progress
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedPoseBlend;

impl SpeedPoseBlend {
    /// Frame position of `clip` at normalised `phase`
    fn frame_position(clip: &AnimationClip, phase: f32) -> f32 {
        let position = phase * clip.frame_count() as f32;
        if position >= clip.frame_count() as f32 {
            0.0
        } else {
            position
        }
    }
}

impl BlendStrategy for SpeedPoseBlend {
    fn mode(&self) -> BlendMode {
        BlendMode::SpeedPoseBlend
    }

    fn advance(&self, clips: &mut ClipPair, state: &mut PipelineState, delta: f32) -> Result<Pose> {
        let progress = state.blend.advance_progress(delta)?;

        let speed_a = clips.speed(ClipSlot::A, state.reference_frame_rate);
        let speed_b = clips.speed(ClipSlot::B, state.reference_frame_rate);
        let speed = speed_a.lerp(&speed_b, progress);

        let phase = (state.blend.phase + delta * speed).rem_euclid(1.0);
        state.blend.phase = if phase.is_finite() { phase } else { 0.0 };

        let a = clips.get(ClipSlot::A);
        let b = clips.get(ClipSlot::B);
        let pose_a = local_pose_at(a, Self::frame_position(a, state.blend.phase))?;
        let pose_b = local_pose_at(b, Self::frame_position(b, state.blend.phase))?;

        log::trace!(
            "Speed blend: phase {:.3}, speed {:.3}, progress {:.3}",
            state.blend.phase,
            speed,
            progress
        );

        Ok(Pose {
            space: PoseSpace::Local,
            transforms: pose_a
                .iter()
                .zip(&pose_b)
                .map(|(a, b)| a.lerp(b, progress))
                .collect(),
        })
    }
}

/// Strategy implementing `mode`
pub fn strategy_for(mode: BlendMode) -> Box<dyn BlendStrategy> {
    match mode {
        BlendMode::DiscreteSwitch => Box::new(DiscreteCrossfade),
        BlendMode::SpeedPoseBlend => Box::new(SpeedPoseBlend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Skeleton;
    use crate::source::{InMemorySource, ROOT_PARENT, SourceClip, SourceTransform};
    use glam::{Quat, Vec3};

    const FD: f32 = 1.0 / 30.0;

    /// Single root bone; walk moves along X, run along Y
    fn pair(walk_frames: usize, run_frames: usize) -> ClipPair {
        let source = InMemorySource::new()
            .with_bone("root", ROOT_PARENT, SourceTransform::IDENTITY)
            .with_clip(SourceClip::from_fn("walk", 1, walk_frames, |_, frame| {
                SourceTransform::new(Vec3::new(frame as f32, 0.0, 0.0), Quat::IDENTITY)
            }))
            .with_clip(SourceClip::from_fn("run", 1, run_frames, |_, frame| {
                SourceTransform::new(Vec3::new(0.0, frame as f32, 0.0), Quat::IDENTITY)
            }));
        let skeleton = Skeleton::from_source(&source, "ik_").unwrap();
        ClipPair::new(
            AnimationClip::from_source(&skeleton, &source, "walk").unwrap(),
            AnimationClip::from_source(&skeleton, &source, "run").unwrap(),
        )
        .unwrap()
    }

    fn state() -> PipelineState {
        PipelineState::new(FD, 30.0, 2.0).unwrap()
    }

    #[test]
    fn test_pair_starts_with_a_active() {
        let clips = pair(3, 4);
        assert!(clips.get(ClipSlot::A).is_active());
        assert!(!clips.get(ClipSlot::B).is_active());
    }

    #[test]
    fn test_duplicate_clip_rejected() {
        let clips = pair(3, 4);
        let walk = clips.get(ClipSlot::A).clone();
        assert_eq!(
            ClipPair::new(walk.clone(), walk).unwrap_err(),
            AnimationError::DuplicateClip("walk".to_string())
        );
    }

    #[test]
    fn test_discrete_plays_active_clip() {
        let mut clips = pair(3, 4);
        let mut state = state();

        let pose = DiscreteCrossfade
            .advance(&mut clips, &mut state, FD)
            .unwrap();
        assert_eq!(pose.space, PoseSpace::World);
        assert_eq!(state.playback.current_frame, 1);
        assert!((pose.transforms[0].translation.x - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_discrete_switches_at_last_frame() {
        let mut clips = pair(3, 4);
        let mut state = state();

        DiscreteCrossfade
            .advance(&mut clips, &mut state, FD * 2.0)
            .unwrap();
        assert_eq!(state.playback.current_frame, 2);
        assert_eq!(state.blend.active(), ClipSlot::A);

        let pose = DiscreteCrossfade
            .advance(&mut clips, &mut state, FD)
            .unwrap();
        assert_eq!(state.blend.active(), ClipSlot::B);
        assert!(clips.get(ClipSlot::B).is_active());
        assert!(!clips.get(ClipSlot::A).is_active());
        assert_eq!(state.playback.current_frame, 0);
        assert_eq!(state.playback.accumulated_time, 0.0);
        assert!(!state.blend.is_transitioning);
        assert_eq!(pose.transforms[0].translation, Vec3::ZERO);
    }

    #[test]
    fn test_progress_survives_switch() {
        let mut clips = pair(2, 2);
        let mut state = state();

        for _ in 0..4 {
            DiscreteCrossfade
                .advance(&mut clips, &mut state, 0.25)
                .unwrap();
        }
        assert!((state.blend.transition_progress - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_speed_blend_at_zero_progress_matches_clip_a() {
        let mut clips = pair(3, 6);
        let mut state = state();

        // Walk speed is 10 loops/s; 1/60 s is one sixth of a loop, half a frame
        let pose = SpeedPoseBlend
            .advance(&mut clips, &mut state, 1.0 / 60.0)
            .unwrap();
        assert_eq!(pose.space, PoseSpace::Local);
        assert!((state.blend.phase - 1.0 / 6.0).abs() < 0.01);
        // progress 1/120 pulls a little towards run
        assert!((pose.transforms[0].translation.x - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_speed_blend_full_progress_uses_clip_b_speed() {
        let mut clips = pair(3, 6);
        let mut state = state();
        state.blend.transition_progress = 1.0;

        SpeedPoseBlend
            .advance(&mut clips, &mut state, 0.05)
            .unwrap();
        // Run speed is 5 loops/s
        assert!((state.blend.phase - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_speed_blend_follows_reference_rate() {
        let mut clips = pair(3, 6);
        let mut normal = state();
        let mut doubled = PipelineState::new(FD, 60.0, 2.0).unwrap();

        SpeedPoseBlend
            .advance(&mut clips, &mut normal, 0.01)
            .unwrap();
        SpeedPoseBlend
            .advance(&mut clips, &mut doubled, 0.01)
            .unwrap();

        // Sample rate stays at 30 Hz, only the loop speed doubles
        assert!((normal.blend.phase - 0.1).abs() < 1e-3);
        assert!((doubled.blend.phase / normal.blend.phase - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_speed_blend_phase_wraps() {
        let mut clips = pair(3, 6);
        let mut state = state();

        SpeedPoseBlend
            .advance(&mut clips, &mut state, 0.35)
            .unwrap();
        assert!((0.0..1.0).contains(&state.blend.phase));
    }

    #[test]
    fn test_strategy_for_mode() {
        assert_eq!(
            strategy_for(BlendMode::SpeedPoseBlend).mode(),
            BlendMode::SpeedPoseBlend
        );
        assert_eq!(
            strategy_for(BlendMode::DiscreteSwitch).mode(),
            BlendMode::DiscreteSwitch
        );
    }
}
