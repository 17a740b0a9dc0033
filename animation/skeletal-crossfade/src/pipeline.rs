//! Per-tick animation pipeline
//!
//! Data flows one way every tick: the blend strategy advances the clock
//! and produces a pose, world-space poses are turned into skinning
//! matrices, and the flattened buffer is handed to the sink.

use crate::animation::{
    BlendStrategy, ClipPair, ClipSlot, PipelineState, Pose, PoseSpace, strategy_for,
};
use crate::config::PipelineConfig;
use crate::error::{AnimationError, Result};
use crate::skeleton::{AnimationClip, Skeleton};
use crate::skinning::{SkinningMatrixGenerator, SkinningSink};
use crate::source::{KeyframeSource, SkeletonSource};

/// Outcome of one [`AnimationPipeline::tick`]
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Clip playing after the tick
    pub active: ClipSlot,
    pub frame: usize,
    pub sub_frame: f32,
    pub transition_progress: f32,
    /// Whether the active clip changed during this tick
    pub switched: bool,
    /// Delta actually applied after clamping
    pub applied_delta: f32,
    pub pose: Pose,
}

impl TickReport {
    pub fn space(&self) -> PoseSpace {
        self.pose.space
    }
}

/// Skeleton, two clips and the crossfade state driving them
#[derive(Debug)]
pub struct AnimationPipeline {
    config: PipelineConfig,
    skeleton: Skeleton,
    clips: ClipPair,
    state: PipelineState,
    strategy: Box<dyn BlendStrategy>,
    skinning: SkinningMatrixGenerator,
}

impl AnimationPipeline {
    /// Build the skeleton and both clips, clip A starting active
    pub fn new<S, K>(
        skeleton_source: &S,
        keyframe_source: &K,
        clip_a: &str,
        clip_b: &str,
        config: PipelineConfig,
    ) -> Result<Self>
    where
        S: SkeletonSource + ?Sized,
        K: KeyframeSource + ?Sized,
    {
        config.validate()?;
        if clip_a == clip_b {
            return Err(AnimationError::DuplicateClip(clip_a.to_string()));
        }

        let skeleton = Skeleton::from_source(skeleton_source, &config.helper_bone_prefix)?;
        let clips = ClipPair::new(
            AnimationClip::from_source(&skeleton, keyframe_source, clip_a)?,
            AnimationClip::from_source(&skeleton, keyframe_source, clip_b)?,
        )?;
        let skinning = SkinningMatrixGenerator::new(skeleton.world_bind())?;
        let state = PipelineState::new(
            config.frame_duration(),
            config.reference_frame_rate,
            config.transition_duration,
        )?;

        log::debug!(
            "Animation pipeline ready: {} bones, '{}' ({} frames) / '{}' ({} frames), {:?}",
            skeleton.bone_count(),
            clip_a,
            clips.get(ClipSlot::A).frame_count(),
            clip_b,
            clips.get(ClipSlot::B).frame_count(),
            config.blend_mode
        );

        Ok(Self {
            strategy: strategy_for(config.blend_mode),
            config,
            skeleton,
            clips,
            state,
            skinning,
        })
    }

    /// Advance by `delta` seconds and feed world poses to `sink`
    pub fn tick<K: SkinningSink + ?Sized>(
        &mut self,
        delta: f32,
        sink: &mut K,
    ) -> Result<TickReport> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(AnimationError::InvalidDelta(delta));
        }

        let delta = match self.config.max_frame_delta {
            Some(max) if delta > max => {
                log::warn!("Frame delta {delta:.4}s exceeds {max:.4}s, clamping");
                max
            }
            _ => delta,
        };

        let before = self.state.blend.active();
        let pose = self
            .strategy
            .advance(&mut self.clips, &mut self.state, delta)?;
        let active = self.state.blend.active();

        if pose.space == PoseSpace::World {
            let bone_count = self.skinning.bone_count();
            let buffer = self.skinning.generate(&pose.transforms)?;
            sink.submit(buffer, bone_count);
        }

        log::trace!(
            "Tick {:.4}s: clip {:?} frame {} sub {:.3} progress {:.3}",
            delta,
            active,
            self.state.playback.current_frame,
            self.state.playback.sub_frame,
            self.state.blend.transition_progress
        );

        Ok(TickReport {
            active,
            frame: self.state.playback.current_frame,
            sub_frame: self.state.playback.sub_frame,
            transition_progress: self.state.blend.transition_progress,
            switched: before != active,
            applied_delta: delta,
            pose,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn clip(&self, slot: ClipSlot) -> &AnimationClip {
        self.clips.get(slot)
    }

    pub fn clip_mut(&mut self, slot: ClipSlot) -> &mut AnimationClip {
        self.clips.get_mut(slot)
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn active_clip(&self) -> &AnimationClip {
        self.clips.get(self.state.blend.active())
    }

    /// Playback length of a clip in seconds
    pub fn clip_duration(&self, slot: ClipSlot) -> f32 {
        self.clips.get(slot).duration(self.state.frame_duration)
    }

    /// Flattened skinning matrices of the last world-space tick
    pub fn skinning_matrices(&self) -> &[f32] {
        self.skinning.buffer()
    }

    pub fn skinning(&self) -> &SkinningMatrixGenerator {
        &self.skinning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlendMode;
    use crate::skinning::NullSink;
    use crate::source::{InMemorySource, ROOT_PARENT, SourceClip, SourceTransform};
    use glam::{Quat, Vec3};

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with_bone("root", ROOT_PARENT, SourceTransform::IDENTITY)
            .with_bone(
                "leg",
                0,
                SourceTransform::new(Vec3::new(0.0, -1.0, 0.0), Quat::IDENTITY),
            )
            .with_clip(SourceClip::from_fn("walk", 2, 3, |_, _| SourceTransform::IDENTITY))
            .with_clip(SourceClip::from_fn("run", 2, 5, |_, _| SourceTransform::IDENTITY))
    }

    #[test]
    fn test_duplicate_slots_rejected() {
        let source = source();
        assert_eq!(
            AnimationPipeline::new(&source, &source, "walk", "walk", PipelineConfig::default())
                .unwrap_err(),
            AnimationError::DuplicateClip("walk".to_string())
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let source = source();
        let config = PipelineConfig::default().with_sample_rate(0.0);
        assert!(AnimationPipeline::new(&source, &source, "walk", "run", config).is_err());
    }

    #[test]
    fn test_tick_submits_world_pose() {
        let source = source();
        let mut pipeline =
            AnimationPipeline::new(&source, &source, "walk", "run", PipelineConfig::default())
                .unwrap();

        let mut submitted = 0;
        let report = pipeline
            .tick(1.0 / 30.0, &mut |buffer: &[f32], count: usize| {
                assert_eq!(buffer.len(), count * 16);
                submitted += 1;
            })
            .unwrap();

        assert_eq!(submitted, 1);
        assert_eq!(report.space(), PoseSpace::World);
        assert_eq!(report.frame, 1);
        assert!(!report.switched);
    }

    #[test]
    fn test_local_pose_not_submitted() {
        let source = source();
        let config = PipelineConfig::default().with_blend_mode(BlendMode::SpeedPoseBlend);
        let mut pipeline = AnimationPipeline::new(&source, &source, "walk", "run", config).unwrap();

        let mut submitted = 0;
        let report = pipeline
            .tick(0.01, &mut |_: &[f32], _: usize| submitted += 1)
            .unwrap();

        assert_eq!(submitted, 0);
        assert_eq!(report.space(), PoseSpace::Local);
        assert_eq!(report.pose.transforms.len(), 2);
    }

    #[test]
    fn test_delta_clamped() {
        let source = source();
        let config = PipelineConfig::default().with_max_frame_delta(Some(0.1));
        let mut pipeline = AnimationPipeline::new(&source, &source, "walk", "run", config).unwrap();

        let report = pipeline.tick(5.0, &mut NullSink).unwrap();
        assert_eq!(report.applied_delta, 0.1);
        assert!((report.transition_progress - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_negative_delta_rejected() {
        let source = source();
        let mut pipeline =
            AnimationPipeline::new(&source, &source, "walk", "run", PipelineConfig::default())
                .unwrap();

        assert_eq!(
            pipeline.tick(-1.0, &mut NullSink).unwrap_err(),
            AnimationError::InvalidDelta(-1.0)
        );
    }

    #[test]
    fn test_clip_duration() {
        let source = source();
        let pipeline =
            AnimationPipeline::new(&source, &source, "walk", "run", PipelineConfig::default())
                .unwrap();

        assert!((pipeline.clip_duration(ClipSlot::A) - 0.1).abs() < 1e-6);
        assert!(
            (pipeline.clip_duration(ClipSlot::B) - 5.0 / 30.0).abs() < 1e-6
        );
    }
}
