//! Pipeline configuration
//!
//! All timing constants of the pipeline live here so that hosts can tune
//! them without touching the playback code. The defaults reproduce the
//! walk/run demo: 30 Hz keyframes, a two second crossfade ramp and `ik_`
//! helper bones hidden from the skeleton.

use crate::error::{AnimationError, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Default keyframe sample rate (frames per second)
pub const DEFAULT_SAMPLE_RATE: f32 = 30.0;

/// Default reference rate used to derive clip playback speeds
pub const DEFAULT_REFERENCE_FRAME_RATE: f32 = 30.0;

/// Default crossfade ramp length in seconds
pub const DEFAULT_TRANSITION_DURATION: f32 = 2.0;

/// Default name prefix of helper (IK) bones
pub const DEFAULT_HELPER_BONE_PREFIX: &str = "ik_";

/// Strategy used to combine the two clips every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum BlendMode {
    /// One clip plays its discrete frames at the sample rate and feeds
    /// the skinning matrices; the other clip is dormant until the switch
    #[default]
    DiscreteSwitch,
    /// Both clips are sampled at a shared phase whose speed ramps from
    /// clip A to clip B; produces a local-space pose
    SpeedPoseBlend,
}

/// Configuration for an [`AnimationPipeline`](crate::AnimationPipeline)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Keyframe sample rate in Hz
    pub sample_rate: f32,
    /// Rate divided by a clip's frame count to get its loop speed
    pub reference_frame_rate: f32,
    /// Length of the crossfade ramp in seconds
    pub transition_duration: f32,
    /// Bones whose name starts with this prefix are dropped
    pub helper_bone_prefix: String,
    /// Blend strategy
    pub blend_mode: BlendMode,
    /// Upper bound applied to host deltas (None = unclamped)
    pub max_frame_delta: Option<f32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            reference_frame_rate: DEFAULT_REFERENCE_FRAME_RATE,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            helper_bone_prefix: DEFAULT_HELPER_BONE_PREFIX.to_string(),
            blend_mode: BlendMode::default(),
            max_frame_delta: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_reference_frame_rate(mut self, rate: f32) -> Self {
        self.reference_frame_rate = rate;
        self
    }

    pub fn with_transition_duration(mut self, seconds: f32) -> Self {
        self.transition_duration = seconds;
        self
    }

    pub fn with_helper_bone_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.helper_bone_prefix = prefix.into();
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn with_max_frame_delta(mut self, max_delta: Option<f32>) -> Self {
        self.max_frame_delta = max_delta;
        self
    }

    /// Duration of one keyframe in seconds
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.sample_rate
    }

    /// Check every value that ends up as a denominator
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(AnimationError::ZeroDenominator(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !self.transition_duration.is_finite() || self.transition_duration <= 0.0 {
            return Err(AnimationError::ZeroDenominator(format!(
                "transition duration must be positive, got {}",
                self.transition_duration
            )));
        }
        if !self.reference_frame_rate.is_finite() || self.reference_frame_rate <= 0.0 {
            return Err(AnimationError::InvalidConfig(format!(
                "reference frame rate must be positive, got {}",
                self.reference_frame_rate
            )));
        }
        if let Some(max) = self.max_frame_delta
            && (!max.is_finite() || max <= 0.0)
        {
            return Err(AnimationError::InvalidConfig(format!(
                "max frame delta must be positive, got {max}"
            )));
        }
        Ok(())
    }
}
