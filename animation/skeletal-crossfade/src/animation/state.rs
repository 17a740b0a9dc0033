//! Playback clock and crossfade state
//!
//! All mutable per-pipeline state lives in [`PipelineState`], which is
//! handed to the blend strategy every tick.

use super::interpolation::inverse_lerp;
use crate::error::{AnimationError, Result};

/// Fraction of a frame tolerated as float noise when counting whole frames
const FRAME_EPSILON: f32 = 1e-4;

/// Discrete frame counter driven by host time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    /// Current frame in `[0, frame_count)`
    pub current_frame: usize,
    /// Seconds into the current frame, in `[0, frame_duration)`
    pub accumulated_time: f32,
    /// `accumulated_time / frame_duration`, in `[0, 1)`
    pub sub_frame: f32,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `delta` seconds and return the number of whole
    /// frames crossed
    ///
    /// The frame index wraps to 0 after `frame_count - 1`. A single-frame
    /// clip is a static pose and never leaves frame 0.
    pub fn advance(
        &mut self,
        delta: f32,
        frame_duration: f32,
        frame_count: usize,
    ) -> Result<usize> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(AnimationError::InvalidDelta(delta));
        }
        if frame_count == 0 {
            return Err(AnimationError::ZeroDenominator(
                "cannot advance a clip with zero frames".to_string(),
            ));
        }
        if !frame_duration.is_finite() || frame_duration <= 0.0 {
            return Err(AnimationError::ZeroDenominator(format!(
                "frame duration must be positive, got {frame_duration}"
            )));
        }

        let accumulated = self.accumulated_time + delta;
        let steps = ((accumulated + frame_duration * FRAME_EPSILON) / frame_duration).floor();

        self.accumulated_time = (accumulated - steps * frame_duration).max(0.0);
        let steps = steps as usize;

        if frame_count > 1 {
            self.current_frame = (self.current_frame + steps % frame_count) % frame_count;
        }
        self.sub_frame = inverse_lerp(0.0, frame_duration, self.accumulated_time)?;

        Ok(steps)
    }

    /// Hard cut back to frame 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Frame following the current one, wrapping to 0 at the end of the clip
    pub fn next_frame(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            0
        } else {
            (self.current_frame + 1) % frame_count
        }
    }
}

/// One of the two crossfaded clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipSlot {
    A,
    B,
}

impl ClipSlot {
    /// The slot that is not `self`
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Crossfade state shared by both blend strategies
#[derive(Debug, Clone, PartialEq)]
pub struct BlendState {
    active: ClipSlot,
    /// Ramp value in `[0, 1]`, never reset by a clip switch
    pub transition_progress: f32,
    /// Length of the ramp in seconds
    pub transition_duration: f32,
    /// Set only during the tick in which the active clip changed
    pub is_transitioning: bool,
    /// Normalised loop phase used by the speed/pose blend
    pub phase: f32,
}

impl BlendState {
    /// Start with clip A active and no progress
    pub fn new(transition_duration: f32) -> Result<Self> {
        if !transition_duration.is_finite() || transition_duration <= 0.0 {
            return Err(AnimationError::ZeroDenominator(format!(
                "transition duration must be positive, got {transition_duration}"
            )));
        }
        Ok(Self {
            active: ClipSlot::A,
            transition_progress: 0.0,
            transition_duration,
            is_transitioning: false,
            phase: 0.0,
        })
    }

    pub fn active(&self) -> ClipSlot {
        self.active
    }

    pub fn inactive(&self) -> ClipSlot {
        self.active.other()
    }

    pub fn is_active(&self, slot: ClipSlot) -> bool {
        self.active == slot
    }

    /// Accumulate `delta / transition_duration` into the progress, clamped
    /// to `[0, 1]`
    pub fn advance_progress(&mut self, delta: f32) -> Result<f32> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(AnimationError::InvalidDelta(delta));
        }
        let step = inverse_lerp(0.0, self.transition_duration, delta)?;
        self.transition_progress = (self.transition_progress + step).clamp(0.0, 1.0);
        Ok(self.transition_progress)
    }

    /// Hand playback to the other clip and raise the transition pulse
    pub fn switch(&mut self) -> ClipSlot {
        self.active = self.active.other();
        self.is_transitioning = true;
        self.active
    }

    /// Drop the one-tick transition pulse
    pub fn clear_transition(&mut self) {
        self.is_transitioning = false;
    }
}

/// Everything a blend strategy mutates during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub playback: PlaybackState,
    pub blend: BlendState,
    /// Seconds per keyframe
    pub frame_duration: f32,
    /// Numerator of a clip's loop speed
    pub reference_frame_rate: f32,
}

impl PipelineState {
    pub fn new(
        frame_duration: f32,
        reference_frame_rate: f32,
        transition_duration: f32,
    ) -> Result<Self> {
        if !frame_duration.is_finite() || frame_duration <= 0.0 {
            return Err(AnimationError::ZeroDenominator(format!(
                "frame duration must be positive, got {frame_duration}"
            )));
        }
        Ok(Self {
            playback: PlaybackState::new(),
            blend: BlendState::new(transition_duration)?,
            frame_duration,
            reference_frame_rate,
        })
    }
}
