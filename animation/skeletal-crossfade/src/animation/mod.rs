//! Skeletal animation core
//!
//! This module provides:
//! - SRT transforms and their composition order
//! - Position/rotation/scale interpolation with shortest-arc slerp
//! - The fixed-rate playback clock and crossfade state
//! - World transform resolution over the bone hierarchy
//! - The discrete crossfade and speed/pose blend strategies
//!
//! # Example
//!
//! ```rust
//! use glam::{Quat, Vec3};
//! use skeletal_crossfade::animation::{interpolate, Transform};
//!
//! let child = Transform::from_translation(Vec3::X);
//! let parent = Transform::from_translation_rotation(Vec3::Z, Quat::from_rotation_z(0.5));
//!
//! let world = child.compose(&parent);
//! let halfway = interpolate(&child, &world, 0.5);
//! assert!(halfway.translation.z > 0.0);
//! ```

pub(crate) mod bone_transform;
pub(crate) mod interpolation;
mod manager;
mod state;
pub(crate) mod types;

pub use bone_transform::{local_pose_at, resolve_bind_pose, resolve_frame, sample_world_pose};
pub use interpolation::{
    SLERP_LINEAR_THRESHOLD, interpolate, inverse_lerp, lerp_vec3, normalize_rotation, slerp,
};
pub use manager::{
    BlendStrategy, ClipPair, DiscreteCrossfade, Pose, PoseSpace, SpeedPoseBlend, strategy_for,
};
pub use state::{BlendState, ClipSlot, PipelineState, PlaybackState};
pub use types::{Lerp, Transform};
