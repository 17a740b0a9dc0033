//! Read-only access to the host's skeleton and keyframe data
//!
//! The pipeline queries these traits once, while building its clips.
//! Indices are source indices: helper bones are still counted.

use glam::{Quat, Vec3};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Parent index the source uses for root bones
pub const ROOT_PARENT: i32 = -1;

/// Position and rotation as authored; the source never carries scale
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SourceTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl SourceTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for SourceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Bone hierarchy supplied by the host engine
pub trait SkeletonSource {
    fn bone_count(&self) -> usize;

    fn bone_name(&self, bone: usize) -> Option<&str>;

    /// Parent index of `bone`, [`ROOT_PARENT`] for roots
    fn parent_index(&self, bone: usize) -> Option<i32>;

    /// Local bind pose of `bone`
    fn bind_transform(&self, bone: usize) -> Option<SourceTransform>;
}

/// Per-clip keyframes supplied by the host engine
pub trait KeyframeSource {
    fn frame_count(&self, clip: &str) -> Option<usize>;

    /// Number of bone tracks stored for `clip`
    fn track_count(&self, clip: &str) -> Option<usize>;

    /// Local keyframe of source bone `bone` at `frame`
    fn keyframe(&self, clip: &str, bone: usize, frame: usize) -> Option<SourceTransform>;
}

/// One bone of an [`InMemorySource`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SourceBone {
    pub name: String,
    pub parent: i32,
    pub bind: SourceTransform,
}

/// One clip of an [`InMemorySource`], stored as `tracks[bone][frame]`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SourceClip {
    pub name: String,
    pub frame_count: usize,
    pub tracks: Vec<Vec<SourceTransform>>,
}

impl SourceClip {
    /// Build a clip by sampling `keyframe(bone, frame)` for every track
    pub fn from_fn<F>(
        name: impl Into<String>,
        bone_count: usize,
        frame_count: usize,
        mut keyframe: F,
    ) -> Self
    where
        F: FnMut(usize, usize) -> SourceTransform,
    {
        let tracks = (0..bone_count)
            .map(|bone| (0..frame_count).map(|frame| keyframe(bone, frame)).collect())
            .collect();
        Self {
            name: name.into(),
            frame_count,
            tracks,
        }
    }
}

/// Skeleton and clips held in memory, for tests, tools and demos
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct InMemorySource {
    pub bones: Vec<SourceBone>,
    pub clips: Vec<SourceClip>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone; `parent` is [`ROOT_PARENT`] for a root
    pub fn with_bone(
        mut self,
        name: impl Into<String>,
        parent: i32,
        bind: SourceTransform,
    ) -> Self {
        self.bones.push(SourceBone {
            name: name.into(),
            parent,
            bind,
        });
        self
    }

    pub fn with_clip(mut self, clip: SourceClip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn clip(&self, name: &str) -> Option<&SourceClip> {
        self.clips.iter().find(|clip| clip.name == name)
    }
}

impl SkeletonSource for InMemorySource {
    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn bone_name(&self, bone: usize) -> Option<&str> {
        self.bones.get(bone).map(|b| b.name.as_str())
    }

    fn parent_index(&self, bone: usize) -> Option<i32> {
        self.bones.get(bone).map(|b| b.parent)
    }

    fn bind_transform(&self, bone: usize) -> Option<SourceTransform> {
        self.bones.get(bone).map(|b| b.bind)
    }
}

impl KeyframeSource for InMemorySource {
    fn frame_count(&self, clip: &str) -> Option<usize> {
        self.clip(clip).map(|c| c.frame_count)
    }

    fn track_count(&self, clip: &str) -> Option<usize> {
        self.clip(clip).map(|c| c.tracks.len())
    }

    fn keyframe(&self, clip: &str, bone: usize, frame: usize) -> Option<SourceTransform> {
        self.clip(clip)?.tracks.get(bone)?.get(frame).copied()
    }
}
