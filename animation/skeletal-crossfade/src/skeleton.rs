//! Skeleton hierarchy and per-clip bone data
//!
//! A [`Skeleton`] is built once from a [`SkeletonSource`]. Helper bones are
//! dropped and the remaining bones are re-indexed densely, so every parent
//! index is smaller than its child's index. Each [`AnimationClip`] owns a
//! copy of that topology together with its keyframes.

use crate::animation::bone_transform::{resolve_bind_pose, resolve_frame};
use crate::animation::interpolation::normalize_rotation;
use crate::animation::types::Transform;
use crate::debug::trimmed_collection_fmt;
use crate::error::{AnimationError, Result};
use crate::source::{KeyframeSource, ROOT_PARENT, SkeletonSource, SourceTransform};
use custom_debug::Debug;
use glam::Vec3;
use std::fmt;

/// A visible bone of the skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonBone {
    pub name: String,
    /// Dense index of the parent, None for roots
    pub parent: Option<usize>,
    /// Index of this bone in the host source
    pub source_index: usize,
    pub local_bind: Transform,
}

/// Bone hierarchy with helper bones removed
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<SkeletonBone>,
    world_bind: Vec<Transform>,
    hidden: Vec<String>,
    source_bone_count: usize,
}

impl Skeleton {
    /// Build the skeleton, skipping every bone whose name starts with
    /// `helper_prefix`
    pub fn from_source<S: SkeletonSource + ?Sized>(
        source: &S,
        helper_prefix: &str,
    ) -> Result<Self> {
        let source_bone_count = source.bone_count();

        let mut remap: Vec<Option<usize>> = Vec::with_capacity(source_bone_count);
        let mut bones = Vec::new();
        let mut hidden = Vec::new();

        for index in 0..source_bone_count {
            let name = source_name(source, index)?;
            let parent = source_parent(source, index)?;

            if !helper_prefix.is_empty() && name.starts_with(helper_prefix) {
                log::debug!("Skipping helper bone '{name}' (source index {index})");
                remap.push(None);
                hidden.push(name.to_string());
                continue;
            }

            let parent = match parent {
                None => None,
                Some(p) => match remap[p] {
                    Some(dense) => Some(dense),
                    None => {
                        return Err(AnimationError::HiddenParent {
                            bone: name.to_string(),
                            parent: source_name(source, p)?.to_string(),
                        });
                    }
                },
            };

            let bind = source
                .bind_transform(index)
                .ok_or(AnimationError::BoneOutOfRange {
                    bone: index,
                    bone_count: source_bone_count,
                })?;

            remap.push(Some(bones.len()));
            bones.push(SkeletonBone {
                name: name.to_string(),
                parent,
                source_index: index,
                local_bind: to_local_transform(bind, name)?,
            });
        }

        if bones.is_empty() {
            return Err(AnimationError::EmptySkeleton);
        }

        log::debug!(
            "Built skeleton with {} bones ({} helper bones skipped)",
            bones.len(),
            hidden.len()
        );

        let world_bind = resolve_bind_pose(&bones)?;
        let skeleton = Self {
            bones,
            world_bind,
            hidden,
            source_bone_count,
        };

        if log::log_enabled!(log::Level::Debug) {
            if let Ok(dump) = Self::source_hierarchy(source) {
                log::debug!("Source bone hierarchy:\n{dump}");
            }
            log::debug!("Skeleton hierarchy:\n{skeleton}");
        }

        Ok(skeleton)
    }

    /// Indented dump of the raw source hierarchy, helper bones included
    pub fn source_hierarchy<S: SkeletonSource + ?Sized>(source: &S) -> Result<String> {
        let count = source.bone_count();
        let mut names = Vec::with_capacity(count);
        let mut parents = Vec::with_capacity(count);
        for index in 0..count {
            names.push(source_name(source, index)?);
            parents.push(source_parent(source, index)?);
        }

        let mut out = String::new();
        write_tree(&mut out, &names, &parents).map_err(|_| {
            AnimationError::InvalidConfig("failed to format bone hierarchy".to_string())
        })?;
        Ok(out)
    }

    pub fn bones(&self) -> &[SkeletonBone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Result<&SkeletonBone> {
        self.bones.get(index).ok_or(AnimationError::BoneOutOfRange {
            bone: index,
            bone_count: self.bones.len(),
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Number of bones in the source, helper bones included
    pub fn source_bone_count(&self) -> usize {
        self.source_bone_count
    }

    /// Names of the helper bones that were dropped
    pub fn hidden_bones(&self) -> &[String] {
        &self.hidden
    }

    /// World-space bind pose, one entry per visible bone
    pub fn world_bind(&self) -> &[Transform] {
        &self.world_bind
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.bones.iter().map(|b| b.name.as_str()).collect();
        let parents: Vec<Option<usize>> = self.bones.iter().map(|b| b.parent).collect();
        write_tree(f, &names, &parents)
    }
}

/// One line per bone, two spaces of indent per level, children in index
/// order below their parent
fn write_tree<W: fmt::Write>(
    out: &mut W,
    names: &[&str],
    parents: &[Option<usize>],
) -> fmt::Result {
    let mut children = vec![Vec::new(); names.len()];
    let mut roots = Vec::new();
    for (index, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(index),
            None => roots.push(index),
        }
    }

    let mut stack: Vec<(usize, usize)> = roots.into_iter().rev().map(|r| (r, 0)).collect();
    while let Some((index, depth)) = stack.pop() {
        writeln!(out, "{}{}", "  ".repeat(depth), names[index])?;
        stack.extend(children[index].iter().rev().map(|&c| (c, depth + 1)));
    }
    Ok(())
}

fn source_name<S: SkeletonSource + ?Sized>(source: &S, index: usize) -> Result<&str> {
    source.bone_name(index).ok_or(AnimationError::BoneOutOfRange {
        bone: index,
        bone_count: source.bone_count(),
    })
}

/// Parent of a source bone, checked against the parent-before-child order
fn source_parent<S: SkeletonSource + ?Sized>(source: &S, index: usize) -> Result<Option<usize>> {
    let parent = source
        .parent_index(index)
        .ok_or(AnimationError::BoneOutOfRange {
            bone: index,
            bone_count: source.bone_count(),
        })?;

    if parent == ROOT_PARENT {
        return Ok(None);
    }
    match usize::try_from(parent) {
        Ok(p) if p < index => Ok(Some(p)),
        _ => Err(AnimationError::InvalidParent {
            bone: index,
            parent,
        }),
    }
}

/// Unit-scale transform with a normalised rotation
fn to_local_transform(pose: SourceTransform, context: &str) -> Result<Transform> {
    let rotation = normalize_rotation(pose.rotation).map_err(|e| match e {
        AnimationError::DegenerateQuaternion(detail) => {
            AnimationError::DegenerateQuaternion(format!("{context}: {detail}"))
        }
        other => other,
    })?;
    Ok(Transform::from_translation_rotation(pose.position, rotation))
}

/// A bone as seen by one clip: topology, bind pose and keyframes
#[derive(Debug, Clone)]
pub struct Bone {
    pub index: usize,
    pub name: String,
    pub parent: Option<usize>,
    pub local_bind: Transform,
    pub world_bind: Transform,
    #[debug(with = trimmed_collection_fmt)]
    pub local_keyframes: Vec<Transform>,
    /// Resolved world transforms, refreshed by the resolver per frame
    #[debug(with = trimmed_collection_fmt)]
    pub world_keyframes: Vec<Transform>,
}

/// A named, looping sequence of per-bone keyframes
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    frame_count: usize,
    bones: Vec<Bone>,
    is_active: bool,
}

impl AnimationClip {
    /// Load clip `name` for every visible bone of `skeleton`
    pub fn from_source<K: KeyframeSource + ?Sized>(
        skeleton: &Skeleton,
        source: &K,
        name: &str,
    ) -> Result<Self> {
        let frame_count = source
            .frame_count(name)
            .ok_or_else(|| AnimationError::UnknownClip(name.to_string()))?;
        if frame_count == 0 {
            return Err(AnimationError::EmptyClip(name.to_string()));
        }

        let tracks = source
            .track_count(name)
            .ok_or_else(|| AnimationError::UnknownClip(name.to_string()))?;
        if tracks != skeleton.source_bone_count() {
            return Err(AnimationError::BoneCountMismatch {
                clip: name.to_string(),
                expected: skeleton.source_bone_count(),
                actual: tracks,
            });
        }

        let mut bones = Vec::with_capacity(skeleton.bone_count());
        for (index, bone) in skeleton.bones().iter().enumerate() {
            let mut local_keyframes = Vec::with_capacity(frame_count);
            for frame in 0..frame_count {
                let key = source.keyframe(name, bone.source_index, frame).ok_or_else(|| {
                    AnimationError::MissingKeyframe {
                        clip: name.to_string(),
                        bone: bone.source_index,
                        frame,
                    }
                })?;
                local_keyframes.push(to_local_transform(
                    key,
                    &format!("{name}/{}/{frame}", bone.name),
                )?);
            }

            bones.push(Bone {
                index,
                name: bone.name.clone(),
                parent: bone.parent,
                local_bind: bone.local_bind,
                world_bind: skeleton.world_bind()[index],
                local_keyframes,
                world_keyframes: vec![Transform::IDENTITY; frame_count],
            });
        }

        log::debug!(
            "Loaded clip '{}': {} frames, {} bones",
            name,
            frame_count,
            bones.len()
        );

        Ok(Self {
            name: name.to_string(),
            frame_count,
            bones,
            is_active: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub(crate) fn bones_mut(&mut self) -> &mut [Bone] {
        &mut self.bones
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Playback length in seconds at the given frame duration
    pub fn duration(&self, frame_duration: f32) -> f32 {
        self.frame_count as f32 * frame_duration
    }

    pub fn bone(&self, index: usize) -> Result<&Bone> {
        self.bones.get(index).ok_or(AnimationError::BoneOutOfRange {
            bone: index,
            bone_count: self.bones.len(),
        })
    }

    pub fn check_frame(&self, frame: usize) -> Result<()> {
        if frame < self.frame_count {
            Ok(())
        } else {
            Err(AnimationError::FrameOutOfRange {
                frame,
                frame_count: self.frame_count,
            })
        }
    }

    pub fn local_keyframe(&self, bone: usize, frame: usize) -> Result<Transform> {
        self.check_frame(frame)?;
        Ok(self.bone(bone)?.local_keyframes[frame])
    }

    /// Last resolved world transform of `bone` at `frame`
    pub fn world_keyframe(&self, bone: usize, frame: usize) -> Result<Transform> {
        self.check_frame(frame)?;
        Ok(self.bone(bone)?.world_keyframes[frame])
    }

    /// Resolve `frame` and return `(child, parent)` world positions for
    /// every bone that has a parent
    pub fn bone_segments(&mut self, frame: usize) -> Result<Vec<(Vec3, Vec3)>> {
        resolve_frame(self, frame)?;
        Ok(self
            .bones
            .iter()
            .filter_map(|bone| {
                bone.parent.map(|p| {
                    (
                        bone.world_keyframes[frame].translation,
                        self.bones[p].world_keyframes[frame].translation,
                    )
                })
            })
            .collect())
    }
}
