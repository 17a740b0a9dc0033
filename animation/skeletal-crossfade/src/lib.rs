//! Skeletal animation playback with a timed two-clip crossfade.
//!
//! The pipeline advances a fixed-rate playback clock, resolves per-bone
//! world transforms through the parent chain, switches between two looping
//! clips and emits one skinning matrix per visible bone every tick.
//!
//! # Example
//!
//! ```rust
//! use glam::{Quat, Vec3};
//! use skeletal_crossfade::{
//!     AnimationPipeline, InMemorySource, PipelineConfig, SourceClip, SourceTransform,
//!     source::ROOT_PARENT,
//! };
//!
//! let source = InMemorySource::new()
//!     .with_bone("root", ROOT_PARENT, SourceTransform::IDENTITY)
//!     .with_clip(SourceClip::from_fn("walk", 1, 4, |_, f| {
//!         SourceTransform::new(Vec3::new(f as f32, 0.0, 0.0), Quat::IDENTITY)
//!     }))
//!     .with_clip(SourceClip::from_fn("run", 1, 2, |_, _| SourceTransform::IDENTITY));
//!
//! let mut pipeline =
//!     AnimationPipeline::new(&source, &source, "walk", "run", PipelineConfig::default())?;
//!
//! let mut frames = 0;
//! pipeline.tick(1.0 / 30.0, &mut |matrices: &[f32], bones: usize| {
//!     assert_eq!(matrices.len(), bones * 16);
//!     frames += 1;
//! })?;
//! assert_eq!(frames, 1);
//! # Ok::<(), skeletal_crossfade::AnimationError>(())
//! ```

pub mod animation;
pub mod config;
pub mod debug;
pub mod error;
pub mod pipeline;
pub mod skeleton;
pub mod skinning;
pub mod source;

pub use animation::{BlendStrategy, ClipSlot, Pose, PoseSpace, Transform};
pub use config::{BlendMode, PipelineConfig};
pub use error::{AnimationError, Result};
pub use pipeline::{AnimationPipeline, TickReport};
pub use skeleton::{AnimationClip, Bone, Skeleton, SkeletonBone};
pub use skinning::{NullSink, SkinningMatrixGenerator, SkinningSink};
pub use source::{InMemorySource, KeyframeSource, SkeletonSource, SourceClip, SourceTransform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
