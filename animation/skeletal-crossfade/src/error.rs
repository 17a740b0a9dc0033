use thiserror::Error;

/// Error types for skeleton construction and animation playback
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A bone's parent does not precede it in the source order
    #[error("Invalid parent for bone {bone}: parent index {parent} must be -1 or less than {bone}")]
    InvalidParent { bone: usize, parent: i32 },

    /// A visible bone hangs off a helper bone that was excluded
    #[error("Bone '{bone}' has excluded helper bone '{parent}' as its parent")]
    HiddenParent { bone: String, parent: String },

    /// The skeleton has no visible bones
    #[error("Skeleton has no visible bones")]
    EmptySkeleton,

    /// Clip tracks do not line up with the skeleton
    #[error("Clip '{clip}' has {actual} bone tracks, skeleton has {expected}")]
    BoneCountMismatch {
        clip: String,
        expected: usize,
        actual: usize,
    },

    /// Clip with zero frames
    #[error("Clip '{0}' has no frames")]
    EmptyClip(String),

    /// The keyframe source does not know the clip
    #[error("Unknown clip: {0}")]
    UnknownClip(String),

    /// Both pipeline slots name the same clip
    #[error("Clip '{0}' was requested for both crossfade slots")]
    DuplicateClip(String),

    /// The keyframe source returned nothing for a bone/frame pair
    #[error("Missing keyframe in clip '{clip}' for source bone {bone} at frame {frame}")]
    MissingKeyframe {
        clip: String,
        bone: usize,
        frame: usize,
    },

    /// Bind pose matrix cannot be inverted
    #[error("Bind pose matrix of bone {bone} is singular (determinant {determinant})")]
    SingularBindMatrix { bone: usize, determinant: f32 },

    /// Quaternion with zero or non-finite magnitude
    #[error("Degenerate quaternion: {0}")]
    DegenerateQuaternion(String),

    /// Division by a zero (or non-finite) denominator
    #[error("Zero denominator: {0}")]
    ZeroDenominator(String),

    /// Frame index outside of [0, frame_count)
    #[error("Frame {frame} out of range for clip with {frame_count} frames")]
    FrameOutOfRange { frame: usize, frame_count: usize },

    /// Bone index outside of [0, bone_count)
    #[error("Bone {bone} out of range for skeleton with {bone_count} bones")]
    BoneOutOfRange { bone: usize, bone_count: usize },

    /// Host supplied a negative or non-finite delta time
    #[error("Invalid delta time: {0}")]
    InvalidDelta(f32),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type using AnimationError
pub type Result<T> = std::result::Result<T, AnimationError>;
