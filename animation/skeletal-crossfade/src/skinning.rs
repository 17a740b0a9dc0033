//! Skinning matrix generation
//!
//! Every tick the animated world pose of the active clip is turned into one
//! matrix per bone that maps a vertex from bind space into its animated
//! position:
//!
//! ```text
//! skinning[bone] = to_matrix(animated[bone]) * inverse(to_matrix(world_bind[bone]))
//! ```
//!
//! The matrices are flattened with [`Mat4::to_cols_array`], 16 floats per
//! bone in bone order. Read as rows, each block is the row-vector form of
//! the same matrix.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use skeletal_crossfade::{SkinningMatrixGenerator, Transform};
//!
//! let bind = [Transform::from_translation(Vec3::new(0.0, 1.0, 0.0))];
//! let mut generator = SkinningMatrixGenerator::new(&bind)?;
//!
//! let buffer = generator.generate(&bind)?;
//! assert_eq!(buffer.len(), 16);
//! assert!((buffer[0] - 1.0).abs() < 1e-6);
//! # Ok::<(), skeletal_crossfade::AnimationError>(())
//! ```

use crate::animation::Transform;
use crate::error::{AnimationError, Result};
use glam::Mat4;

/// Floats per flattened matrix
pub const FLOATS_PER_MATRIX: usize = 16;

/// Renderer-side consumer of the flattened skinning matrices
pub trait SkinningSink {
    /// Receive `bone_count` matrices, 16 floats each
    fn submit(&mut self, matrices: &[f32], bone_count: usize);
}

impl<F> SkinningSink for F
where
    F: FnMut(&[f32], usize),
{
    fn submit(&mut self, matrices: &[f32], bone_count: usize) {
        self(matrices, bone_count);
    }
}

/// Sink that drops every buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SkinningSink for NullSink {
    fn submit(&mut self, _matrices: &[f32], _bone_count: usize) {}
}

/// Caches inverse bind matrices and builds the per-tick buffer
#[derive(Debug, Clone)]
pub struct SkinningMatrixGenerator {
    inverse_bind: Vec<Mat4>,
    matrices: Vec<Mat4>,
    buffer: Vec<f32>,
}

impl SkinningMatrixGenerator {
    /// Invert every world bind matrix up front
    ///
    /// A singular bind matrix means corrupt source data and is reported
    /// rather than replaced.
    pub fn new(world_bind: &[Transform]) -> Result<Self> {
        let inverse_bind = world_bind
            .iter()
            .enumerate()
            .map(|(bone, bind)| {
                let matrix = bind.to_matrix();
                let determinant = matrix.determinant();
                if !determinant.is_finite() || determinant.abs() < f32::MIN_POSITIVE {
                    return Err(AnimationError::SingularBindMatrix { bone, determinant });
                }
                Ok(matrix.inverse())
            })
            .collect::<Result<Vec<_>>>()?;

        let bone_count = inverse_bind.len();
        Ok(Self {
            inverse_bind,
            matrices: vec![Mat4::IDENTITY; bone_count],
            buffer: vec![0.0; bone_count * FLOATS_PER_MATRIX],
        })
    }

    pub fn bone_count(&self) -> usize {
        self.inverse_bind.len()
    }

    /// Build the skinning matrices for an animated world pose
    pub fn generate(&mut self, animated: &[Transform]) -> Result<&[f32]> {
        if animated.len() != self.inverse_bind.len() {
            return Err(AnimationError::BoneCountMismatch {
                clip: "animated pose".to_string(),
                expected: self.inverse_bind.len(),
                actual: animated.len(),
            });
        }

        for (bone, (pose, inverse_bind)) in animated.iter().zip(&self.inverse_bind).enumerate() {
            let matrix = pose.to_matrix() * *inverse_bind;
            self.matrices[bone] = matrix;
            self.buffer[bone * FLOATS_PER_MATRIX..(bone + 1) * FLOATS_PER_MATRIX]
                .copy_from_slice(&matrix.to_cols_array());
        }

        Ok(&self.buffer)
    }

    /// Flattened matrices from the last [`generate`](Self::generate) call
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Skinning matrix of one bone from the last call
    pub fn matrix(&self, bone: usize) -> Result<Mat4> {
        self.matrices
            .get(bone)
            .copied()
            .ok_or(AnimationError::BoneOutOfRange {
                bone,
                bone_count: self.matrices.len(),
            })
    }

    pub fn inverse_bind(&self) -> &[Mat4] {
        &self.inverse_bind
    }
}
