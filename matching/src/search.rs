use image::GrayImage;

use crate::similarity::iou;
use crate::transform::{apply, translate, Transform};
use crate::{MatchError, Result};

/// Discretized grid of transform parameters explored by [`search`].
///
/// Scale samples are evenly spaced over `[min_scale, max_scale]` inclusive of
/// both ends; angles cover `[0, 360)` in steps of `angle_step_deg`;
/// translations cover `[-translation_range, translation_range]` in steps of
/// `translation_step` along each axis.
///
/// `simplify` collapses scale and rotation sampling to the identity, trading
/// robustness to genuine scale/rotation differences for an order-of-magnitude
/// reduction in evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpace {
    pub min_scale: f32,
    pub max_scale: f32,
    pub scale_steps: usize,
    pub angle_step_deg: f32,
    pub translation_range: i32,
    pub translation_step: i32,
    pub simplify: bool,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.0,
            scale_steps: 10,
            angle_step_deg: 10.0,
            translation_range: 50,
            translation_step: 10,
            simplify: false,
        }
    }
}

impl SearchSpace {
    /// Translation-only search space (scale and rotation fixed at identity).
    pub fn simplified(translation_range: i32, translation_step: i32) -> Self {
        Self {
            translation_range,
            translation_step,
            simplify: true,
            ..Self::default()
        }
    }

    /// Reject misconfigured spaces up front instead of producing silently
    /// wrong results.
    pub fn validate(&self) -> Result<()> {
        if !self.min_scale.is_finite() || !self.max_scale.is_finite() || self.min_scale <= 0.0 {
            return Err(MatchError::InvalidSearchSpace(format!(
                "scale range [{}, {}] must be finite and positive",
                self.min_scale, self.max_scale
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(MatchError::InvalidSearchSpace(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if self.scale_steps == 0 {
            return Err(MatchError::InvalidSearchSpace(
                "scale_steps must be >= 1".to_string(),
            ));
        }
        if !self.angle_step_deg.is_finite() || self.angle_step_deg <= 0.0 {
            return Err(MatchError::InvalidSearchSpace(format!(
                "angle_step_deg {} must be positive",
                self.angle_step_deg
            )));
        }
        if self.translation_range < 0 {
            return Err(MatchError::InvalidSearchSpace(format!(
                "translation_range {} must be non-negative",
                self.translation_range
            )));
        }
        if self.translation_step <= 0 {
            return Err(MatchError::InvalidSearchSpace(format!(
                "translation_step {} must be positive",
                self.translation_step
            )));
        }
        Ok(())
    }

    pub fn scales(&self) -> Vec<f32> {
        if self.simplify {
            return vec![1.0];
        }
        if self.scale_steps == 1 {
            return vec![self.min_scale];
        }
        let span = self.max_scale - self.min_scale;
        (0..self.scale_steps)
            .map(|i| self.min_scale + span * i as f32 / (self.scale_steps - 1) as f32)
            .collect()
    }

    pub fn angles(&self) -> Vec<f32> {
        if self.simplify {
            return vec![0.0];
        }
        let mut out = Vec::new();
        let mut i = 0u32;
        loop {
            let angle = self.angle_step_deg * i as f32;
            if angle >= 360.0 {
                break;
            }
            out.push(angle);
            i += 1;
        }
        out
    }

    pub fn translations(&self) -> Vec<i32> {
        (-self.translation_range..=self.translation_range)
            .step_by(self.translation_step as usize)
            .collect()
    }

    /// Total number of (scale, angle, tx, ty) combinations evaluated.
    pub fn evaluations(&self) -> usize {
        let t = self.translations().len();
        self.scales().len() * self.angles().len() * t * t
    }
}

/// Exhaustively search the transform grid aligning `query` onto `target`,
/// returning the best-scoring transform and its IoU.
///
/// The query is warped once per (scale, angle) pair; translation is applied
/// on top of that intermediate canvas, since it is the cheapest transform.
/// Ties are broken by first-found enumeration order.
pub fn search(query: &GrayImage, target: &GrayImage, space: &SearchSpace) -> Result<(Transform, f64)> {
    space.validate()?;
    assert_eq!(
        query.dimensions(),
        target.dimensions(),
        "canvases of differing size must never be compared"
    );

    let translations = space.translations();
    let mut best_transform = Transform::IDENTITY;
    let mut best_score = 0.0f64;

    for scale in space.scales() {
        for angle_deg in space.angles() {
            let oriented = if scale == 1.0 && angle_deg == 0.0 {
                query.clone()
            } else {
                apply(
                    query,
                    &Transform {
                        scale,
                        angle_deg,
                        tx: 0,
                        ty: 0,
                    },
                )
            };

            for &tx in &translations {
                for &ty in &translations {
                    let moved = translate(&oriented, tx, ty);
                    let score = iou(&moved, target);
                    if score > best_score {
                        best_score = score;
                        best_transform = Transform {
                            scale,
                            angle_deg,
                            tx,
                            ty,
                        };
                        tracing::debug!(
                            scale,
                            angle_deg,
                            tx,
                            ty,
                            score,
                            "new best alignment"
                        );
                    }
                }
            }
        }
    }

    Ok((best_transform, best_score))
}
