use image::{GrayImage, Luma};
use nalgebra::Matrix3;

use crate::raster::FOREGROUND;

/// A similarity transform applied to a comparison canvas: uniform scale and
/// rotation about the canvas center, followed by an integer translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub angle_deg: f32,
    pub tx: i32,
    pub ty: i32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        angle_deg: 0.0,
        tx: 0,
        ty: 0,
    };

    pub fn translation(tx: i32, ty: i32) -> Self {
        Transform {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Forward affine matrix for a canvas of the given dimensions, rotating
    /// and scaling about the canvas center with the translation added on top.
    pub fn matrix(&self, width: u32, height: u32) -> Matrix3<f32> {
        let cx = (width / 2) as f32;
        let cy = (height / 2) as f32;

        let a = self.angle_deg.to_radians();
        let cos_a = self.scale * a.cos();
        let sin_a = self.scale * a.sin();

        let shift_x = cx * (1.0 - cos_a) - cy * sin_a + self.tx as f32;
        let shift_y = cy * (1.0 - cos_a) + cx * sin_a + self.ty as f32;

        Matrix3::new(
            cos_a, sin_a, shift_x, //
            -sin_a, cos_a, shift_y, //
            0.0, 0.0, 1.0,
        )
    }
}

/// Warp a binary canvas by `t`, producing a canvas of the same dimensions.
///
/// Uses inverse mapping with nearest-neighbor sampling so the binary field
/// gains no spurious foreground; pixels mapped from outside the canvas are
/// background. Pure integer translation is lossless.
pub fn apply(canvas: &GrayImage, t: &Transform) -> GrayImage {
    if t.scale == 1.0 && t.angle_deg == 0.0 {
        return translate(canvas, t.tx, t.ty);
    }

    let (width, height) = canvas.dimensions();
    let forward = t.matrix(width, height);
    let inv = match forward.try_inverse() {
        Some(m) => m,
        // Degenerate (scale ~ 0) transform maps everything to a point.
        None => return GrayImage::new(width, height),
    };

    let src = canvas.as_raw();
    let mut dst = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let dx = x as f32;
            let dy = y as f32;
            let sx = inv[(0, 0)] * dx + inv[(0, 1)] * dy + inv[(0, 2)];
            let sy = inv[(1, 0)] * dx + inv[(1, 1)] * dy + inv[(1, 2)];

            let sxi = sx.round() as i32;
            let syi = sy.round() as i32;
            if sxi < 0 || syi < 0 || sxi >= width as i32 || syi >= height as i32 {
                continue;
            }
            if src[syi as usize * width as usize + sxi as usize] > 0 {
                dst.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
    }

    dst
}

/// Shift a canvas by an integer offset; exact, no resampling.
pub fn translate(canvas: &GrayImage, tx: i32, ty: i32) -> GrayImage {
    let (width, height) = canvas.dimensions();
    let mut dst = GrayImage::new(width, height);
    let w = width as i32;
    let h = height as i32;

    let src = canvas.as_raw();
    let out = dst.as_mut();

    for y in 0..h {
        let sy = y - ty;
        if sy < 0 || sy >= h {
            continue;
        }
        // Overlapping x-range of source and destination rows.
        let dst_x0 = tx.clamp(0, w);
        let dst_x1 = (w + tx).clamp(0, w);
        if dst_x0 >= dst_x1 {
            continue;
        }
        let src_x0 = dst_x0 - tx;
        let dst_row = y as usize * width as usize;
        let src_row = sy as usize * width as usize;
        let n = (dst_x1 - dst_x0) as usize;
        out[dst_row + dst_x0 as usize..dst_row + dst_x0 as usize + n]
            .copy_from_slice(&src[src_row + src_x0 as usize..src_row + src_x0 as usize + n]);
    }

    dst
}
