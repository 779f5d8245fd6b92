use image::GrayImage;

/// Foreground overlap statistics for a canvas pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IouStats {
    pub iou: f64,
    pub intersection: u64,
    pub union: u64,
    pub area_a: u64,
    pub area_b: u64,
}

/// Intersection-over-Union of two binary canvases, in [0, 1].
///
/// Empty-vs-empty compares to 0: no foreground carries no evidence and must
/// not be reported as a perfect match. Symmetric in its arguments.
pub fn iou(a: &GrayImage, b: &GrayImage) -> f64 {
    iou_detailed(a, b).iou
}

/// IoU plus the per-canvas foreground areas, for diagnostics.
pub fn iou_detailed(a: &GrayImage, b: &GrayImage) -> IouStats {
    assert_eq!(
        a.dimensions(),
        b.dimensions(),
        "canvases of differing size must never be compared"
    );

    let mut intersection = 0u64;
    let mut union = 0u64;
    let mut area_a = 0u64;
    let mut area_b = 0u64;

    for (&pa, &pb) in a.as_raw().iter().zip(b.as_raw().iter()) {
        let fa = pa > 0;
        let fb = pb > 0;
        area_a += fa as u64;
        area_b += fb as u64;
        intersection += (fa && fb) as u64;
        union += (fa || fb) as u64;
    }

    let iou = if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    };

    IouStats {
        iou,
        intersection,
        union,
        area_a,
        area_b,
    }
}
