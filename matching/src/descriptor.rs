use aeroloc_core::{Contour, ContourSet};

/// Weighted contribution of each descriptor component to the pairwise
/// similarity score.
const W_AREA: f64 = 0.3;
const W_PERIMETER: f64 = 0.3;
const W_CIRCULARITY: f64 = 0.2;
const W_MOMENTS: f64 = 0.2;

/// Per-contour shape summary: area, perimeter, circularity and the seven Hu
/// moment invariants (log-transformed, sign-preserved). Invariant to
/// translation, rotation and uniform scale in the moment components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDescriptor {
    pub area: f64,
    pub perimeter: f64,
    pub circularity: f64,
    pub hu: [f64; 7],
}

impl ShapeDescriptor {
    /// Descriptor of a degenerate (zero-area) contour.
    pub const ZERO: ShapeDescriptor = ShapeDescriptor {
        area: 0.0,
        perimeter: 0.0,
        circularity: 0.0,
        hu: [0.0; 7],
    };

    pub fn from_contour(contour: &Contour) -> Self {
        let Some(m) = Moments::of_polygon(contour) else {
            return Self::ZERO;
        };

        let area = m.m00.abs();
        let perimeter = contour.perimeter();
        let circularity = if perimeter > 0.0 {
            4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
        } else {
            0.0
        };

        ShapeDescriptor {
            area,
            perimeter,
            circularity,
            hu: m.hu_log(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.area == 0.0
    }
}

/// Similarity of two shape descriptors in [0, 1].
///
/// Two degenerate contours are "no shape" vs "no shape" and compare as 1 by
/// convention; degenerate vs non-degenerate is 0.
pub fn descriptor_similarity(a: &ShapeDescriptor, b: &ShapeDescriptor) -> f64 {
    match (a.is_degenerate(), b.is_degenerate()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let area_ratio = a.area.min(b.area) / a.area.max(b.area);
    let perimeter_ratio = if a.perimeter.max(b.perimeter) > 0.0 {
        a.perimeter.min(b.perimeter) / a.perimeter.max(b.perimeter)
    } else {
        0.0
    };
    let circularity_similarity = 1.0 - (a.circularity - b.circularity).abs().min(1.0);

    let hu_distance: f64 = a
        .hu
        .iter()
        .zip(b.hu.iter())
        .map(|(x, y)| (x - y).abs())
        .sum();
    let hu_similarity = 1.0 / (1.0 + hu_distance);

    W_AREA * area_ratio
        + W_PERIMETER * perimeter_ratio
        + W_CIRCULARITY * circularity_similarity
        + W_MOMENTS * hu_similarity
}

/// Descriptor-based fallback score between two contour sets, in [0, 1].
///
/// For every query contour the best-matching candidate contour is found; the
/// overall score is the mean of those per-contour maxima.
pub fn descriptor_score(query: &ContourSet, candidate: &ContourSet) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let candidate_descriptors: Vec<ShapeDescriptor> = candidate
        .contours
        .iter()
        .map(ShapeDescriptor::from_contour)
        .collect();

    let mut total = 0.0f64;
    for contour in &query.contours {
        let desc = ShapeDescriptor::from_contour(contour);
        let best = candidate_descriptors
            .iter()
            .map(|cd| descriptor_similarity(&desc, cd))
            .fold(0.0f64, f64::max);
        total += best;
    }

    total / query.contours.len() as f64
}

/// Polygon moments up to order 3 via Green's theorem, with the closing edge
/// implied. Signed: counter-clockwise vertex order gives negative m00 in
/// image coordinates.
struct Moments {
    m00: f64,
    m10: f64,
    m01: f64,
    m20: f64,
    m11: f64,
    m02: f64,
    m30: f64,
    m21: f64,
    m12: f64,
    m03: f64,
}

impl Moments {
    fn of_polygon(contour: &Contour) -> Option<Moments> {
        let n = contour.points.len();
        if n < 3 {
            return None;
        }

        let mut m = Moments {
            m00: 0.0,
            m10: 0.0,
            m01: 0.0,
            m20: 0.0,
            m11: 0.0,
            m02: 0.0,
            m30: 0.0,
            m21: 0.0,
            m12: 0.0,
            m03: 0.0,
        };

        for i in 0..n {
            let p0 = &contour.points[i];
            let p1 = &contour.points[(i + 1) % n];
            let (x0, y0) = (p0.x as f64, p0.y as f64);
            let (x1, y1) = (p1.x as f64, p1.y as f64);
            let a = x0 * y1 - x1 * y0;

            m.m00 += a;
            m.m10 += a * (x0 + x1);
            m.m01 += a * (y0 + y1);
            m.m20 += a * (x0 * x0 + x0 * x1 + x1 * x1);
            m.m11 += a * (2.0 * x0 * y0 + x0 * y1 + x1 * y0 + 2.0 * x1 * y1);
            m.m02 += a * (y0 * y0 + y0 * y1 + y1 * y1);
            m.m30 += a * (x0 * x0 * x0 + x0 * x0 * x1 + x0 * x1 * x1 + x1 * x1 * x1);
            m.m21 += a
                * (x0 * x0 * (3.0 * y0 + y1)
                    + 2.0 * x0 * x1 * (y0 + y1)
                    + x1 * x1 * (y0 + 3.0 * y1));
            m.m12 += a
                * (y0 * y0 * (3.0 * x0 + x1)
                    + 2.0 * y0 * y1 * (x0 + x1)
                    + y1 * y1 * (x0 + 3.0 * x1));
            m.m03 += a * (y0 * y0 * y0 + y0 * y0 * y1 + y0 * y1 * y1 + y1 * y1 * y1);
        }

        m.m00 /= 2.0;
        m.m10 /= 6.0;
        m.m01 /= 6.0;
        m.m20 /= 12.0;
        m.m11 /= 24.0;
        m.m02 /= 12.0;
        m.m30 /= 20.0;
        m.m21 /= 60.0;
        m.m12 /= 60.0;
        m.m03 /= 20.0;

        if m.m00.abs() < f64::EPSILON {
            return None;
        }
        Some(m)
    }

    /// Hu moment invariants, log-transformed with sign preserved
    /// (`-sign(h) * log10(|h|)`, with 0 kept as 0).
    fn hu_log(&self) -> [f64; 7] {
        let cx = self.m10 / self.m00;
        let cy = self.m01 / self.m00;

        // Central moments.
        let mu20 = self.m20 - cx * self.m10;
        let mu02 = self.m02 - cy * self.m01;
        let mu11 = self.m11 - cx * self.m01;
        let mu30 = self.m30 - 3.0 * cx * self.m20 + 2.0 * cx * cx * self.m10;
        let mu21 = self.m21 - 2.0 * cx * self.m11 - cy * self.m20 + 2.0 * cx * cx * self.m01;
        let mu12 = self.m12 - 2.0 * cy * self.m11 - cx * self.m02 + 2.0 * cy * cy * self.m10;
        let mu03 = self.m03 - 3.0 * cy * self.m02 + 2.0 * cy * cy * self.m01;

        // Scale-normalized central moments.
        let norm = self.m00.abs();
        let n2 = norm * norm;
        let n25 = norm.powf(2.5);
        let eta20 = mu20 / n2;
        let eta02 = mu02 / n2;
        let eta11 = mu11 / n2;
        let eta30 = mu30 / n25;
        let eta21 = mu21 / n25;
        let eta12 = mu12 / n25;
        let eta03 = mu03 / n25;

        let s30_12 = eta30 + eta12;
        let s21_03 = eta21 + eta03;
        let d30_12 = eta30 - 3.0 * eta12;
        let d21_03 = 3.0 * eta21 - eta03;

        let h = [
            eta20 + eta02,
            (eta20 - eta02).powi(2) + 4.0 * eta11 * eta11,
            d30_12 * d30_12 + d21_03 * d21_03,
            s30_12 * s30_12 + s21_03 * s21_03,
            d30_12 * s30_12 * (s30_12 * s30_12 - 3.0 * s21_03 * s21_03)
                + d21_03 * s21_03 * (3.0 * s30_12 * s30_12 - s21_03 * s21_03),
            (eta20 - eta02) * (s30_12 * s30_12 - s21_03 * s21_03)
                + 4.0 * eta11 * s30_12 * s21_03,
            d21_03 * s30_12 * (s30_12 * s30_12 - 3.0 * s21_03 * s21_03)
                - d30_12 * s21_03 * (3.0 * s30_12 * s30_12 - s21_03 * s21_03),
        ];

        // Invariants that are zero up to floating-point noise stay zero;
        // feeding them to log10 would turn rounding error into large values.
        const ZERO_EPS: f64 = 1e-10;

        let mut out = [0.0f64; 7];
        for (dst, &hv) in out.iter_mut().zip(h.iter()) {
            if hv.abs() > ZERO_EPS {
                *dst = -hv.signum() * hv.abs().log10();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, side: f32) -> Contour {
        Contour::from_pairs(&[
            (x0, y0),
            (x0 + side, y0),
            (x0 + side, y0 + side),
            (x0, y0 + side),
        ])
    }

    fn scaled(contour: &Contour, factor: f32) -> Contour {
        Contour::new(
            contour
                .points
                .iter()
                .map(|p| nalgebra::Point2::new(p.x * factor, p.y * factor))
                .collect(),
        )
    }

    #[test]
    fn square_descriptor_has_known_circularity() {
        let desc = ShapeDescriptor::from_contour(&square(0.0, 0.0, 100.0));
        assert!((desc.area - 10_000.0).abs() < 1e-6);
        assert!((desc.perimeter - 400.0).abs() < 1e-6);
        // 4*pi*a / p^2 = pi/4 for any square.
        assert!((desc.circularity - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn degenerate_contour_yields_zero_descriptor() {
        let line = Contour::from_pairs(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(ShapeDescriptor::from_contour(&line), ShapeDescriptor::ZERO);
        assert_eq!(
            ShapeDescriptor::from_contour(&Contour::default()),
            ShapeDescriptor::ZERO
        );
    }

    #[test]
    fn self_similarity_is_one() {
        let desc = ShapeDescriptor::from_contour(&square(5.0, 5.0, 40.0));
        assert!((descriptor_similarity(&desc, &desc) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_pair_convention() {
        let deg = ShapeDescriptor::ZERO;
        let solid = ShapeDescriptor::from_contour(&square(0.0, 0.0, 10.0));
        assert_eq!(descriptor_similarity(&deg, &deg), 1.0);
        assert_eq!(descriptor_similarity(&deg, &solid), 0.0);
        assert_eq!(descriptor_similarity(&solid, &deg), 0.0);
    }

    #[test]
    fn hu_moments_are_translation_invariant() {
        let a = ShapeDescriptor::from_contour(&square(0.0, 0.0, 50.0));
        let b = ShapeDescriptor::from_contour(&square(200.0, 300.0, 50.0));
        for (x, y) in a.hu.iter().zip(b.hu.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn hu_moments_are_scale_invariant() {
        let base = square(10.0, 20.0, 30.0);
        let a = ShapeDescriptor::from_contour(&base);
        let b = ShapeDescriptor::from_contour(&scaled(&base, 3.5));

        // Raw area/perimeter change; the moment vector must not.
        assert!(b.area > a.area);
        for (x, y) in a.hu.iter().zip(b.hu.iter()) {
            assert!((x - y).abs() < 1e-6, "hu {x} vs {y}");
        }
    }

    #[test]
    fn hu_moments_are_rotation_invariant() {
        let base = Contour::from_pairs(&[(0.0, 0.0), (40.0, 0.0), (40.0, 20.0), (0.0, 20.0)]);
        let angle = 37.0f32.to_radians();
        let (sin, cos) = angle.sin_cos();
        let rotated = Contour::new(
            base.points
                .iter()
                .map(|p| nalgebra::Point2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos))
                .collect(),
        );

        let a = ShapeDescriptor::from_contour(&base);
        let b = ShapeDescriptor::from_contour(&rotated);
        for (x, y) in a.hu.iter().zip(b.hu.iter()) {
            assert!((x - y).abs() < 1e-4, "hu {x} vs {y}");
        }
    }

    #[test]
    fn matching_shapes_outscore_dissimilar_ones() {
        let query = ContourSet::new(vec![square(0.0, 0.0, 50.0)]);
        let same = ContourSet::new(vec![square(100.0, 100.0, 50.0)]);
        let other = ContourSet::new(vec![Contour::from_pairs(&[
            (0.0, 0.0),
            (200.0, 0.0),
            (200.0, 5.0),
            (0.0, 5.0),
        ])]);

        let score_same = descriptor_score(&query, &same);
        let score_other = descriptor_score(&query, &other);
        assert!(score_same > score_other);
        assert!((score_same - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_sets_score_zero() {
        let set = ContourSet::new(vec![square(0.0, 0.0, 10.0)]);
        assert_eq!(descriptor_score(&ContourSet::default(), &set), 0.0);
        assert_eq!(descriptor_score(&set, &ContourSet::default()), 0.0);
    }
}
