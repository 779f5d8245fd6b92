use nalgebra::Point2;

pub type Point2f = Point2<f32>;

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn center(&self) -> Point2f {
        Point2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    fn expand(&mut self, p: &Point2f) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    fn from_point(p: &Point2f) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }
}

/// An ordered sequence of 2D points approximating the boundary of a detected
/// shape. Order is significant; closure is inferred by the rasterizer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points: Vec<Point2f>,
}

impl Contour {
    pub fn new(points: Vec<Point2f>) -> Self {
        Self { points }
    }

    pub fn from_pairs(pairs: &[(f32, f32)]) -> Self {
        Self {
            points: pairs.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed polygon area (shoelace), treating the contour as closed.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut acc = 0.0f64;
        for i in 0..n {
            let p0 = &self.points[i];
            let p1 = &self.points[(i + 1) % n];
            acc += p0.x as f64 * p1.y as f64 - p1.x as f64 * p0.y as f64;
        }
        acc.abs() * 0.5
    }

    /// Closed-polygon perimeter.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut acc = 0.0f64;
        for i in 0..n {
            let p0 = &self.points[i];
            let p1 = &self.points[(i + 1) % n];
            let dx = (p1.x - p0.x) as f64;
            let dy = (p1.y - p0.y) as f64;
            acc += (dx * dx + dy * dy).sqrt();
        }
        acc
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut iter = self.points.iter();
        let mut bbox = BoundingBox::from_point(iter.next()?);
        for p in iter {
            bbox.expand(p);
        }
        Some(bbox)
    }
}

/// All contours extracted from one image. An empty set is a valid state: an
/// image with no features above the extraction threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourSet {
    pub contours: Vec<Contour>,
}

impl ContourSet {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// Build from the nested point lists the upstream extractor hands over.
    pub fn from_nested(nested: &[Vec<(f32, f32)>]) -> Self {
        Self {
            contours: nested.iter().map(|c| Contour::from_pairs(c)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// True if at least one contour carries at least one point.
    pub fn has_points(&self) -> bool {
        self.contours.iter().any(|c| !c.is_empty())
    }

    pub fn total_points(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Bounding box over all points of all contours.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut acc: Option<BoundingBox> = None;
        for contour in &self.contours {
            for p in &contour.points {
                match acc.as_mut() {
                    Some(bbox) => bbox.expand(p),
                    None => acc = Some(BoundingBox::from_point(p)),
                }
            }
        }
        acc
    }
}
