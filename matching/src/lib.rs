pub mod descriptor;
pub mod holistic;
pub mod raster;
pub mod search;
pub mod similarity;
pub mod transform;

pub use descriptor::{descriptor_score, descriptor_similarity, ShapeDescriptor};
pub use holistic::{HolisticMatcher, MatchParams, MatchResult};
pub use raster::{rasterize, RasterOptions, FOREGROUND};
pub use search::{search, SearchSpace};
pub use similarity::{iou, iou_detailed, IouStats};
pub use transform::{apply, translate, Transform};

pub type Result<T> = std::result::Result<T, MatchError>;

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Invalid search space: {0}")]
    InvalidSearchSpace(String),

    #[error("Matching cancelled")]
    Cancelled,
}
