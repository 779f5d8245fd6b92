pub mod geometry;
pub mod runtime;

pub use geometry::{BoundingBox, Contour, ContourSet, Point2f};
pub use runtime::{current_cpu_threads, init_global_thread_pool};
