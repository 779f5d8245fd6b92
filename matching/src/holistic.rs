use std::sync::atomic::{AtomicBool, Ordering};

use aeroloc_core::ContourSet;
use rayon::prelude::*;

use crate::raster::{rasterize, RasterOptions};
use crate::search::{search, SearchSpace};
use crate::transform::Transform;
use crate::{MatchError, Result};

/// Configuration for one holistic matching call: how contour sets are
/// rendered and which transform grid is explored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchParams {
    pub raster: RasterOptions,
    pub search: SearchSpace,
}

/// Score of one candidate against the query pattern.
///
/// `score` is the best IoU achieved over the transform grid, in [0, 1];
/// `transform` is the parameter set that achieved it. Immutable once emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub index: usize,
    pub score: f64,
    pub transform: Transform,
}

impl MatchResult {
    /// Score on the [0, 100] scale reported to external consumers.
    pub fn score_percent(&self) -> f64 {
        self.score * 100.0
    }

    fn zero(index: usize) -> Self {
        MatchResult {
            index,
            score: 0.0,
            transform: Transform::IDENTITY,
        }
    }
}

/// Ranks candidate contour patterns against a query pattern by the best IoU
/// achievable under the configured transform grid.
///
/// Stateless and independently constructible; owns nothing beyond its
/// parameters and retains no state across calls.
#[derive(Debug, Clone, Default)]
pub struct HolisticMatcher {
    params: MatchParams,
}

impl HolisticMatcher {
    pub fn new(params: MatchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MatchParams {
        &self.params
    }

    /// Score every candidate against `query` and return results sorted by
    /// score descending, ties broken by ascending candidate index.
    ///
    /// Candidates that rasterize to an empty canvas score 0 but stay in the
    /// ranking. An empty query short-circuits: every candidate scores 0 and
    /// no transform search runs.
    pub fn match_sets(
        &self,
        query: &ContourSet,
        candidates: &[ContourSet],
    ) -> Result<Vec<MatchResult>> {
        self.run(query, candidates, None)
    }

    /// As [`match_sets`](Self::match_sets), with a coarse cancellation hook
    /// checked between candidates. A cancelled run returns
    /// [`MatchError::Cancelled`]; a candidate already being evaluated runs to
    /// completion.
    pub fn match_sets_with_cancel(
        &self,
        query: &ContourSet,
        candidates: &[ContourSet],
        cancel: &AtomicBool,
    ) -> Result<Vec<MatchResult>> {
        self.run(query, candidates, Some(cancel))
    }

    fn run(
        &self,
        query: &ContourSet,
        candidates: &[ContourSet],
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<MatchResult>> {
        self.params.search.validate()?;

        if !query.has_points() {
            // No pattern to align: every candidate scores 0, stable index order.
            return Ok((0..candidates.len()).map(MatchResult::zero).collect());
        }

        let query_raster = rasterize(query, &self.params.raster);
        tracing::debug!(
            candidates = candidates.len(),
            evaluations_per_candidate = self.params.search.evaluations(),
            "starting holistic match"
        );

        let mut results: Vec<MatchResult> = candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| {
                if let Some(flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        return Err(MatchError::Cancelled);
                    }
                }

                if !candidate.has_points() {
                    return Ok(MatchResult::zero(index));
                }

                let candidate_raster = rasterize(candidate, &self.params.raster);
                let (transform, score) =
                    search(&query_raster, &candidate_raster, &self.params.search)?;
                tracing::debug!(index, score, "candidate scored");
                Ok(MatchResult {
                    index,
                    score,
                    transform,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.index.cmp(&b.index))
        });

        Ok(results)
    }
}
