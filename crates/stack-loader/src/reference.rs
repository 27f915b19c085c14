//! Consensus reference grid resolution over a heterogeneous file set.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use raster_io::RasterDriver;
use stack_common::{BoundingBox, Crs, GridDescriptor};

use crate::error::{Result, StackError};

/// Derives one consensus grid covering the union extent of a set of
/// sources.
///
/// The target projection is the most frequent native projection, ties
/// breaking to the first encountered in iteration order. The resolution is
/// taken from the first source as-is; no resolution negotiation happens
/// across sources. The extent is the union of all source bounds,
/// transformed into the target projection where a source differs.
pub struct ReferenceResolver {
    driver: Arc<dyn RasterDriver>,
}

impl ReferenceResolver {
    pub fn new(driver: Arc<dyn RasterDriver>) -> Self {
        Self { driver }
    }

    /// Resolve a reference grid from the given sources, in order.
    pub fn resolve(&self, paths: &[PathBuf]) -> Result<GridDescriptor> {
        if paths.is_empty() {
            return Err(StackError::configuration(
                "cannot derive a reference grid from an empty source set",
            ));
        }

        // One open per source; the metadata feeds both the projection vote
        // and the bounds union.
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let dataset = self
                .driver
                .open(path)
                .map_err(|e| StackError::path(path, e.to_string()))?;
            sources.push(dataset);
        }

        // Projection vote, counted in encounter order so a tie breaks to
        // the first projection seen.
        let mut votes: Vec<(Crs, usize)> = Vec::new();
        for source in &sources {
            let crs = source.crs();
            match votes.iter_mut().find(|(candidate, _)| *candidate == crs) {
                Some((_, count)) => *count += 1,
                None => votes.push((crs, 1)),
            }
        }
        let mut winner = &votes[0];
        for vote in &votes[1..] {
            if vote.1 > winner.1 {
                winner = vote;
            }
        }
        let target_crs = winner.0.clone();

        // Union of bounds in the target projection.
        let mut union: Option<BoundingBox> = None;
        for (path, source) in paths.iter().zip(&sources) {
            let native = source.bounds();
            let bounds = if source.crs() == target_crs {
                native
            } else {
                self.driver
                    .transform_bounds(&source.crs(), &target_crs, native)
                    .map_err(|e| {
                        StackError::configuration(format!(
                            "cannot transform bounds of '{}': {}",
                            path.display(),
                            e
                        ))
                    })?
            };
            union = Some(match union {
                Some(acc) => acc.union(&bounds),
                None => bounds,
            });
        }
        let Some(bounds) = union else {
            return Err(StackError::configuration(
                "cannot derive a reference grid from an empty source set",
            ));
        };

        // First source is the resolution representative.
        let resolution = sources[0].resolution();

        let descriptor = GridDescriptor::from_bounds(target_crs, bounds, resolution)
            .map_err(|e| StackError::configuration(e.to_string()))?;
        debug!(
            crs = %descriptor.crs,
            width = descriptor.width,
            height = descriptor.height,
            "resolved reference grid"
        );
        Ok(descriptor)
    }
}
