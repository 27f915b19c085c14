//! Construction and teardown of the aligned view stack.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use raster_io::{AlignedView, RasterDriver, ResampleMethod, ScratchStore};
use stack_common::GridDescriptor;

use crate::error::{Result, StackError};

/// Builds the temporal stack of aligned views and owns their teardown.
///
/// The scratch store is injected here: every view's backing resource is
/// provisioned from it at build and removed at release, so an owner (or a
/// test) can account for what is still live.
pub struct AlignmentEngine {
    driver: Arc<dyn RasterDriver>,
    scratch: Arc<dyn ScratchStore>,
    method: ResampleMethod,
}

impl AlignmentEngine {
    /// Engine with the default nearest-neighbor resampling.
    pub fn new(driver: Arc<dyn RasterDriver>, scratch: Arc<dyn ScratchStore>) -> Self {
        Self::with_method(driver, scratch, ResampleMethod::Nearest)
    }

    pub fn with_method(
        driver: Arc<dyn RasterDriver>,
        scratch: Arc<dyn ScratchStore>,
        method: ResampleMethod,
    ) -> Self {
        Self {
            driver,
            scratch,
            method,
        }
    }

    pub fn driver(&self) -> &Arc<dyn RasterDriver> {
        &self.driver
    }

    pub fn scratch(&self) -> &Arc<dyn ScratchStore> {
        &self.scratch
    }

    pub fn method(&self) -> ResampleMethod {
        self.method
    }

    /// Build one aligned view per path, in the given order.
    ///
    /// All-or-nothing: any failure releases the views already built and
    /// aborts, so a partial temporal stack is never returned. Views must
    /// agree on band count; a ragged band dimension could not be stacked
    /// later.
    pub fn build(
        &self,
        target: &GridDescriptor,
        paths: &[PathBuf],
    ) -> Result<Vec<Box<dyn AlignedView>>> {
        let mut views: Vec<Box<dyn AlignedView>> = Vec::with_capacity(paths.len());

        for path in paths {
            match self
                .driver
                .build_aligned_view(path, target, self.method, &self.scratch)
            {
                Ok(view) => {
                    if let Some(first) = views.first() {
                        if view.band_count() != first.band_count() {
                            let message = format!(
                                "'{}' has {} bands where earlier sources have {}",
                                path.display(),
                                view.band_count(),
                                first.band_count()
                            );
                            views.push(view);
                            Self::release_all(&mut views);
                            return Err(StackError::alignment(message));
                        }
                    }
                    views.push(view);
                }
                Err(error) => {
                    Self::release_all(&mut views);
                    return Err(StackError::alignment(format!(
                        "cannot align '{}': {}",
                        path.display(),
                        error
                    )));
                }
            }
        }

        debug!(views = views.len(), method = %self.method, "aligned view stack built");
        Ok(views)
    }

    /// Release every view and drop them. Best-effort: release failures are
    /// logged, never propagated, so teardown cannot crash a caller that is
    /// simply discarding the stack.
    pub fn release_all(views: &mut Vec<Box<dyn AlignedView>>) {
        for view in views.iter_mut() {
            if let Err(error) = view.release() {
                warn!(error = %error, "failed to release aligned view");
            }
        }
        views.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_io::{MemoryDriver, MemoryScratch};
    use stack_common::{BoundingBox, Crs, GridDescriptor, PixelWindow, Resolution};
    use test_utils::ramp_raster;

    fn target() -> GridDescriptor {
        GridDescriptor::from_bounds(
            Crs::new("EPSG:32633"),
            BoundingBox::new(0.0, 0.0, 4.0, 4.0),
            Resolution::new(1.0, 1.0),
        )
        .unwrap()
    }

    fn engine_with(driver: MemoryDriver) -> (AlignmentEngine, Arc<MemoryScratch>) {
        let scratch = Arc::new(MemoryScratch::new());
        let engine = AlignmentEngine::new(Arc::new(driver), scratch.clone());
        (engine, scratch)
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_build_produces_one_view_per_path() {
        let driver = MemoryDriver::new();
        driver.register("/a.tif", ramp_raster("EPSG:32633", 0.0, 4.0, (1.0, 1.0), 1, 4, 4, 0.0));
        driver.register("/b.tif", ramp_raster("EPSG:32633", 0.0, 4.0, (1.0, 1.0), 1, 4, 4, 100.0));

        let (engine, scratch) = engine_with(driver);
        let mut views = engine.build(&target(), &paths(&["/a.tif", "/b.tif"])).unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(scratch.live_count(), 2);

        // Views read independently, in path order.
        let first = views[0].read_window(&PixelWindow::new(0, 0, 1, 1)).unwrap();
        let second = views[1].read_window(&PixelWindow::new(0, 0, 1, 1)).unwrap();
        assert_eq!(first[[0, 0, 0]], 0.0);
        assert_eq!(second[[0, 0, 0]], 100.0);

        AlignmentEngine::release_all(&mut views);
        assert!(views.is_empty());
        assert_eq!(scratch.live_count(), 0);
    }

    #[test]
    fn test_failed_build_releases_partial_stack() {
        let driver = MemoryDriver::new();
        driver.register("/a.tif", ramp_raster("EPSG:32633", 0.0, 4.0, (1.0, 1.0), 1, 4, 4, 0.0));
        // "/missing.tif" is not registered.

        let (engine, scratch) = engine_with(driver);
        let result = engine.build(&target(), &paths(&["/a.tif", "/missing.tif"]));

        assert!(matches!(result, Err(StackError::Alignment(_))));
        assert_eq!(scratch.live_count(), 0);
    }

    #[test]
    fn test_band_count_mismatch_aborts_build() {
        let driver = MemoryDriver::new();
        driver.register("/a.tif", ramp_raster("EPSG:32633", 0.0, 4.0, (1.0, 1.0), 1, 4, 4, 0.0));
        driver.register("/b.tif", ramp_raster("EPSG:32633", 0.0, 4.0, (1.0, 1.0), 3, 4, 4, 0.0));

        let (engine, scratch) = engine_with(driver);
        let result = engine.build(&target(), &paths(&["/a.tif", "/b.tif"]));

        assert!(matches!(result, Err(StackError::Alignment(_))));
        assert_eq!(scratch.live_count(), 0);
    }
}
