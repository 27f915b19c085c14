//! Lazy, tile-wise streaming of a co-registered raster time series.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use ndarray::{stack, Array4, Axis};
use tracing::debug;

use raster_io::{AlignedView, RasterDriver, ScratchStore};
use stack_common::{GridDescriptor, PixelWindow, Tile, TileLayout};

use crate::align::AlignmentEngine;
use crate::catalog::{FileCatalog, ScanOutcome};
use crate::config::LoaderConfig;
use crate::error::{Result, StackError};
use crate::reference::ReferenceResolver;

/// A stacked multi-temporal tile: `(time, band, row, col)`.
pub type TileStack = Array4<f32>;

/// One initialization generation: the immutable snapshot a successful
/// `init` publishes. Reads only ever see a whole generation or none.
struct Generation {
    views: Vec<Box<dyn AlignedView>>,
    layout: TileLayout,
    tiles: Vec<Tile>,
}

/// Orchestrates catalog, reference grid, aligned views, and tile layout
/// into a restartable stream of stacked tiles.
///
/// Lifecycle: catalog files and set (or resolve) a reference, then `init`
/// once; after that, `read_tile` and `iter` serve windowed reads until the
/// catalog or reference changes, which drops the generation and requires
/// another `init`. Memory stays bounded by the tile limit: no read ever
/// materializes more than one tile's window per view.
pub struct LazyLoader {
    config: LoaderConfig,
    engine: AlignmentEngine,
    catalog: FileCatalog,
    reference: Option<GridDescriptor>,
    generation: Option<Generation>,
}

impl LazyLoader {
    /// Create an uninitialized loader.
    pub fn new(
        config: LoaderConfig,
        driver: Arc<dyn RasterDriver>,
        scratch: Arc<dyn ScratchStore>,
    ) -> Result<Self> {
        config.validate().map_err(StackError::Configuration)?;
        let engine = AlignmentEngine::with_method(driver, scratch, config.resample);
        Ok(Self {
            config,
            engine,
            catalog: FileCatalog::new(),
            reference: None,
            generation: None,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// Scan a directory into the catalog using the configured extension
    /// and date format.
    pub fn scan_directory(&mut self, dir: &Path) -> Result<ScanOutcome> {
        let extension = self.config.extension.clone();
        let date_format = self.config.date_format.clone();
        self.scan_directory_with(dir, &extension, &date_format)
    }

    /// Scan a directory into the catalog. Readiness is cleared even when
    /// nothing was added: the scan is a mutation attempt either way.
    pub fn scan_directory_with(
        &mut self,
        dir: &Path,
        extension: &str,
        date_format: &str,
    ) -> Result<ScanOutcome> {
        let outcome = self.catalog.scan_directory(dir, extension, date_format)?;
        self.invalidate();
        Ok(outcome)
    }

    /// Add a single dated file; clears readiness.
    pub fn insert_file(&mut self, date: NaiveDate, path: impl Into<PathBuf>) {
        self.catalog.insert(date, path);
        self.invalidate();
    }

    pub fn reference(&self) -> Option<&GridDescriptor> {
        self.reference.as_ref()
    }

    /// Replace the reference grid with an externally supplied one; clears
    /// readiness.
    pub fn set_reference(&mut self, reference: GridDescriptor) -> Result<()> {
        reference
            .validate()
            .map_err(|e| StackError::configuration(e.to_string()))?;
        self.reference = Some(reference);
        self.invalidate();
        Ok(())
    }

    /// Derive the reference grid from the cataloged files; clears
    /// readiness.
    pub fn resolve_reference(&mut self) -> Result<&GridDescriptor> {
        let resolver = ReferenceResolver::new(Arc::clone(self.engine.driver()));
        let reference = resolver.resolve(&self.catalog.sorted_paths())?;
        self.invalidate();
        Ok(self.reference.insert(reference))
    }

    /// Whether a generation is published and tiles can be read.
    pub fn ready(&self) -> bool {
        self.generation.is_some()
    }

    /// One-time (re)initialization: build aligned views in chronological
    /// order, plan tiles, publish the snapshot.
    ///
    /// Re-entrant: an existing generation is fully released before the
    /// rebuild, so backing resources never accumulate across re-inits. A
    /// failed init leaves the loader unready with no generation.
    pub fn init(&mut self) -> Result<()> {
        let reference = self
            .reference
            .clone()
            .ok_or_else(|| {
                StackError::precondition("init requires a reference grid; set or resolve one first")
            })?;
        if self.catalog.is_empty() {
            return Err(StackError::precondition(
                "init requires a non-empty file catalog",
            ));
        }

        self.invalidate();

        let paths = self.catalog.sorted_paths();
        let views = self.engine.build(&reference, &paths)?;
        let layout = TileLayout::new(reference.shape(), self.config.tile_limit())
            .map_err(|e| StackError::configuration(e.to_string()))?;
        let tiles = layout.tiles();

        debug!(views = views.len(), tiles = tiles.len(), "loader initialized");
        self.generation = Some(Generation {
            views,
            layout,
            tiles,
        });
        Ok(())
    }

    fn generation(&self) -> Result<&Generation> {
        self.generation
            .as_ref()
            .ok_or_else(|| StackError::precondition("loader is not initialized; call init first"))
    }

    /// Tiles in iteration order.
    pub fn tiles(&self) -> Result<&[Tile]> {
        Ok(&self.generation()?.tiles)
    }

    /// The pixel window a tile covers.
    pub fn window(&self, tile: Tile) -> Result<PixelWindow> {
        self.generation()?.layout.window(tile).ok_or_else(|| {
            StackError::precondition(format!(
                "tile ({}, {}) is outside the planned layout",
                tile.x, tile.y
            ))
        })
    }

    /// Read one tile from every aligned view, stacked chronologically as
    /// `(time, band, row, col)`.
    ///
    /// Every view is read with the identical pixel window; that identity
    /// is what alignment guarantees: pixel `(i, j)` of the tile is the
    /// same geographic location at every timestamp.
    pub fn read_tile(&self, tile: Tile) -> Result<TileStack> {
        let generation = self.generation()?;
        let window = generation.layout.window(tile).ok_or_else(|| {
            StackError::precondition(format!(
                "tile ({}, {}) is outside the planned layout",
                tile.x, tile.y
            ))
        })?;

        debug!(
            tile_x = tile.x,
            tile_y = tile.y,
            pixels = window.len(),
            "reading stacked tile"
        );

        let mut slabs = Vec::with_capacity(generation.views.len());
        for view in &generation.views {
            let slab = view
                .read_window(&window)
                .map_err(|e| StackError::alignment(format!("windowed read failed: {}", e)))?;
            slabs.push(slab);
        }

        let slab_views: Vec<_> = slabs.iter().map(|s| s.view()).collect();
        stack(Axis(0), &slab_views)
            .map_err(|e| StackError::alignment(format!("cannot stack tile arrays: {}", e)))
    }

    /// Lazy, restartable iteration over all tiles in planner order.
    ///
    /// Pull-based: no window is read before it is requested, and dropping
    /// the iterator early does no further work. Creating it again replays
    /// the identical sequence without re-initialization.
    pub fn iter(&self) -> Result<TileStacks<'_>> {
        self.generation()?;
        Ok(TileStacks {
            loader: self,
            index: 0,
        })
    }

    /// Explicit teardown: release all aligned views and their backing
    /// resources. Safe to call repeatedly; release failures are logged,
    /// never propagated.
    pub fn close(&mut self) {
        self.invalidate();
    }

    fn invalidate(&mut self) {
        if let Some(mut generation) = self.generation.take() {
            AlignmentEngine::release_all(&mut generation.views);
        }
    }
}

impl Drop for LazyLoader {
    fn drop(&mut self) {
        self.close();
    }
}

/// Iterator of stacked tiles; created by [`LazyLoader::iter`].
pub struct TileStacks<'a> {
    loader: &'a LazyLoader,
    index: usize,
}

impl Iterator for TileStacks<'_> {
    type Item = Result<TileStack>;

    fn next(&mut self) -> Option<Self::Item> {
        let generation = self.loader.generation.as_ref()?;
        let tile = *generation.tiles.get(self.index)?;
        self.index += 1;
        Some(self.loader.read_tile(tile))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .loader
            .generation
            .as_ref()
            .map(|g| g.tiles.len().saturating_sub(self.index))
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileStacks<'_> {}
