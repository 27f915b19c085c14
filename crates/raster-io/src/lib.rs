//! Raster I/O seam for the raster-stack workspace.
//!
//! The engine never touches pixel formats directly; it talks to a
//! [`RasterDriver`] that opens sources, transforms bounds between
//! reference systems, and builds aligned read-through views on a target
//! grid. Backing temporary resources for those views are provisioned
//! through an injectable [`ScratchStore`], so tests can count live
//! resources and substitute an in-memory store for ambient process temp
//! state.
//!
//! [`MemoryDriver`] is a complete in-memory implementation of the seam:
//! it is what the test suites run against, and it doubles as the
//! executable specification of the collaborator contract.

pub mod driver;
pub mod error;
pub mod memory;
pub mod resample;
pub mod scratch;

pub use driver::{AlignedView, RasterDataset, RasterDriver, ResampleMethod};
pub use error::{RasterIoError, Result};
pub use memory::{LinearTransform, MemoryDriver, MemoryRaster};
pub use scratch::{MemoryScratch, ScratchHandle, ScratchStore, TempScratch};
