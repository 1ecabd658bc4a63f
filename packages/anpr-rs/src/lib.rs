//! # anpr-rs
//!
//! Number plate recognition built from two pluggable stages: a plate detector
//! that finds candidate regions in a batch of images and a text recogniser
//! that reads each region.
//!
//! ## Features
//!
//! - **Pipeline orchestration**: one detection call per batch, concurrent per-region recognition with results kept in detection order
//! - **Fragment consolidation**: noise filtering against the widest fragment, hull-merged geometry, alphanumeric-only text and compounded confidence
//! - **Failure isolation**: a region whose recognition fails, times out or panics keeps its detection fields instead of failing the batch
//! - **Serving shape**: [`NumberPlate`] serializes to the `det_box` / `det_conf` / `rec_*` JSON layout
//!
//! ## Quick Start
//!
//! ```ignore
//! use anpr_rs::prelude::*;
//! use std::sync::Arc;
//!
//! let pipeline = AnprPipeline::new(Arc::new(my_detector), Arc::new(my_recogniser));
//! let plates = pipeline.run(image).await?;
//! for plate in &plates[0] {
//!     println!("{:?}: {:?}", plate.det_box(), plate.rec_text());
//! }
//! ```

pub mod consolidator;
pub mod geometry;
pub mod number_plate;
pub mod options;
pub mod pipeline;

pub use anpr_engine as engine;

// Re-export commonly used types at the root level
pub use anpr_engine::{DetectionBox, EngineError, Image, PlateDetector, Point, Region, TextFragment, TextRecogniser};
pub use consolidator::{clean_text, consolidate, denoise, ConsolidatedReading};
pub use geometry::{convex_hull, offset_polygon};
pub use number_plate::{NumberPlate, PlateReading};
pub use options::PipelineOptions;
pub use pipeline::{AnprPipeline, ImageInput, PipelineError, RecognitionOutcome};

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```ignore
/// use anpr_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        clean_text, consolidate, offset_polygon, AnprPipeline, ConsolidatedReading, DetectionBox, EngineError,
        Image, ImageInput, NumberPlate, PipelineError, PipelineOptions, PlateDetector, PlateReading, Point, Region,
        TextFragment, TextRecogniser,
    };
}
