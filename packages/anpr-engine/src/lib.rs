pub mod engine;
pub mod fragment;
pub mod region;

pub use engine::{EngineError, Image, PlateDetector, TextRecogniser};
pub use fragment::{Point, TextFragment};
pub use region::{DetectionBox, Region};
