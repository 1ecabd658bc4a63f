use std::sync::Arc;

use ndarray::s;
use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, Image};

/// Axis-aligned detection box `[x_min, y_min, x_max, y_max]` in image pixels.
///
/// Construction guarantees `x_min < x_max` and `y_min < y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct DetectionBox {
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}

impl DetectionBox {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Result<Self, EngineError> {
        if x_min >= x_max || y_min >= y_max {
            return Err(EngineError::InvalidRegion(format!(
                "box [{x_min}, {y_min}, {x_max}, {y_max}] has no area"
            )));
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    pub fn x_min(&self) -> i32 {
        self.x_min
    }

    pub fn y_min(&self) -> i32 {
        self.y_min
    }

    pub fn x_max(&self) -> i32 {
        self.x_max
    }

    pub fn y_max(&self) -> i32 {
        self.y_max
    }

    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    /// Shrinks the box to fit inside a `width` x `height` raster.
    pub fn clamp_to(&self, width: usize, height: usize) -> Result<Self, EngineError> {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Self::new(
            self.x_min.clamp(0, w),
            self.y_min.clamp(0, h),
            self.x_max.clamp(0, w),
            self.y_max.clamp(0, h),
        )
    }

    pub fn to_array(&self) -> [i32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

impl TryFrom<[i32; 4]> for DetectionBox {
    type Error = EngineError;

    fn try_from([x_min, y_min, x_max, y_max]: [i32; 4]) -> Result<Self, Self::Error> {
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl From<DetectionBox> for [i32; 4] {
    fn from(bbox: DetectionBox) -> Self {
        bbox.to_array()
    }
}

/// A detected plate candidate with its own copy of the cropped pixels.
#[derive(Debug, Clone)]
pub struct Region {
    bbox: DetectionBox,
    confidence: f32,
    crop: Arc<Image>,
}

impl Region {
    pub fn new(bbox: DetectionBox, confidence: f32, crop: Image) -> Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(EngineError::InvalidRegion(format!(
                "confidence {confidence} is outside [0, 1]"
            )));
        }
        let (rows, cols, _) = crop.dim();
        if rows as i64 != i64::from(bbox.height()) || cols as i64 != i64::from(bbox.width()) {
            return Err(EngineError::InvalidRegion(format!(
                "crop is {cols}x{rows} but box is {}x{}",
                bbox.width(),
                bbox.height()
            )));
        }
        Ok(Self {
            bbox,
            confidence,
            crop: Arc::new(crop),
        })
    }

    /// Crops `image` to `bbox` after clamping the box to the image bounds.
    ///
    /// The stored box is the clamped one, so it always describes the crop.
    pub fn from_image(image: &Image, bbox: DetectionBox, confidence: f32) -> Result<Self, EngineError> {
        let (rows, cols, _) = image.dim();
        let bbox = bbox.clamp_to(cols, rows)?;
        let crop = image
            .slice(s![
                bbox.y_min() as usize..bbox.y_max() as usize,
                bbox.x_min() as usize..bbox.x_max() as usize,
                ..
            ])
            .to_owned();
        Self::new(bbox, confidence, crop)
    }

    pub fn bbox(&self) -> DetectionBox {
        self.bbox
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn crop(&self) -> &Image {
        &self.crop
    }

    /// Read-only handle to the crop for use from another task.
    pub fn shared_crop(&self) -> Arc<Image> {
        Arc::clone(&self.crop)
    }
}
