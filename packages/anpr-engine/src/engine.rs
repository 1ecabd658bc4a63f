use async_trait::async_trait;
use ndarray::Array3;
use thiserror::Error;

use crate::fragment::TextFragment;
use crate::region::Region;

/// A decoded raster in height x width x channel layout.
pub type Image = Array3<u8>;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid region: {0}")]
    InvalidRegion(String),
    #[error("inference error: {0}")]
    Inference(String),
}

/// Locates candidate number plates.
///
/// Implementations return exactly one region list per input image, in the
/// order the images were given. A failure applies to the whole batch.
#[async_trait]
pub trait PlateDetector: Send + Sync {
    async fn detect(&self, images: &[Image]) -> Result<Vec<Vec<Region>>, EngineError>;
}

/// Reads text inside a single cropped plate region.
///
/// An empty fragment list means the engine found no text, which is not an
/// error.
#[async_trait]
pub trait TextRecogniser: Send + Sync {
    async fn recognise(&self, crop: &Image) -> Result<Vec<TextFragment>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::DetectionBox;

    struct FullFrameDetector;

    #[async_trait]
    impl PlateDetector for FullFrameDetector {
        async fn detect(&self, images: &[Image]) -> Result<Vec<Vec<Region>>, EngineError> {
            images
                .iter()
                .map(|image| {
                    let (rows, cols, _) = image.dim();
                    let bbox = DetectionBox::new(0, 0, cols as i32, rows as i32)?;
                    Ok(vec![Region::from_image(image, bbox, 1.0)?])
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn detector_returns_one_list_per_image() {
        let images = vec![Image::zeros((4, 6, 3)), Image::zeros((8, 2, 3))];
        let detector: Box<dyn PlateDetector> = Box::new(FullFrameDetector);
        let regions = detector.detect(&images).await.unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0][0].bbox().to_array(), [0, 0, 6, 4]);
        assert_eq!(regions[1][0].crop().dim(), (8, 2, 3));
    }

    #[tokio::test]
    async fn empty_image_surfaces_region_error() {
        let images = vec![Image::zeros((0, 6, 3))];
        let result = FullFrameDetector.detect(&images).await;
        assert!(matches!(result, Err(EngineError::InvalidRegion(_))));
    }
}
