//! Drives detection over a batch and recognition over every detected region.
use std::sync::Arc;
use std::time::Duration;

use anpr_engine::{DetectionBox, EngineError, Image, PlateDetector, Region, TextRecogniser};
use ndarray::{Array4, ArrayD, Axis, Ix3, Ix4};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::consolidator::consolidate;
use crate::number_plate::{NumberPlate, PlateReading};
use crate::options::PipelineOptions;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("detection failed: {0}")]
    Detection(#[from] EngineError),
    #[error("detector returned {actual} result lists for {expected} images")]
    DetectionCount { expected: usize, actual: usize },
}

/// Images handed to [`AnprPipeline::run`].
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// A `H x W x C` image or an `N x H x W x C` batch.
    Raster(ArrayD<u8>),
    /// Separately decoded `H x W x C` images.
    Batch(Vec<Image>),
}

impl From<Image> for ImageInput {
    fn from(image: Image) -> Self {
        Self::Raster(image.into_dyn())
    }
}

impl From<Array4<u8>> for ImageInput {
    fn from(batch: Array4<u8>) -> Self {
        Self::Raster(batch.into_dyn())
    }
}

impl From<ArrayD<u8>> for ImageInput {
    fn from(raster: ArrayD<u8>) -> Self {
        Self::Raster(raster)
    }
}

impl From<Vec<Image>> for ImageInput {
    fn from(images: Vec<Image>) -> Self {
        Self::Batch(images)
    }
}

impl ImageInput {
    /// Normalizes the input into a list of well-formed 3-channel images.
    pub fn into_batch(self) -> Result<Vec<Image>, PipelineError> {
        let images = match self {
            Self::Raster(raster) => match raster.ndim() {
                3 => vec![raster.into_dimensionality::<Ix3>().map_err(shape_error)?],
                4 => raster
                    .into_dimensionality::<Ix4>()
                    .map_err(shape_error)?
                    .axis_iter(Axis(0))
                    .map(|image| image.to_owned())
                    .collect(),
                n => {
                    return Err(PipelineError::InvalidInput(format!(
                        "expected an image of dimension 3 or a batch of dimension 4, got dimension {n}"
                    )))
                }
            },
            Self::Batch(images) => images,
        };

        for (idx, image) in images.iter().enumerate() {
            let (rows, cols, channels) = image.dim();
            if rows == 0 || cols == 0 {
                return Err(PipelineError::InvalidInput(format!(
                    "image {idx} is empty ({cols}x{rows})"
                )));
            }
            if channels != 3 {
                return Err(PipelineError::InvalidInput(format!(
                    "image {idx} has {channels} channels, expected 3"
                )));
            }
        }
        Ok(images)
    }
}

fn shape_error(err: ndarray::ShapeError) -> PipelineError {
    PipelineError::InvalidInput(err.to_string())
}

/// What happened when one region went through recognition.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    /// Consolidated reading, already moved into image coordinates.
    Read(PlateReading),
    /// The recogniser ran but produced nothing to consolidate.
    Empty,
    Failed(String),
}

impl RecognitionOutcome {
    pub fn into_reading(self) -> Option<PlateReading> {
        match self {
            Self::Read(reading) => Some(reading),
            Self::Empty | Self::Failed(_) => None,
        }
    }
}

/// Aborts the task when the handle is dropped before completion.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Number plate recognition over injected detection and recognition engines.
///
/// `run` spawns recognition work onto the current tokio runtime. The pipeline
/// holds no per-call state and can be shared between callers.
pub struct AnprPipeline {
    detector: Arc<dyn PlateDetector>,
    recogniser: Arc<dyn TextRecogniser>,
    options: PipelineOptions,
}

impl AnprPipeline {
    pub fn new(detector: Arc<dyn PlateDetector>, recogniser: Arc<dyn TextRecogniser>) -> Self {
        Self::with_options(detector, recogniser, PipelineOptions::default())
    }

    pub fn with_options(
        detector: Arc<dyn PlateDetector>,
        recogniser: Arc<dyn TextRecogniser>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            detector,
            recogniser,
            options,
        }
    }

    /// Detects and reads number plates in one image or a batch.
    ///
    /// The outer list has one entry per image; each inner list has one plate
    /// per detected region, in detection order. Only invalid input and
    /// detection failures are errors. A region whose recognition fails keeps
    /// its detection fields and has no reading.
    pub async fn run(&self, input: impl Into<ImageInput>) -> Result<Vec<Vec<NumberPlate>>, PipelineError> {
        let images = input.into().into_batch()?;
        info!(images = images.len(), "starting number plate recognition");
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let detections = self.detector.detect(&images).await.map_err(|e| {
            warn!(error = %e, "detection failed");
            PipelineError::Detection(e)
        })?;
        if detections.len() != images.len() {
            return Err(PipelineError::DetectionCount {
                expected: images.len(),
                actual: detections.len(),
            });
        }
        drop(images);

        let total: usize = detections.iter().map(Vec::len).sum();
        info!(regions = total, "detection completed");

        let permits = Arc::new(Semaphore::new(self.options.recognition_permits()));
        let pending: Vec<Vec<(Region, AbortOnDrop<RecognitionOutcome>)>> = detections
            .into_iter()
            .map(|regions| {
                regions
                    .into_iter()
                    .map(|region| {
                        let task = self.spawn_recognition(&region, Arc::clone(&permits));
                        (region, task)
                    })
                    .collect()
            })
            .collect();

        let mut results = Vec::with_capacity(pending.len());
        for (image_idx, tasks) in pending.into_iter().enumerate() {
            if tasks.is_empty() {
                debug!(image = image_idx, "no plates detected");
            }
            let mut plates = Vec::with_capacity(tasks.len());
            for (region_idx, (region, mut task)) in tasks.into_iter().enumerate() {
                let outcome = match (&mut task.0).await {
                    Ok(outcome) => outcome,
                    Err(e) => RecognitionOutcome::Failed(format!("recognition task aborted: {e}")),
                };
                log_outcome(image_idx, region_idx, &region, &outcome);
                plates.push(NumberPlate::new(
                    region.bbox(),
                    region.confidence(),
                    outcome.into_reading(),
                ));
            }
            results.push(plates);
        }

        info!(images = results.len(), regions = total, "number plate recognition completed");
        Ok(results)
    }

    fn spawn_recognition(&self, region: &Region, permits: Arc<Semaphore>) -> AbortOnDrop<RecognitionOutcome> {
        let recogniser = Arc::clone(&self.recogniser);
        let bbox = region.bbox();
        let crop = region.shared_crop();
        let timeout = self.options.recognition_timeout();

        AbortOnDrop(tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return RecognitionOutcome::Failed("recognition pool closed".to_string());
            };
            recognise_crop(recogniser.as_ref(), &bbox, &crop, timeout).await
        }))
    }
}

async fn recognise_crop(
    recogniser: &dyn TextRecogniser,
    bbox: &DetectionBox,
    crop: &Image,
    timeout: Option<Duration>,
) -> RecognitionOutcome {
    let call = recogniser.recognise(crop);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => return RecognitionOutcome::Failed(format!("recognition timed out after {limit:?}")),
        },
        None => call.await,
    };

    match result {
        Ok(fragments) => match consolidate(&fragments) {
            Some(reading) => match PlateReading::from_consolidated(bbox, reading) {
                Some(reading) => RecognitionOutcome::Read(reading),
                None => RecognitionOutcome::Failed("reading polygon leaves the image coordinate range".to_string()),
            },
            None => RecognitionOutcome::Empty,
        },
        Err(e) => RecognitionOutcome::Failed(e.to_string()),
    }
}

fn log_outcome(image: usize, region: usize, detection: &Region, outcome: &RecognitionOutcome) {
    let det_box = detection.bbox().to_array();
    match outcome {
        RecognitionOutcome::Read(reading) => info!(
            image,
            region,
            ?det_box,
            text = %reading.text,
            confidence = reading.confidence,
            "plate read"
        ),
        RecognitionOutcome::Empty => debug!(image, region, ?det_box, "no text found on plate"),
        RecognitionOutcome::Failed(reason) => warn!(image, region, ?det_box, %reason, "recognition failed"),
    }
}
