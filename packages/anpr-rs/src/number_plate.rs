use anpr_engine::{DetectionBox, Point};
use serde::{Deserialize, Serialize};

use crate::consolidator::ConsolidatedReading;
use crate::geometry::offset_polygon;

/// Recognition fields of a plate, in image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateReading {
    pub polygon: Vec<Point>,
    pub text: String,
    pub confidence: f32,
}

impl PlateReading {
    /// Moves a crop-space reading into the image space of `det_box`.
    ///
    /// Returns `None` when a vertex cannot be represented after the offset.
    pub fn from_consolidated(det_box: &DetectionBox, reading: ConsolidatedReading) -> Option<Self> {
        Some(Self {
            polygon: offset_polygon(det_box, &reading.polygon)?,
            text: reading.text,
            confidence: reading.confidence,
        })
    }
}

/// Final result for one detected region.
///
/// Serializes as `det_box`, `det_conf` and, when the plate was read,
/// `rec_poly`, `rec_text` and `rec_conf`. The recognition fields are either
/// all present or all absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NumberPlateWire", into = "NumberPlateWire")]
pub struct NumberPlate {
    det_box: DetectionBox,
    det_conf: f32,
    reading: Option<PlateReading>,
}

impl NumberPlate {
    pub fn detection_only(det_box: DetectionBox, det_conf: f32) -> Self {
        Self {
            det_box,
            det_conf,
            reading: None,
        }
    }

    /// Builds a plate from a reading already in image space.
    pub fn new(det_box: DetectionBox, det_conf: f32, reading: Option<PlateReading>) -> Self {
        Self {
            det_box,
            det_conf,
            reading,
        }
    }

    pub fn det_box(&self) -> DetectionBox {
        self.det_box
    }

    pub fn det_conf(&self) -> f32 {
        self.det_conf
    }

    pub fn reading(&self) -> Option<&PlateReading> {
        self.reading.as_ref()
    }

    pub fn is_recognised(&self) -> bool {
        self.reading.is_some()
    }

    pub fn rec_text(&self) -> Option<&str> {
        self.reading.as_ref().map(|r| r.text.as_str())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NumberPlateWire {
    det_box: DetectionBox,
    det_conf: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rec_poly: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rec_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rec_conf: Option<f32>,
}

impl TryFrom<NumberPlateWire> for NumberPlate {
    type Error = String;

    fn try_from(wire: NumberPlateWire) -> Result<Self, Self::Error> {
        let reading = match (wire.rec_poly, wire.rec_text, wire.rec_conf) {
            (Some(polygon), Some(text), Some(confidence)) => Some(PlateReading {
                polygon,
                text,
                confidence,
            }),
            (None, None, None) => None,
            _ => return Err("rec_poly, rec_text and rec_conf must be given together".to_string()),
        };
        Ok(Self {
            det_box: wire.det_box,
            det_conf: wire.det_conf,
            reading,
        })
    }
}

impl From<NumberPlate> for NumberPlateWire {
    fn from(plate: NumberPlate) -> Self {
        let (rec_poly, rec_text, rec_conf) = match plate.reading {
            Some(r) => (Some(r.polygon), Some(r.text), Some(r.confidence)),
            None => (None, None, None),
        };
        Self {
            det_box: plate.det_box,
            det_conf: plate.det_conf,
            rec_poly,
            rec_text,
            rec_conf,
        }
    }
}
