//! Reduces the raw fragments read from one plate into a single reading.
use anpr_engine::{Point, TextFragment};
use serde::Serialize;
use tracing::debug;

use crate::geometry::convex_hull;

/// Merged recognition result for one region, still in crop coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedReading {
    pub polygon: Vec<Point>,
    pub text: String,
    pub confidence: f32,
}

/// Keeps only alphanumeric characters, preserving their order.
pub fn clean_text(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Consolidates the fragments recognised in one region.
///
/// Returns `None` when there are no fragments. A single fragment only has its
/// text cleaned. Several fragments are first denoised against the widest one,
/// then merged: hull of the polygons, concatenated text, product of the
/// confidences.
pub fn consolidate(fragments: &[TextFragment]) -> Option<ConsolidatedReading> {
    match fragments {
        [] => None,
        [single] => {
            debug!(text = %single.text, "single fragment, cleaning text");
            Some(ConsolidatedReading {
                polygon: single.polygon.clone(),
                text: clean_text(&single.text),
                confidence: single.confidence,
            })
        }
        _ => {
            let survivors = denoise(fragments);
            debug!(
                fragments = fragments.len(),
                survivors = survivors.len(),
                "merging fragments"
            );
            Some(merge(&survivors))
        }
    }
}

/// Drops fragments shorter than the widest fragment.
///
/// The widest fragment (first one on ties) is the anchor; a fragment survives
/// when its vertical extent is at least the anchor's. The anchor always
/// survives.
pub fn denoise(fragments: &[TextFragment]) -> Vec<&TextFragment> {
    let Some(anchor) = fragments
        .iter()
        .reduce(|widest, f| if f.horizontal_extent() > widest.horizontal_extent() { f } else { widest })
    else {
        return Vec::new();
    };
    let anchor_height = anchor.vertical_extent();

    fragments
        .iter()
        .filter(|f| f.vertical_extent() >= anchor_height)
        .collect()
}

fn merge(survivors: &[&TextFragment]) -> ConsolidatedReading {
    let polygon = match survivors {
        [only] => only.polygon.clone(),
        _ => {
            let vertices: Vec<Point> = survivors.iter().flat_map(|f| f.polygon.iter().copied()).collect();
            convex_hull(&vertices)
        }
    };
    let raw: String = survivors.iter().map(|f| f.text.as_str()).collect();

    ConsolidatedReading {
        polygon,
        text: clean_text(&raw),
        confidence: survivors.iter().map(|f| f.confidence).product(),
    }
}
