use serde::{Deserialize, Serialize};

/// Integer pixel coordinate, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// One raw unit of recognition output, in the coordinate space of the crop
/// it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub polygon: Vec<Point>,
    pub text: String,
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(polygon: Vec<Point>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }

    /// `max x - min x` over the polygon; zero for an empty polygon.
    pub fn horizontal_extent(&self) -> i64 {
        extent(self.polygon.iter().map(|p| p.x))
    }

    /// `max y - min y` over the polygon; zero for an empty polygon.
    pub fn vertical_extent(&self) -> i64 {
        extent(self.polygon.iter().map(|p| p.y))
    }
}

/// Computed in `i64` so the span of any two `i32` coordinates fits.
fn extent(values: impl Iterator<Item = i32>) -> i64 {
    let (min, max) = values.fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        0
    } else {
        i64::from(max) - i64::from(min)
    }
}
