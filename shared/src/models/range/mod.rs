use super::point::Point;

use serde::{Deserialize, Serialize};

/// Rectangle of the complex plane mapped onto the raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Plane coordinates of the center of pixel (`col`, `row`) in a `cols` x `rows` grid.
    /// Row 0 is the top edge, i.e. `max.y`.
    pub fn project(&self, col: u32, row: u32, cols: u32, rows: u32) -> Point {
        let dx = (self.max.x - self.min.x) / cols.max(1) as f64;
        let dy = (self.max.y - self.min.y) / rows.max(1) as f64;
        Point::new(
            self.min.x + (col as f64 + 0.5) * dx,
            self.max.y - (row as f64 + 0.5) * dy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_maps_corners_inside_the_range() {
        let range = Range::new(Point::new(-2.0, -1.0), Point::new(2.0, 1.0));
        let top_left = range.project(0, 0, 4, 2);
        let bottom_right = range.project(3, 1, 4, 2);
        assert_eq!(top_left, Point::new(-1.5, 0.5));
        assert_eq!(bottom_right, Point::new(1.5, -0.5));
    }
}
