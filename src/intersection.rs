use geo::{CoordNum, Rect};

use crate::errors::{RasterError, Result};

pub trait Intersection {
    type Output;
    fn intersection(&self, rhs: &Self) -> Result<Self::Output>;
}

/// Strict intersection, touching rectangles do not intersect.
impl<T: CoordNum> Intersection for Rect<T> {
    type Output = Rect<T>;
    fn intersection(&self, rhs: &Self) -> Result<Rect<T>> {
        let (lhs_min, lhs_max) = (self.min(), self.max());
        let (rhs_min, rhs_max) = (rhs.min(), rhs.max());

        let min_x = if lhs_min.x > rhs_min.x { lhs_min.x } else { rhs_min.x };
        let min_y = if lhs_min.y > rhs_min.y { lhs_min.y } else { rhs_min.y };
        let max_x = if lhs_max.x < rhs_max.x { lhs_max.x } else { rhs_max.x };
        let max_y = if lhs_max.y < rhs_max.y { lhs_max.y } else { rhs_max.y };

        if (min_x >= max_x) | (min_y >= max_y) {
            return Err(RasterError::EmptyIntersection);
        }
        Ok(Rect::new((min_x, min_y), (max_x, max_y)))
    }
}
