use geo::{BoundingRect, Contains, Coord, Line, MultiPolygon, Point, Polygon};
use log::debug;
use ndarray::{s, Array2, Zip};
use std::iter;

use crate::{
    components::{
        bounds::PixelWindow,
        transforms::{snap, GridTransform, PixelOffset},
    },
    errors::Result,
};

/// Boolean mask of the pixels of a `(height, width)` raster covered by `polygons`.
///
/// With `invert` set, `true` marks pixels inside the polygons, otherwise it
/// marks pixels outside of them. With `all_touched` a pixel is inside when its
/// footprint shares area with a polygon, otherwise when its center does.
pub fn mask(
    polygons: &MultiPolygon,
    shape: (usize, usize),
    transform: &GridTransform,
    all_touched: bool,
    invert: bool,
) -> Result<Array2<bool>> {
    let to_pixel = transform.inverse()?;
    let mut inside = Array2::from_elem(shape, false);
    for polygon in polygons.iter() {
        let Some(window) = candidate_window(polygon, shape, transform)? else {
            continue;
        };
        debug!("rasterizing polygon over {window:?}");
        let (row_offset, col_offset) = (window.rows.start, window.cols.start);
        Zip::indexed(inside.slice_mut(s![window.rows, window.cols])).par_for_each(
            |(row, col), pixel| {
                if !*pixel {
                    let (row, col) = ((row + row_offset) as f64, (col + col_offset) as f64);
                    let center = transform.xy(col, row, PixelOffset::Center);
                    *pixel = polygon.contains(&Point::from(center));
                }
            },
        );
        if all_touched {
            // a pixel whose center is outside still shares area when a ring crosses it
            for ring in iter::once(polygon.exterior()).chain(polygon.interiors()) {
                for line in ring.lines() {
                    let start = to_pixel.apply(line.start);
                    let end = to_pixel.apply(line.end);
                    let line = Line::new(
                        Coord { x: snap(start.x), y: snap(start.y) },
                        Coord { x: snap(end.x), y: snap(end.y) },
                    );
                    mark_crossed(&mut inside, line);
                }
            }
        }
    }
    if !invert {
        inside.mapv_inplace(|pixel| !pixel);
    }
    Ok(inside)
}

fn is_integer(value: f64) -> bool {
    value == value.floor()
}

/// Marks every pixel whose open interior `line`, in pixel coordinates, passes through.
///
/// Segments running along pixel edges mark nothing.
fn mark_crossed(inside: &mut Array2<bool>, line: Line) {
    let (height, width) = inside.dim();
    let (start, end) = (line.start, line.end);
    let (top, bottom) = (start.y.min(end.y), start.y.max(end.y));
    let horizontal = top == bottom;
    if horizontal && is_integer(top) {
        return;
    }
    let first_row = top.floor() as isize;
    let last_row = if horizontal { first_row + 1 } else { bottom.ceil() as isize };
    let x_at = |y: f64| start.x + (y - start.y) * (end.x - start.x) / (end.y - start.y);

    for row in first_row.max(0)..last_row.min(height as isize) {
        let (left, right) = if horizontal {
            (start.x.min(end.x), start.x.max(end.x))
        } else {
            let (x0, x1) = (x_at(top.max(row as f64)), x_at(bottom.min(row as f64 + 1.)));
            (x0.min(x1), x0.max(x1))
        };
        let (first_col, last_col) = if left == right {
            if is_integer(left) {
                continue;
            }
            (left.floor() as isize, left.floor() as isize + 1)
        } else {
            (left.floor() as isize, right.ceil() as isize)
        };
        for col in first_col.max(0)..last_col.min(width as isize) {
            inside[[row as usize, col as usize]] = true;
        }
    }
}

/// Pixels whose footprint may intersect the polygon bounding box.
fn candidate_window(
    polygon: &Polygon,
    shape: (usize, usize),
    transform: &GridTransform,
) -> Result<Option<PixelWindow>> {
    let Some(rect) = polygon.bounding_rect() else {
        return Ok(None);
    };
    let (min, max) = (rect.min(), rect.max());
    let corners = [
        Coord { x: min.x, y: min.y },
        Coord { x: max.x, y: min.y },
        Coord { x: min.x, y: max.y },
        Coord { x: max.x, y: max.y },
    ];
    let mut rows = (isize::MAX, isize::MIN);
    let mut cols = (isize::MAX, isize::MIN);
    for corner in corners {
        let (row, col) = transform.rowcol(corner)?;
        rows = (rows.0.min(row), rows.1.max(row));
        cols = (cols.0.min(col), cols.1.max(col));
    }
    let clamp = |value: isize, max: usize| value.clamp(0, max as isize) as usize;
    let (height, width) = shape;
    let window = PixelWindow::new(
        clamp(rows.0 - 1, height),
        clamp(rows.1 + 2, height),
        clamp(cols.0 - 1, width),
        clamp(cols.1 + 2, width),
    );
    if window.height() == 0 || window.width() == 0 {
        Ok(None)
    } else {
        Ok(Some(window))
    }
}
