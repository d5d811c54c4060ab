use gp_core::{Error, ImageView, Point2i, offset_point};
use gp_morph::StructuringElement;
use log::{debug, warn};

use crate::compass::Compass;

/// Traces the outer boundary of the first foreground component.
///
/// `mask` must hold only `0` (background) and `1` (foreground). The result is
/// empty when there is no foreground and a single point for an isolated pixel.
/// Thin parts of the component are walked in both directions, so a pixel may
/// appear more than once.
pub fn trace_boundary(
    mask: &ImageView<'_, u8>,
    se: &StructuringElement,
) -> Result<Vec<Point2i>, Error> {
    check_binary(mask)?;

    let Some(start) = find_start(mask) else {
        return Ok(Vec::new());
    };
    let Some((first, mut compass)) = trace_step(mask, se, start, Compass::start()) else {
        return Ok(vec![start]);
    };

    let max_steps = 8 * mask.width() * mask.height();
    let mut points = vec![start];
    let mut current = first;
    let mut steps = 0usize;

    while let Some((next, c)) = trace_step(mask, se, current, compass) {
        if current == start && next == first {
            break;
        }
        steps += 1;
        if steps > max_steps {
            warn!(
                "trace_boundary: stopped after {max_steps} steps without closing at ({}, {})",
                start.x, start.y
            );
            break;
        }
        points.push(current);
        current = next;
        compass = c;
    }

    debug!(
        "trace_boundary: {} points from ({}, {})",
        points.len(),
        start.x,
        start.y
    );
    Ok(points)
}

/// First foreground pixel scanning column by column (outer x, inner y).
pub fn find_start(mask: &ImageView<'_, u8>) -> Option<Point2i> {
    (0..mask.width())
        .flat_map(|x| (0..mask.height()).map(move |y| (x, y)))
        .find(|&(x, y)| mask.at(x, y) != 0)
        .map(Point2i::from)
}

/// One Moore probe around `current`.
///
/// Neighbors are visited clockwise beginning at `compass`; background and
/// out-of-grid neighbors are skipped, as are foreground neighbors that fail
/// [`is_boundary_pixel`]. Returns the accepted neighbor together with the
/// register for the following probe, or `None` when no neighbor qualifies.
pub fn trace_step(
    mask: &ImageView<'_, u8>,
    se: &StructuringElement,
    current: Point2i,
    compass: Compass,
) -> Option<(Point2i, Compass)> {
    let (w, h) = mask.dims();
    let (cx, cy) = (usize::try_from(current.x).ok()?, usize::try_from(current.y).ok()?);

    (0..8).map(|i| compass.rotate(i)).find_map(|dir| {
        let (dx, dy) = dir.offset();
        let (nx, ny) = offset_point(cx, cy, dx, dy, w, h)?;
        (mask.at(nx, ny) != 0 && is_boundary_pixel(mask, se, nx, ny))
            .then(|| (Point2i::from((nx, ny)), dir.look_back()))
    })
}

/// True when some on-tap of `se` around `(x, y)` is background or off-grid.
pub fn is_boundary_pixel(
    mask: &ImageView<'_, u8>,
    se: &StructuringElement,
    x: usize,
    y: usize,
) -> bool {
    let (w, h) = mask.dims();
    se.offsets()
        .iter()
        .any(|&(dx, dy)| match offset_point(x, y, dx, dy, w, h) {
            Some((nx, ny)) => mask.at(nx, ny) == 0,
            None => true,
        })
}

fn check_binary(mask: &ImageView<'_, u8>) -> Result<(), Error> {
    for y in 0..mask.height() {
        if let Some((x, &value)) = mask.row(y).iter().enumerate().find(|(_, v)| **v > 1) {
            return Err(Error::NotBinary { x, y, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use gp_core::{Error, Image, Point2i};
    use gp_morph::{Shape, StructuringElement};
    use proptest::prelude::*;

    use super::{find_start, is_boundary_pixel, trace_boundary, trace_step};
    use crate::compass::Compass;

    fn plus3() -> StructuringElement {
        StructuringElement::new(Shape::Plus, 3).expect("valid element")
    }

    fn rect_mask(w: usize, h: usize, x0: usize, y0: usize, rw: usize, rh: usize) -> Image<u8> {
        Image::from_fn(w, h, |x, y| {
            u8::from((x0..x0 + rw).contains(&x) && (y0..y0 + rh).contains(&y))
        })
    }

    fn pts(raw: &[(i32, i32)]) -> Vec<Point2i> {
        raw.iter().map(|&(x, y)| Point2i::new(x, y)).collect()
    }

    #[test]
    fn empty_mask_has_no_boundary() {
        let mask = Image::new_fill(4, 4, 0u8);
        assert!(trace_boundary(&mask.as_view(), &plus3()).expect("binary").is_empty());
    }

    #[test]
    fn isolated_pixel_is_a_single_point() {
        let mut mask = Image::new_fill(5, 5, 0u8);
        mask.set(2, 3, 1);
        let out = trace_boundary(&mask.as_view(), &plus3()).expect("binary");
        assert_eq!(out, pts(&[(2, 3)]));
    }

    #[test]
    fn non_binary_input_is_rejected() {
        let mut mask = Image::new_fill(3, 3, 0u8);
        mask.set(1, 2, 255);
        assert_eq!(
            trace_boundary(&mask.as_view(), &plus3()).unwrap_err(),
            Error::NotBinary {
                x: 1,
                y: 2,
                value: 255
            }
        );
    }

    #[test]
    fn square_is_walked_clockwise_from_its_top_left() {
        let mask = rect_mask(5, 5, 1, 1, 3, 3);
        let out = trace_boundary(&mask.as_view(), &plus3()).expect("binary");
        assert_eq!(
            out,
            pts(&[(1, 1), (2, 1), (3, 1), (3, 2), (3, 3), (2, 3), (1, 3), (1, 2)])
        );
    }

    #[test]
    fn component_touching_the_border_uses_the_grid_edge() {
        let mask = Image::new_fill(4, 3, 1u8);
        let square = StructuringElement::new(Shape::Square, 3).expect("valid element");
        let out = trace_boundary(&mask.as_view(), &square).expect("binary");
        assert_eq!(out.len(), 2 * 4 + 2 * 3 - 4);
        assert_eq!(out[0], Point2i::new(0, 0));
    }

    #[test]
    fn two_pixel_segment() {
        let mut mask = Image::new_fill(4, 3, 0u8);
        mask.set(1, 1, 1);
        mask.set(2, 1, 1);
        let out = trace_boundary(&mask.as_view(), &plus3()).expect("binary");
        assert_eq!(out, pts(&[(1, 1), (2, 1)]));
    }

    #[test]
    fn diagonal_stroke_is_walked_there_and_back() {
        let mask = Image::from_fn(4, 4, |x, y| u8::from(x == y && x < 3));
        let out = trace_boundary(&mask.as_view(), &plus3()).expect("binary");
        assert_eq!(out, pts(&[(0, 0), (1, 1), (2, 2), (1, 1)]));
    }

    #[test]
    fn start_is_column_major() {
        let mut mask = Image::new_fill(4, 4, 0u8);
        mask.set(3, 0, 1);
        mask.set(1, 3, 1);
        assert_eq!(find_start(&mask.as_view()), Some(Point2i::new(1, 3)));
    }

    #[test]
    fn steps_carry_their_own_register() {
        let mask = rect_mask(5, 5, 1, 1, 3, 3);
        let view = mask.as_view();
        let se = plus3();

        let (p, c) = trace_step(&view, &se, Point2i::new(3, 1), Compass::new(6)).expect("step");
        assert_eq!(p, Point2i::new(3, 2));
        assert_eq!(c, Compass::new(0));

        // Same input, same answer: no state hides between calls.
        let again = trace_step(&view, &se, Point2i::new(3, 1), Compass::new(6));
        assert_eq!(again, Some((p, c)));
    }

    #[test]
    fn interior_pixels_are_not_boundary() {
        let mask = rect_mask(7, 7, 1, 1, 5, 5);
        let view = mask.as_view();
        assert!(!is_boundary_pixel(&view, &plus3(), 3, 3));
        assert!(is_boundary_pixel(&view, &plus3(), 1, 3));
        // Diagonal background only counts with a square element.
        let notched = Image::from_fn(3, 3, |x, y| u8::from(!(x == 0 && y == 0)));
        let square = StructuringElement::new(Shape::Square, 3).expect("valid element");
        assert!(!is_boundary_pixel(&notched.as_view(), &plus3(), 1, 1));
        assert!(is_boundary_pixel(&notched.as_view(), &square, 1, 1));
    }

    proptest! {
        #[test]
        fn filled_rectangle_boundary_is_its_perimeter(
            rw in 2usize..12,
            rh in 2usize..12,
            x0 in 0usize..4,
            y0 in 0usize..4,
        ) {
            let mask = rect_mask(16, 16, x0, y0, rw, rh);
            let out = trace_boundary(&mask.as_view(), &plus3()).expect("binary");

            prop_assert_eq!(out.len(), 2 * rw + 2 * rh - 4);
            let unique: HashSet<_> = out.iter().copied().collect();
            prop_assert_eq!(unique.len(), out.len());
            for pair in out.windows(2) {
                prop_assert!(pair[0].is_adjacent8(pair[1]));
            }
            prop_assert!(out[out.len() - 1].is_adjacent8(out[0]));
        }
    }
}
