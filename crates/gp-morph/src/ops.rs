use gp_core::{Image, ImageView, offset_point};

use crate::element::StructuringElement;

/// Minimum over the element's taps, mirrored as in convolution.
///
/// The center pixel seeds the running minimum; taps outside the grid are
/// skipped rather than treated as background.
pub fn erode<T: Copy + Ord>(src: &ImageView<'_, T>, se: &StructuringElement) -> Image<T> {
    rank_extremum(src, se, 1, Ord::min)
}

/// Maximum over the reflected taps. For the symmetric plus and square shapes
/// this walks exactly the same pixels as [`erode`].
pub fn dilate<T: Copy + Ord>(src: &ImageView<'_, T>, se: &StructuringElement) -> Image<T> {
    rank_extremum(src, se, -1, Ord::max)
}

pub fn open<T: Copy + Ord>(src: &ImageView<'_, T>, se: &StructuringElement) -> Image<T> {
    let eroded = erode(src, se);
    dilate(&eroded.as_view(), se)
}

pub fn close<T: Copy + Ord>(src: &ImageView<'_, T>, se: &StructuringElement) -> Image<T> {
    let dilated = dilate(src, se);
    erode(&dilated.as_view(), se)
}

fn rank_extremum<T: Copy + Ord>(
    src: &ImageView<'_, T>,
    se: &StructuringElement,
    sign: isize,
    pick: fn(T, T) -> T,
) -> Image<T> {
    let (w, h) = src.dims();
    src.map_coords(|x, y| {
        let mut acc = src.at(x, y);
        for &(dx, dy) in se.offsets() {
            if let Some((sx, sy)) = offset_point(x, y, sign * dx, sign * dy, w, h) {
                acc = pick(acc, src.at(sx, sy));
            }
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use gp_core::Image;
    use proptest::prelude::*;

    use crate::element::{Shape, StructuringElement};
    use crate::ops::{close, dilate, erode, open};

    #[test]
    fn open_removes_single_pixel_speck() {
        let mut data = vec![0u8; 25];
        data[12] = 255;
        let img = Image::from_vec(5, 5, data).expect("valid image");
        let se = StructuringElement::new(Shape::Square, 3).expect("valid element");

        let out = open(&img.as_view(), &se);
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn close_fills_single_pixel_hole() {
        let mut data = vec![255u8; 25];
        data[12] = 0;
        let img = Image::from_vec(5, 5, data).expect("valid image");
        let se = StructuringElement::new(Shape::Plus, 3).expect("valid element");

        let out = close(&img.as_view(), &se);
        assert_eq!(out.data()[12], 255);
    }

    #[test]
    fn borders_do_not_erode_a_flat_image() {
        let img = Image::new_fill(4, 3, 200u8);
        let se = StructuringElement::new(Shape::Square, 5).expect("valid element");
        assert_eq!(erode(&img.as_view(), &se), img);
        assert_eq!(dilate(&img.as_view(), &se), img);
    }

    #[test]
    fn plus_and_square_differ_on_diagonals() {
        let mut img = Image::new_fill(3, 3, 0u8);
        img.set(1, 1, 9);
        let plus = StructuringElement::new(Shape::Plus, 3).expect("valid element");
        let square = StructuringElement::new(Shape::Square, 3).expect("valid element");

        let p = dilate(&img.as_view(), &plus);
        assert_eq!(p.data(), &[0, 9, 0, 9, 9, 9, 0, 9, 0]);

        let s = dilate(&img.as_view(), &square);
        assert!(s.data().iter().all(|&v| v == 9));
    }

    #[test]
    fn asymmetric_element_erodes_and_dilates_in_opposite_directions() {
        // Taps: center and the pixel to the left (mirrored from the right cell).
        let mask = Image::from_vec(3, 3, vec![0u8, 0, 0, 0, 1, 1, 0, 0, 0]).expect("valid mask");
        let se = StructuringElement::from_image(&mask.as_view()).expect("valid element");
        let img = Image::from_vec(4, 1, vec![0u8, 5, 5, 5]).expect("valid image");

        assert_eq!(erode(&img.as_view(), &se).data(), &[0, 0, 5, 5]);
        assert_eq!(dilate(&img.as_view(), &se).data(), &[5, 5, 5, 5]);
    }

    #[test]
    fn works_on_wider_sample_types() {
        let img = Image::from_vec(3, 1, vec![-4i16, 1000, 7]).expect("valid image");
        let se = StructuringElement::new(Shape::Square, 3).expect("valid element");
        assert_eq!(erode(&img.as_view(), &se).data(), &[-4, -4, 7]);
        assert_eq!(dilate(&img.as_view(), &se).data(), &[1000, 1000, 1000]);
    }

    fn arb_element() -> impl Strategy<Value = StructuringElement> {
        (prop_oneof![Just(Shape::Plus), Just(Shape::Square)], 0usize..3)
            .prop_map(|(shape, half)| {
                StructuringElement::new(shape, 2 * half + 1).expect("valid element")
            })
    }

    fn arb_mask_element() -> impl Strategy<Value = StructuringElement> {
        prop::collection::vec(0..=1u8, 9).prop_map(|cells| {
            let mask = Image::from_vec(3, 3, cells).expect("valid mask");
            StructuringElement::from_image(&mask.as_view()).expect("valid element")
        })
    }

    fn arb_image() -> impl Strategy<Value = Image<u8>> {
        (1usize..8, 1usize..8).prop_flat_map(|(w, h)| {
            prop::collection::vec(any::<u8>(), w * h)
                .prop_map(move |data| Image::from_vec(w, h, data).expect("valid image"))
        })
    }

    proptest! {
        #[test]
        fn opening_never_increases(img in arb_image(), se in arb_element()) {
            let opened = open(&img.as_view(), &se);
            for (o, v) in opened.data().iter().zip(img.data()) {
                prop_assert!(o <= v);
            }
        }

        #[test]
        fn closing_never_decreases(img in arb_image(), se in arb_element()) {
            let closed = close(&img.as_view(), &se);
            for (c, v) in closed.data().iter().zip(img.data()) {
                prop_assert!(c >= v);
            }
        }

        #[test]
        fn monotonicity_holds_for_custom_elements(img in arb_image(), se in arb_mask_element()) {
            let opened = open(&img.as_view(), &se);
            let closed = close(&img.as_view(), &se);
            for ((o, c), v) in opened.data().iter().zip(closed.data()).zip(img.data()) {
                prop_assert!(o <= v && v <= c);
            }
        }
    }
}
