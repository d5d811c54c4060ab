use core::fmt;
use core::str::FromStr;

use gp_core::{Error, Image, ImageView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Shape {
    /// Middle row and middle column.
    Plus,
    /// Full block.
    Square,
}

impl FromStr for Shape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plus" | "cross" => Ok(Self::Plus),
            "square" | "box" => Ok(Self::Square),
            _ => Err(Error::UnknownShape(s.to_owned())),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plus => f.write_str("plus"),
            Self::Square => f.write_str("square"),
        }
    }
}

/// Odd-sized square binary mask anchored at `(size / 2, size / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuringElement {
    mask: Image<u8>,
    offsets: Vec<(isize, isize)>,
}

impl StructuringElement {
    pub fn new(shape: Shape, size: usize) -> Result<Self, Error> {
        check_size(size, size)?;
        let c = size / 2;
        let mask = Image::from_fn(size, size, |x, y| match shape {
            Shape::Plus => u8::from(x == c || y == c),
            Shape::Square => 1,
        });
        Ok(Self::from_mask(mask))
    }

    /// Element with no "on" taps. Erosion and dilation with it copy the input.
    pub fn empty(size: usize) -> Result<Self, Error> {
        check_size(size, size)?;
        Ok(Self::from_mask(Image::new_fill(size, size, 0u8)))
    }

    /// Custom element from a `{0, 1}` grid.
    pub fn from_image(mask: &ImageView<'_, u8>) -> Result<Self, Error> {
        check_size(mask.width(), mask.height())?;
        if mask.width() != mask.height() {
            return Err(Error::DimensionMismatch {
                expected: (mask.width(), mask.width()),
                actual: mask.dims(),
            });
        }
        for y in 0..mask.height() {
            for (x, &value) in mask.row(y).iter().enumerate() {
                if value > 1 {
                    return Err(Error::NotBinary { x, y, value });
                }
            }
        }
        Ok(Self::from_mask(mask.to_image()))
    }

    fn from_mask(mask: Image<u8>) -> Self {
        let r = (mask.width() / 2) as isize;
        let mut offsets = Vec::new();
        for ky in 0..mask.height() {
            for kx in 0..mask.width() {
                if mask.data()[ky * mask.width() + kx] != 0 {
                    offsets.push((r - kx as isize, r - ky as isize));
                }
            }
        }
        Self { mask, offsets }
    }

    pub fn size(&self) -> usize {
        self.mask.width()
    }

    pub fn center(&self) -> (usize, usize) {
        (self.mask.width() / 2, self.mask.height() / 2)
    }

    pub fn is_on(&self, kx: usize, ky: usize) -> bool {
        self.mask.get(kx, ky).is_some_and(|&v| v != 0)
    }

    pub fn as_view(&self) -> ImageView<'_, u8> {
        self.mask.as_view()
    }

    /// Mirrored tap offsets `(r - kx, r - ky)` of every "on" cell.
    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }
}

fn check_size(width: usize, height: usize) -> Result<(), Error> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    if width % 2 == 0 || height % 2 == 0 {
        return Err(Error::EvenKernelSize { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gp_core::{Error, Image};

    use super::{Shape, StructuringElement};

    #[test]
    fn plus_sets_middle_row_and_column() {
        let se = StructuringElement::new(Shape::Plus, 3).expect("valid element");
        assert_eq!(se.as_view().to_image().data(), &[0, 1, 0, 1, 1, 1, 0, 1, 0]);
        assert_eq!(se.center(), (1, 1));
        assert_eq!(se.offsets().len(), 5);
    }

    #[test]
    fn square_sets_everything() {
        let se = StructuringElement::new(Shape::Square, 5).expect("valid element");
        assert!(se.as_view().to_image().data().iter().all(|&v| v == 1));
        assert_eq!(se.offsets().len(), 25);
        assert!(se.is_on(4, 0));
        assert!(!se.is_on(5, 0));
    }

    #[test]
    fn even_or_zero_sizes_are_rejected() {
        assert_eq!(
            StructuringElement::new(Shape::Plus, 4).unwrap_err(),
            Error::EvenKernelSize {
                width: 4,
                height: 4
            }
        );
        assert!(matches!(
            StructuringElement::new(Shape::Square, 0),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn shape_names_parse_or_fail_loudly() {
        assert_eq!("plus".parse::<Shape>(), Ok(Shape::Plus));
        assert_eq!(" Square ".parse::<Shape>(), Ok(Shape::Square));
        assert_eq!(
            "disk".parse::<Shape>(),
            Err(Error::UnknownShape("disk".to_owned()))
        );
        assert_eq!(Shape::Plus.to_string(), "plus");
    }

    #[test]
    fn empty_element_has_no_taps() {
        let se = StructuringElement::empty(3).expect("valid element");
        assert!(se.offsets().is_empty());
    }

    #[test]
    fn custom_element_must_be_binary_and_square() {
        let bad = Image::from_vec(3, 1, vec![0u8, 2, 0]).expect("valid image");
        assert!(matches!(
            StructuringElement::from_image(&bad.as_view()),
            Err(Error::DimensionMismatch { .. })
        ));

        let bad = Image::from_vec(1, 1, vec![2u8]).expect("valid image");
        assert_eq!(
            StructuringElement::from_image(&bad.as_view()).unwrap_err(),
            Error::NotBinary {
                x: 0,
                y: 0,
                value: 2
            }
        );

        let ok = Image::from_vec(3, 3, vec![0u8, 0, 0, 0, 1, 1, 0, 0, 0]).expect("valid image");
        let se = StructuringElement::from_image(&ok.as_view()).expect("valid element");
        assert_eq!(se.offsets(), &[(0, 0), (-1, 0)]);
    }
}
