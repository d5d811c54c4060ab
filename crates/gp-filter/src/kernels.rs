//! 2D filter kernels.
//!
//! Conventions:
//! - Kernel width and height are odd; the anchor is `(width / 2, height / 2)`.
//! - Gaussian kernels are renormalized so `sum(k) ~= 1`.
//! - Derivative kernels are not normalized; numerically `sum(k) == 0`.

use gp_core::{Error, Image, ImageView};

#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    coeffs: Image<f32>,
}

impl Kernel {
    pub fn new(width: usize, height: usize, coeffs: Vec<f32>) -> Result<Self, Error> {
        Self::from_image(Image::from_vec(width, height, coeffs)?)
    }

    pub fn from_image(coeffs: Image<f32>) -> Result<Self, Error> {
        let (width, height) = coeffs.dims();
        if width % 2 == 0 || height % 2 == 0 {
            return Err(Error::EvenKernelSize { width, height });
        }
        Ok(Self { coeffs })
    }

    /// `size x size` kernel with a single `1.0` at the anchor.
    pub fn identity(size: usize) -> Result<Self, Error> {
        check_odd_size(size)?;
        let r = size / 2;
        Ok(Self {
            coeffs: Image::from_fn(size, size, |x, y| if x == r && y == r { 1.0 } else { 0.0 }),
        })
    }

    pub fn width(&self) -> usize {
        self.coeffs.width()
    }

    pub fn height(&self) -> usize {
        self.coeffs.height()
    }

    pub fn radius_x(&self) -> usize {
        self.coeffs.width() / 2
    }

    pub fn radius_y(&self) -> usize {
        self.coeffs.height() / 2
    }

    #[inline]
    pub fn at(&self, kx: usize, ky: usize) -> f32 {
        self.coeffs.data()[ky * self.coeffs.width() + kx]
    }

    pub fn sum(&self) -> f32 {
        self.coeffs.data().iter().sum()
    }

    pub fn as_view(&self) -> ImageView<'_, f32> {
        self.coeffs.as_view()
    }
}

/// Square Gaussian kernel of odd `size`, renormalized to unit sum.
///
/// Each coefficient starts as `exp(-(dx^2 + dy^2) / (2 sigma^2)) / (2 pi sigma^2)`
/// and is divided by the sum over the truncated support.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Result<Kernel, Error> {
    check_odd_size(size)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::InvalidSigma(sigma));
    }

    let r = (size / 2) as isize;
    let sigma = f64::from(sigma);
    let two_sigma2 = 2.0 * sigma * sigma;
    let scale = 1.0 / (std::f64::consts::PI * two_sigma2);

    let raw: Vec<f64> = (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
        .map(|(dx, dy)| {
            let d2 = (dx * dx + dy * dy) as f64;
            scale * (-d2 / two_sigma2).exp()
        })
        .collect();

    let total: f64 = raw.iter().sum();
    let coeffs = raw.iter().map(|&v| (v / total) as f32).collect();
    Kernel::new(size, size, coeffs)
}

/// Gaussian kernel sized to cover `3 sigma` on each side (`2 ceil(3 sigma) + 1`).
pub fn gaussian_kernel_for_sigma(sigma: f32) -> Result<Kernel, Error> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::InvalidSigma(sigma));
    }
    let radius = ((3.0 * sigma).ceil() as usize).max(1);
    gaussian_kernel(2 * radius + 1, sigma)
}

/// Horizontal central difference `[-0.5, 0, 0.5]` (3 wide, 1 tall).
pub fn central_difference_x() -> Kernel {
    Kernel {
        coeffs: Image::from_fn(3, 1, |x, _| (x as f32 - 1.0) * 0.5),
    }
}

/// Vertical central difference, the transpose of [`central_difference_x`].
pub fn central_difference_y() -> Kernel {
    Kernel {
        coeffs: Image::from_fn(1, 3, |_, y| (y as f32 - 1.0) * 0.5),
    }
}

fn check_odd_size(size: usize) -> Result<(), Error> {
    if size == 0 {
        return Err(Error::InvalidDimension {
            width: size,
            height: size,
        });
    }
    if size % 2 == 0 {
        return Err(Error::EvenKernelSize {
            width: size,
            height: size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gp_core::Error;
    use proptest::prelude::*;

    use super::{
        Kernel, central_difference_x, central_difference_y, gaussian_kernel,
        gaussian_kernel_for_sigma,
    };

    #[test]
    fn gaussian_center_is_strict_maximum() {
        let k = gaussian_kernel(5, 1.0).expect("valid kernel");
        let center = k.at(2, 2);
        for ky in 0..5 {
            for kx in 0..5 {
                if (kx, ky) != (2, 2) {
                    assert!(k.at(kx, ky) < center, "({kx}, {ky}) not below center");
                }
            }
        }
        assert!((k.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn gaussian_is_symmetric() {
        let k = gaussian_kernel(7, 1.7).expect("valid kernel");
        for ky in 0..7 {
            for kx in 0..7 {
                assert!((k.at(kx, ky) - k.at(6 - kx, ky)).abs() < 1e-7);
                assert!((k.at(kx, ky) - k.at(kx, 6 - ky)).abs() < 1e-7);
                assert!((k.at(kx, ky) - k.at(ky, kx)).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn gaussian_rejects_bad_parameters() {
        assert_eq!(
            gaussian_kernel(4, 1.0).unwrap_err(),
            Error::EvenKernelSize {
                width: 4,
                height: 4
            }
        );
        assert!(matches!(
            gaussian_kernel(0, 1.0),
            Err(Error::InvalidDimension { .. })
        ));
        assert_eq!(gaussian_kernel(3, 0.0).unwrap_err(), Error::InvalidSigma(0.0));
        assert!(matches!(
            gaussian_kernel(3, f32::NAN),
            Err(Error::InvalidSigma(_))
        ));
    }

    #[test]
    fn single_tap_gaussian_is_identity() {
        let k = gaussian_kernel(1, 3.0).expect("valid kernel");
        assert_eq!(k.as_view().row(0), &[1.0]);
    }

    #[test]
    fn sigma_sized_kernel_covers_three_sigma() {
        let k = gaussian_kernel_for_sigma(1.2).expect("valid kernel");
        assert_eq!(k.width(), 9);
        assert_eq!(k.radius_y(), 4);
    }

    #[test]
    fn derivative_pair_shapes() {
        let dx = central_difference_x();
        let dy = central_difference_y();
        assert_eq!((dx.width(), dx.height()), (3, 1));
        assert_eq!((dy.width(), dy.height()), (1, 3));
        assert_eq!(dx.as_view().row(0), &[-0.5, 0.0, 0.5]);
        assert_eq!(dy.at(0, 0), -0.5);
        assert_eq!(dy.at(0, 2), 0.5);
        assert_eq!(dx.sum(), 0.0);
    }

    #[test]
    fn kernel_dimensions_must_be_odd() {
        assert!(matches!(
            Kernel::new(2, 1, vec![1.0, 1.0]),
            Err(Error::EvenKernelSize { .. })
        ));
        assert!(Kernel::new(3, 1, vec![1.0, 2.0, 1.0]).is_ok());
    }

    proptest! {
        #[test]
        fn gaussian_sums_to_one(half in 0usize..6, sigma in 0.3f32..8.0) {
            let k = gaussian_kernel(2 * half + 1, sigma).expect("valid kernel");
            prop_assert!((k.sum() - 1.0).abs() < 1e-4);
        }
    }
}
