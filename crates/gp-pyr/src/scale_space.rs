use gp_core::{Error, Image, ImageView, to_f32};
use gp_filter::{convolve_f32, gaussian_kernel_for_sigma};
use log::debug;

use crate::downsample::downsample2x2_mean_f32;

/// Parameters of the scale space and of keypoint selection on top of it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScaleSpaceConfig {
    /// Requested number of octaves; fewer are built for small inputs.
    pub octaves: usize,
    /// Scale steps per doubling of sigma. Each octave holds `intervals + 3`
    /// Gaussian levels and `intervals + 2` difference levels.
    pub intervals: usize,
    pub sigma0: f32,
    /// Minimum `|DoG|` of an extremum, in intensity units.
    pub contrast_threshold: f32,
    pub corner_alpha: f32,
    /// Minimum Harris score `Q` of an accepted extremum.
    pub corner_threshold: f32,
    /// Half size of the Harris summation window.
    pub window_radius: usize,
    /// Pixels ignored along each border of every octave.
    pub border_margin: usize,
    /// Keypoints closer than this (base pixels) to an earlier one are dropped.
    pub min_distance: f32,
}

impl Default for ScaleSpaceConfig {
    fn default() -> Self {
        Self {
            octaves: 3,
            intervals: 2,
            sigma0: 1.6,
            contrast_threshold: 2.0,
            corner_alpha: 0.04,
            corner_threshold: 0.0,
            window_radius: 1,
            border_margin: 5,
            min_distance: 3.0,
        }
    }
}

/// Gaussian and difference-of-Gaussian levels at one resolution.
#[derive(Debug, Clone)]
pub struct Octave {
    /// Power of two between base and octave pixels.
    pub index: usize,
    /// Blur of each Gaussian level, in octave pixels.
    pub sigmas: Vec<f32>,
    pub gaussians: Vec<Image<f32>>,
    /// `dogs[i] = gaussians[i + 1] - gaussians[i]`.
    pub dogs: Vec<Image<f32>>,
}

impl Octave {
    pub fn dims(&self) -> (usize, usize) {
        self.gaussians[0].dims()
    }

    /// Factor mapping octave coordinates back to base coordinates.
    pub fn scale(&self) -> usize {
        1 << self.index
    }
}

#[derive(Debug, Clone)]
pub struct ScaleSpace {
    octaves: Vec<Octave>,
}

impl ScaleSpace {
    /// Builds up to `cfg.octaves` octaves from an intensity grid.
    ///
    /// The base level is the input blurred to `sigma0`. Level `i` of an octave
    /// has `sigma0 * 2^(i / intervals)` and is produced from level 0 with the
    /// incremental blur. Level `intervals` (twice the base blur) is halved to
    /// seed the next octave. Building stops once an octave would be smaller
    /// than 2 pixels in either direction.
    pub fn build(src: &ImageView<'_, u8>, cfg: &ScaleSpaceConfig) -> Result<Self, Error> {
        if !cfg.sigma0.is_finite() || cfg.sigma0 <= 0.0 {
            return Err(Error::InvalidSigma(cfg.sigma0));
        }
        let intervals = cfg.intervals.max(1);
        let sigmas: Vec<f32> = (0..intervals + 3)
            .map(|i| cfg.sigma0 * 2f32.powf(i as f32 / intervals as f32))
            .collect();

        let mut octaves = Vec::with_capacity(cfg.octaves);
        let mut base = blur(&to_f32(src).as_view(), cfg.sigma0)?;

        for index in 0..cfg.octaves {
            let gaussians = build_gaussians(base, &sigmas)?;
            let dogs = gaussians
                .windows(2)
                .map(|pair| difference(&pair[1], &pair[0]))
                .collect();

            let (w, h) = gaussians[0].dims();
            let next = (w >= 4 && h >= 4)
                .then(|| downsample2x2_mean_f32(&gaussians[intervals].as_view()))
                .transpose()?;

            octaves.push(Octave {
                index,
                sigmas: sigmas.clone(),
                gaussians,
                dogs,
            });

            match next {
                Some(img) => base = img,
                None => break,
            }
        }

        debug!(
            "ScaleSpace::build: {} octaves from {}x{}",
            octaves.len(),
            src.width(),
            src.height()
        );
        Ok(Self { octaves })
    }

    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    pub fn num_octaves(&self) -> usize {
        self.octaves.len()
    }
}

fn build_gaussians(base: Image<f32>, sigmas: &[f32]) -> Result<Vec<Image<f32>>, Error> {
    let s0 = sigmas[0];
    let mut levels = Vec::with_capacity(sigmas.len());
    for &s in &sigmas[1..] {
        let inc = (s * s - s0 * s0).sqrt();
        levels.push(blur(&base.as_view(), inc)?);
    }
    levels.insert(0, base);
    Ok(levels)
}

fn blur(src: &ImageView<'_, f32>, sigma: f32) -> Result<Image<f32>, Error> {
    let kernel = gaussian_kernel_for_sigma(sigma)?;
    Ok(convolve_f32(src, &kernel))
}

fn difference(a: &Image<f32>, b: &Image<f32>) -> Image<f32> {
    let (a, b) = (a.as_view(), b.as_view());
    a.map_coords(|x, y| a.at(x, y) - b.at(x, y))
}
