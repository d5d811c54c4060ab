//! Fixed edge pipelines over a grayscale working grid.
//!
//! Both pipelines smooth, take the central-difference gradient magnitude and
//! threshold it to `{0, 255}`; they differ only in the smoother.

use gp_core::{Error, Image, ImageView};
use gp_edge::central_difference_gradient;
use gp_filter::{convolve, gaussian_kernel, median_filter, threshold};
use log::debug;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    pub gaussian_size: usize,
    pub gaussian_sigma: f32,
    pub median_size: usize,
    pub threshold: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gaussian_size: 5,
            gaussian_sigma: 5.0,
            median_size: 5,
            threshold: 17,
        }
    }
}

/// Every intermediate grid of an edge pipeline.
#[derive(Debug, Clone)]
pub struct EdgeStages {
    pub smoothed: Image<u8>,
    pub magnitude: Image<u8>,
    pub edges: Image<u8>,
}

/// Gaussian smoothing, gradient magnitude, threshold.
pub fn gaussian_edge_pipeline(
    gray: &ImageView<'_, u8>,
    cfg: &PipelineConfig,
) -> Result<EdgeStages, Error> {
    let kernel = gaussian_kernel(cfg.gaussian_size, cfg.gaussian_sigma)?;
    let smoothed = convolve(gray, &kernel);
    Ok(finish("gaussian", smoothed, cfg.threshold))
}

/// Median smoothing, gradient magnitude, threshold.
pub fn median_edge_pipeline(
    gray: &ImageView<'_, u8>,
    cfg: &PipelineConfig,
) -> Result<EdgeStages, Error> {
    let smoothed = median_filter(gray, cfg.median_size)?;
    Ok(finish("median", smoothed, cfg.threshold))
}

fn finish(name: &str, smoothed: Image<u8>, t: u8) -> EdgeStages {
    let magnitude = central_difference_gradient(&smoothed.as_view());
    let edges = threshold(&magnitude.as_view(), t);
    let on = edges.data().iter().filter(|&&v| v != 0).count();
    debug!(
        "{name} edge pipeline: {on} edge pixels of {}",
        edges.data().len()
    );
    EdgeStages {
        smoothed,
        magnitude,
        edges,
    }
}
