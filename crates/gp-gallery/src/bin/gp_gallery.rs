use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use gridproc::pipeline::{EdgeStages, PipelineConfig, gaussian_edge_pipeline, median_edge_pipeline};
use gridproc::{
    Error as GridError, FinalRun, HoughLine, Image, Keypoint, LineSegment, PeakConfig, PeakMode,
    Point2i, Rgb8, ScaleSpace, ScaleSpaceConfig, SegmentConfig, Shape, StructuringElement, close,
    detect_line_segments_with, dilate, erode, find_peaks_with, hough_transform, invert,
    keypoints_in, open, stretch_contrast, threshold, to_binary_mask, to_grayscale_with_progress,
    trace_boundary,
};
use image::{GrayImage, Rgb, RgbImage};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "gp_gallery")]
#[command(about = "Run gridproc stages and pipelines on image files")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gaussian and median edge pipelines.
    #[command(name = "pipeline")]
    Pipeline(PipelineArgs),
    /// Grayscale, invert, contrast stretch, threshold and binary mask.
    #[command(name = "point-ops")]
    PointOps(PointOpsArgs),
    #[command(name = "morphology")]
    Morphology(MorphologyArgs),
    /// Moore boundary of the first foreground component.
    #[command(name = "boundary")]
    Boundary(BoundaryArgs),
    /// Hough lines and their segments on a thresholded edge map.
    #[command(name = "hough")]
    Hough(HoughArgs),
    /// Exploratory scale-space keypoints.
    #[command(name = "keypoints")]
    Keypoints(KeypointArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out/gallery")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct PipelineArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// JSON file with pipeline parameters; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    gaussian_size: Option<usize>,
    #[arg(long)]
    sigma: Option<f32>,
    #[arg(long)]
    median_size: Option<usize>,
    #[arg(long)]
    threshold: Option<u8>,
}

#[derive(Args, Debug, Clone)]
struct PointOpsArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = gridproc::DEFAULT_MASK_THRESHOLD)]
    threshold: u8,
}

#[derive(Args, Debug, Clone)]
struct MorphologyArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// `plus` or `square`.
    #[arg(long, default_value = "square")]
    shape: Shape,
    #[arg(long, default_value_t = 3)]
    size: usize,
}

#[derive(Args, Debug, Clone)]
struct BoundaryArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = gridproc::DEFAULT_MASK_THRESHOLD)]
    threshold: u8,
    #[arg(long, default_value = "plus")]
    shape: Shape,
    #[arg(long, default_value_t = 3)]
    size: usize,
}

#[derive(Args, Debug, Clone)]
struct HoughArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Intensities above this become edge pixels.
    #[arg(long, default_value_t = 127)]
    edge_threshold: u8,
    #[arg(long, default_value_t = 100)]
    peak_threshold: u32,
    /// Keep only local maxima within this theta/r radius.
    #[arg(long)]
    nms_radius: Option<usize>,
    /// Segments are extracted for at most this many peaks, strongest first.
    #[arg(long, default_value_t = 16)]
    max_lines: usize,
    #[arg(long, default_value_t = 10.0)]
    min_length: f32,
    #[arg(long, default_value_t = 3.0)]
    max_gap: f32,
    /// Discard the run still open at the end of each line.
    #[arg(long, default_value_t = false)]
    drop_final_run: bool,
}

#[derive(Args, Debug, Clone)]
struct KeypointArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 3)]
    octaves: usize,
    #[arg(long, default_value_t = 2.0)]
    contrast_threshold: f32,
    #[arg(long, default_value_t = 0.0)]
    corner_threshold: f32,
}

#[derive(Debug, Clone, Serialize)]
struct MetaPipeline {
    config: PipelineConfig,
    gaussian_edge_pixels: usize,
    median_edge_pixels: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaPointOps {
    min: u8,
    max: u8,
    threshold: u8,
    stretched: bool,
    mask_foreground: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaMorphology {
    shape: Shape,
    size: usize,
    pixel_rule: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct BoundaryDto {
    threshold: u8,
    shape: Shape,
    size: usize,
    points: Vec<Point2i>,
}

#[derive(Debug, Clone, Serialize)]
struct LineDto {
    peak: Point2i,
    votes: u32,
    line: HoughLine,
    segments: Vec<LineSegment>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaHough {
    diag: usize,
    r_bins: usize,
    peak_config: PeakConfig,
    segment_config: SegmentConfig,
    peak_count: usize,
    lines: Vec<LineDto>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaKeypoints {
    config: ScaleSpaceConfig,
    octave_sizes: Vec<[usize; 2]>,
    keypoints: Vec<Keypoint>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Pipeline(args) => run_pipeline(args),
        Command::PointOps(args) => run_point_ops(args),
        Command::Morphology(args) => run_morphology(args),
        Command::Boundary(args) => run_boundary(args),
        Command::Hough(args) => run_hough(args),
        Command::Keypoints(args) => run_keypoints(args),
    }
}

fn run_pipeline(args: PipelineArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "pipeline")?;
    let gray = load_input_gray(&args.common.input)?;

    let mut cfg = match &args.config {
        Some(path) => read_json::<PipelineConfig>(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(v) = args.gaussian_size {
        cfg.gaussian_size = v;
    }
    if let Some(v) = args.sigma {
        cfg.gaussian_sigma = v;
    }
    if let Some(v) = args.median_size {
        cfg.median_size = v;
    }
    if let Some(v) = args.threshold {
        cfg.threshold = v;
    }

    let gaussian = gaussian_edge_pipeline(&gray.as_view(), &cfg).context("gaussian pipeline")?;
    let median = median_edge_pipeline(&gray.as_view(), &cfg).context("median pipeline")?;

    save_u8_image(case_dir.join("gray.png"), &gray)?;
    save_stages(&case_dir, "gaussian", &gaussian)?;
    save_stages(&case_dir, "median", &median)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaPipeline {
            config: cfg,
            gaussian_edge_pixels: count_nonzero(&gaussian.edges),
            median_edge_pixels: count_nonzero(&median.edges),
        },
    )
}

fn run_point_ops(args: PointOpsArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "point_ops")?;
    let gray = load_input_gray(&args.common.input)?;
    let view = gray.as_view();
    let (min, max) = gridproc::min_max(&view);

    save_u8_image(case_dir.join("gray.png"), &gray)?;
    save_u8_image(case_dir.join("inverted.png"), &invert(&view))?;
    save_u8_image(case_dir.join("threshold.png"), &threshold(&view, args.threshold))?;

    let stretched = match stretch_contrast(&view) {
        Ok(img) => {
            save_u8_image(case_dir.join("stretched.png"), &img)?;
            true
        }
        Err(err @ GridError::DegenerateRange { .. }) => {
            warn!("skipping contrast stretch: {err}");
            false
        }
        Err(err) => return Err(err).context("contrast stretch"),
    };

    let mask = to_binary_mask(&view, args.threshold);
    save_u8_image(case_dir.join("mask.png"), &labels_to_intensity(&mask))?;

    write_json(
        case_dir.join("meta.json"),
        &MetaPointOps {
            min,
            max,
            threshold: args.threshold,
            stretched,
            mask_foreground: count_nonzero(&mask),
        },
    )
}

fn run_morphology(args: MorphologyArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "morphology")?;
    let gray = load_input_gray(&args.common.input)?;
    let view = gray.as_view();
    let se = StructuringElement::new(args.shape, args.size)
        .with_context(|| format!("building {} element of size {}", args.shape, args.size))?;

    save_u8_image(case_dir.join("erode.png"), &erode(&view, &se))?;
    save_u8_image(case_dir.join("dilate.png"), &dilate(&view, &se))?;
    save_u8_image(case_dir.join("open.png"), &open(&view, &se))?;
    save_u8_image(case_dir.join("close.png"), &close(&view, &se))?;

    write_json(
        case_dir.join("meta.json"),
        &MetaMorphology {
            shape: args.shape,
            size: args.size,
            pixel_rule: "grayscale min/max over element taps, off-grid taps skipped",
        },
    )
}

fn run_boundary(args: BoundaryArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "boundary")?;
    let gray = load_input_gray(&args.common.input)?;
    let mask = to_binary_mask(&gray.as_view(), args.threshold);
    let se = StructuringElement::new(args.shape, args.size)
        .with_context(|| format!("building {} element of size {}", args.shape, args.size))?;

    let points = trace_boundary(&mask.as_view(), &se).context("tracing boundary")?;
    if points.is_empty() {
        warn!("no foreground above {} in {}", args.threshold, args.common.input.display());
    }
    info!("boundary: {} points", points.len());

    save_u8_image(case_dir.join("mask.png"), &labels_to_intensity(&mask))?;
    let mut overlay = gray_to_rgb(&gray)?;
    for p in &points {
        put_pixel_checked(&mut overlay, p.x, p.y, Rgb([255, 64, 64]));
    }
    save_rgb_image(case_dir.join("overlay.png"), &overlay)?;

    write_json(
        case_dir.join("boundary.json"),
        &BoundaryDto {
            threshold: args.threshold,
            shape: args.shape,
            size: args.size,
            points,
        },
    )
}

fn run_hough(args: HoughArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "hough")?;
    let gray = load_input_gray(&args.common.input)?;
    let edges = threshold(&gray.as_view(), args.edge_threshold);

    let acc = hough_transform(&edges.as_view());
    let peak_cfg = PeakConfig {
        threshold: args.peak_threshold,
        mode: match args.nms_radius {
            Some(radius) => PeakMode::LocalMaximum { radius },
            None => PeakMode::Flat,
        },
    };
    let seg_cfg = SegmentConfig {
        min_intensity: gridproc::EDGE_VALUE,
        min_length: args.min_length,
        max_gap: args.max_gap,
        final_run: if args.drop_final_run {
            FinalRun::Drop
        } else {
            FinalRun::Flush
        },
    };

    let mut peaks: Vec<(Point2i, u32)> = find_peaks_with(&acc, &peak_cfg)
        .into_iter()
        .map(|p| (p, acc.votes(p.x as usize, p.y as usize)))
        .collect();
    let peak_count = peaks.len();
    peaks.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    if peaks.len() > args.max_lines {
        debug!("hough: keeping {} of {} peaks", args.max_lines, peaks.len());
        peaks.truncate(args.max_lines);
    }

    let mut overlay = gray_to_rgb(&gray)?;
    let lines: Vec<LineDto> = peaks
        .into_iter()
        .map(|(peak, votes)| {
            let segments = detect_line_segments_with(&edges.as_view(), peak, &seg_cfg);
            for seg in &segments {
                draw_segment(&mut overlay, seg, Rgb([64, 255, 64]));
            }
            LineDto {
                peak,
                votes,
                line: acc.line_for(peak),
                segments,
            }
        })
        .collect();

    save_u8_image(case_dir.join("edges.png"), &edges)?;
    let votes = acc.as_view().map(|v| v as f32);
    save_luma_raw(
        case_dir.join("accumulator.png"),
        votes.width(),
        votes.height(),
        f32_to_u8_vis(votes.data()),
    )?;
    save_rgb_image(case_dir.join("overlay.png"), &overlay)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaHough {
            diag: acc.diag(),
            r_bins: acc.r_bins(),
            peak_config: peak_cfg,
            segment_config: seg_cfg,
            peak_count,
            lines,
        },
    )
}

fn run_keypoints(args: KeypointArgs) -> Result<()> {
    let case_dir = prepare_case(&args.common, "keypoints")?;
    let gray = load_input_gray(&args.common.input)?;
    let cfg = ScaleSpaceConfig {
        octaves: args.octaves,
        contrast_threshold: args.contrast_threshold,
        corner_threshold: args.corner_threshold,
        ..ScaleSpaceConfig::default()
    };

    let space = ScaleSpace::build(&gray.as_view(), &cfg).context("building scale space")?;
    let keypoints = keypoints_in(&space, &cfg);
    info!("keypoints: {} found", keypoints.len());

    let mut octave_sizes = Vec::new();
    for octave in space.octaves() {
        let (w, h) = octave.dims();
        octave_sizes.push([w, h]);
        for (s, dog) in octave.dogs.iter().enumerate() {
            save_luma_raw(
                case_dir.join(format!("dog_o{}_s{s}.png", octave.index)),
                w,
                h,
                f32_to_u8_vis(dog.data()),
            )?;
        }
    }

    let mut overlay = gray_to_rgb(&gray)?;
    for kp in &keypoints {
        draw_dot(&mut overlay, kp.position, Rgb([255, 64, 64]));
    }
    save_rgb_image(case_dir.join("overlay.png"), &overlay)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaKeypoints {
            config: cfg,
            octave_sizes,
            keypoints,
        },
    )
}

fn prepare_case(common: &CommonArgs, case_name: &str) -> Result<PathBuf> {
    ensure_file_exists(&common.input, "input")?;

    let case_dir = common.out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    Ok(case_dir)
}

fn load_input_gray(path: &Path) -> Result<Image<u8>> {
    let rgb = load_input_rgb(path)?;
    let total = rgb.width() * rgb.height();
    let quarter = (total / 4).max(1);
    let gray = to_grayscale_with_progress(&rgb.as_view(), |done, total| {
        if done % quarter == 0 || done == total {
            debug!("grayscale: {done}/{total} pixels");
        }
    });
    Ok(gray)
}

fn load_input_rgb(path: &Path) -> Result<Image<Rgb8>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let rgb = dyn_img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let data = rgb.pixels().map(|p| Rgb8::from(p.0)).collect();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing color grid from {}", path.display()))
}

fn save_stages(dir: &Path, prefix: &str, stages: &EdgeStages) -> Result<()> {
    save_u8_image(dir.join(format!("{prefix}_smoothed.png")), &stages.smoothed)?;
    save_u8_image(dir.join(format!("{prefix}_magnitude.png")), &stages.magnitude)?;
    save_u8_image(dir.join(format!("{prefix}_edges.png")), &stages.edges)
}

fn save_u8_image(path: PathBuf, img: &Image<u8>) -> Result<()> {
    save_luma_raw(path, img.width(), img.height(), img.data().to_vec())
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn save_rgb_image(path: PathBuf, img: &RgbImage) -> Result<()> {
    img.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn gray_to_rgb(gray: &Image<u8>) -> Result<RgbImage> {
    let luma = GrayImage::from_raw(
        gray.width() as u32,
        gray.height() as u32,
        gray.data().to_vec(),
    )
    .context("constructing GrayImage from raw bytes")?;
    Ok(image::DynamicImage::ImageLuma8(luma).to_rgb8())
}

fn labels_to_intensity(mask: &Image<u8>) -> Image<u8> {
    mask.as_view().map(|v| if v != 0 { 255 } else { 0 })
}

fn count_nonzero(img: &Image<u8>) -> usize {
    img.data().iter().filter(|&&v| v != 0).count()
}

/// Min-max normalization to `[0, 255]`; a flat input maps to black.
fn f32_to_u8_vis(data: &[f32]) -> Vec<u8> {
    let (min_v, max_v) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !(max_v - min_v).is_normal() {
        return vec![0u8; data.len()];
    }

    let scale = 255.0 / (max_v - min_v);
    data.iter()
        .map(|&v| ((v - min_v) * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn draw_segment(img: &mut RgbImage, seg: &LineSegment, color: Rgb<u8>) {
    let (dx, dy) = (seg.b.x - seg.a.x, seg.b.y - seg.a.y);
    let n = dx.abs().max(dy.abs()).max(1);
    for i in 0..=n {
        let x = seg.a.x as f32 + dx as f32 * i as f32 / n as f32;
        let y = seg.a.y as f32 + dy as f32 * i as f32 / n as f32;
        put_pixel_checked(img, x.round() as i32, y.round() as i32, color);
    }
}

fn draw_dot(img: &mut RgbImage, p: Point2i, color: Rgb<u8>) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            put_pixel_checked(img, p.x + dx, p.y + dy, color);
        }
    }
}

fn put_pixel_checked(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= img.width() || uy >= img.height() {
        return;
    }
    img.put_pixel(ux, uy, color);
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
