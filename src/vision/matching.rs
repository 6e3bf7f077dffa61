//! Template matching
//!
//! Normalised correlation coefficient over RGB frames: both the template and
//! each frame window are mean-subtracted per channel before correlating, so
//! the score is insensitive to uniform brightness shifts. Scores lie in
//! `[-1, 1]`; 1 is a pixel-perfect match.

use image::{ImageBuffer, Luma, RgbImage};
use imageproc::template_matching::find_extremes;

use super::correlation::{cross_correlate, CentredTemplate};

/// Score for every valid alignment, indexed by the template's top-left corner
pub type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Integer pixels: any window that is not flat has a centred energy of at
/// least `1 - 1/n`, so anything below this is treated as flat.
const FLAT_ENERGY: f64 = 0.5;

/// Template matching errors
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("template is empty")]
    EmptyTemplate,
    #[error("template {template_width}x{template_height} exceeds {frame_width}x{frame_height}")]
    TemplateTooLarge {
        template_width: u32,
        template_height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// Best match of a template inside a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub score: f32,
    pub x: u32,
    pub y: u32,
}

/// Per-channel summed-area tables of a frame and of its squares
struct Integrals {
    stride: usize,
    sum: Vec<[f64; 3]>,
    sum_sq: Vec<[f64; 3]>,
}

impl Integrals {
    fn new(frame: &RgbImage) -> Self {
        let (width, height) = frame.dimensions();
        let stride = width as usize + 1;
        let mut sum = vec![[0.0; 3]; stride * (height as usize + 1)];
        let mut sum_sq = vec![[0.0; 3]; stride * (height as usize + 1)];

        for y in 0..height as usize {
            let mut row = [0.0f64; 3];
            let mut row_sq = [0.0f64; 3];
            for x in 0..width as usize {
                let pixel = frame.get_pixel(x as u32, y as u32);
                for c in 0..3 {
                    let v = pixel[c] as f64;
                    row[c] += v;
                    row_sq[c] += v * v;
                }
                let above = y * stride + x + 1;
                let here = (y + 1) * stride + x + 1;
                for c in 0..3 {
                    sum[here][c] = sum[above][c] + row[c];
                    sum_sq[here][c] = sum_sq[above][c] + row_sq[c];
                }
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    fn window(
        table: &[[f64; 3]],
        stride: usize,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> [f64; 3] {
        let a = table[y * stride + x];
        let b = table[y * stride + x + w];
        let c = table[(y + h) * stride + x];
        let d = table[(y + h) * stride + x + w];
        [
            d[0] - b[0] - c[0] + a[0],
            d[1] - b[1] - c[1] + a[1],
            d[2] - b[2] - c[2] + a[2],
        ]
    }

    /// Sum over channels of `Σ(v - mean)²` for the given window
    fn centred_energy(&self, x: usize, y: usize, w: usize, h: usize) -> f64 {
        let n = (w * h) as f64;
        let sum = Self::window(&self.sum, self.stride, x, y, w, h);
        let sum_sq = Self::window(&self.sum_sq, self.stride, x, y, w, h);
        (0..3)
            .map(|c| (sum_sq[c] - sum[c] * sum[c] / n).max(0.0))
            .sum()
    }
}

/// Score every alignment of `template` inside `frame`.
///
/// Flat windows and flat templates score 0.
pub fn match_template(frame: &RgbImage, template: &RgbImage) -> Result<ScoreMap, MatchError> {
    let (frame_width, frame_height) = frame.dimensions();
    let (template_width, template_height) = template.dimensions();

    if template_width == 0 || template_height == 0 {
        return Err(MatchError::EmptyTemplate);
    }
    if template_width > frame_width || template_height > frame_height {
        return Err(MatchError::TemplateTooLarge {
            template_width,
            template_height,
            frame_width,
            frame_height,
        });
    }

    let tw = template_width as usize;
    let th = template_height as usize;
    let n = (tw * th) as f64;

    // Mean-subtracted template, laid out like the raw RGB buffer
    let mut mean = [0.0f64; 3];
    for pixel in template.pixels() {
        for c in 0..3 {
            mean[c] += pixel[c] as f64;
        }
    }
    for m in &mut mean {
        *m /= n;
    }
    let centred: Vec<f64> = template
        .as_raw()
        .iter()
        .enumerate()
        .map(|(i, &v)| v as f64 - mean[i % 3])
        .collect();
    let template_energy: f64 = centred.iter().map(|v| v * v).sum();

    let out_width = frame_width - template_width + 1;
    let out_height = frame_height - template_height + 1;
    let mut scores = ScoreMap::new(out_width, out_height);
    if template_energy < FLAT_ENERGY {
        return Ok(scores);
    }

    // Σ t'·(f - mean_f) == Σ t'·f because Σ t' == 0
    let cross = cross_correlate(
        frame,
        &CentredTemplate {
            values: &centred,
            width: tw,
            height: th,
        },
    );
    let integrals = Integrals::new(frame);

    for y in 0..out_height as usize {
        for x in 0..out_width as usize {
            let window_energy = integrals.centred_energy(x, y, tw, th);
            let score = if window_energy < FLAT_ENERGY {
                0.0
            } else {
                let denominator = (template_energy * window_energy).sqrt();
                (cross[y * out_width as usize + x] / denominator).clamp(-1.0, 1.0)
            };

            scores.put_pixel(x as u32, y as u32, Luma([score as f32]));
        }
    }

    Ok(scores)
}

/// Highest-scoring alignment of `template` inside `frame`
pub fn best_match(frame: &RgbImage, template: &RgbImage) -> Result<MatchResult, MatchError> {
    let scores = match_template(frame, template)?;
    let extremes = find_extremes(&scores);
    let (x, y) = extremes.max_value_location;
    Ok(MatchResult {
        score: extremes.max_value,
        x,
        y,
    })
}
