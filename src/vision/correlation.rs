//! Cross term of the correlation coefficient
//!
//! For every valid alignment `(x, y)` this computes
//! `Σ t'(u, v) · f(x + u, y + v)` summed over R, G and B, where `t'` is the
//! mean-subtracted template. Small templates are correlated directly; large
//! ones go through the frequency domain, where the cost no longer grows with
//! the template area.

use std::sync::Arc;

use image::RgbImage;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Mean-subtracted template in RGB raw layout
pub(crate) struct CentredTemplate<'a> {
    pub values: &'a [f64],
    pub width: usize,
    pub height: usize,
}

/// Cross term for every alignment, row-major over the valid output area
pub(crate) fn cross_correlate(frame: &RgbImage, template: &CentredTemplate<'_>) -> Vec<f64> {
    if prefers_spectral(frame.width() as usize, frame.height() as usize, template) {
        spectral(frame, template)
    } else {
        direct(frame, template)
    }
}

/// Rough operation counts of both methods
fn prefers_spectral(
    frame_width: usize,
    frame_height: usize,
    template: &CentredTemplate<'_>,
) -> bool {
    let out = (frame_width - template.width + 1) * (frame_height - template.height + 1);
    let direct_cost = out * template.width * template.height * 3;

    let area = fast_len(frame_width) * fast_len(frame_height);
    let log = (usize::BITS - area.leading_zeros()) as usize;
    // six forward transforms, one inverse, each a row and a column pass
    let spectral_cost = 7 * 2 * area * log;

    direct_cost > spectral_cost
}

pub(crate) fn direct(frame: &RgbImage, template: &CentredTemplate<'_>) -> Vec<f64> {
    let frame_width = frame.width() as usize;
    let out_width = frame_width - template.width + 1;
    let out_height = frame.height() as usize - template.height + 1;

    let raw = frame.as_raw();
    let frame_row = frame_width * 3;
    let template_row = template.width * 3;

    let mut out = vec![0.0; out_width * out_height];
    for y in 0..out_height {
        for x in 0..out_width {
            let mut cross = 0.0f64;
            for ty in 0..template.height {
                let start = (y + ty) * frame_row + x * 3;
                let frame_slice = &raw[start..start + template_row];
                let template_slice = &template.values[ty * template_row..(ty + 1) * template_row];
                cross += frame_slice
                    .iter()
                    .zip(template_slice)
                    .map(|(&f, &t)| f64::from(f) * t)
                    .sum::<f64>();
            }
            out[y * out_width + x] = cross;
        }
    }
    out
}

pub(crate) fn spectral(frame: &RgbImage, template: &CentredTemplate<'_>) -> Vec<f64> {
    let frame_width = frame.width() as usize;
    let frame_height = frame.height() as usize;
    let out_width = frame_width - template.width + 1;
    let out_height = frame_height - template.height + 1;

    // Padding to at least the frame size keeps every valid alignment clear
    // of circular wrap-around
    let plan = Plan2d::new(fast_len(frame_width), fast_len(frame_height));
    let zero = Complex::new(0.0, 0.0);

    let mut product = vec![zero; plan.len()];
    for channel in 0..3 {
        let mut frame_plane = vec![zero; plan.len()];
        for (x, y, pixel) in frame.enumerate_pixels() {
            frame_plane[y as usize * plan.width + x as usize] =
                Complex::new(f64::from(pixel[channel]), 0.0);
        }

        let mut template_plane = vec![zero; plan.len()];
        for v in 0..template.height {
            for u in 0..template.width {
                let value = template.values[(v * template.width + u) * 3 + channel];
                template_plane[v * plan.width + u] = Complex::new(value, 0.0);
            }
        }

        let frame_spectrum = plan.forward(frame_plane);
        let template_spectrum = plan.forward(template_plane);
        for ((acc, f), t) in product
            .iter_mut()
            .zip(&frame_spectrum)
            .zip(&template_spectrum)
        {
            *acc += *f * t.conj();
        }
    }

    let spatial = plan.inverse(product);
    let scale = 1.0 / plan.len() as f64;

    let mut out = vec![0.0; out_width * out_height];
    for y in 0..out_height {
        for x in 0..out_width {
            out[y * out_width + x] = spatial[y * plan.width + x].re * scale;
        }
    }
    out
}

/// Row and column transforms for one padded size. Spectra are kept in
/// column-major order between `forward` and `inverse`.
struct Plan2d {
    width: usize,
    height: usize,
    row_forward: Arc<dyn Fft<f64>>,
    column_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    column_inverse: Arc<dyn Fft<f64>>,
}

impl Plan2d {
    fn new(width: usize, height: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            width,
            height,
            row_forward: planner.plan_fft_forward(width),
            column_forward: planner.plan_fft_forward(height),
            row_inverse: planner.plan_fft_inverse(width),
            column_inverse: planner.plan_fft_inverse(height),
        }
    }

    fn len(&self) -> usize {
        self.width * self.height
    }

    fn forward(&self, mut rows: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        self.row_forward.process(&mut rows);
        let mut columns = transpose(&rows, self.width, self.height);
        self.column_forward.process(&mut columns);
        columns
    }

    fn inverse(&self, mut columns: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        self.column_inverse.process(&mut columns);
        let mut rows = transpose(&columns, self.height, self.width);
        self.row_inverse.process(&mut rows);
        rows
    }
}

/// Transpose a `height` × `width` row-major buffer
fn transpose(data: &[Complex<f64>], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = data[y * width + x];
        }
    }
    out
}

/// Smallest length `>= n` whose only prime factors are 2, 3 and 5
fn fast_len(n: usize) -> usize {
    (n.max(1)..)
        .find(|&candidate| {
            let mut rest = candidate;
            for p in [2, 3, 5] {
                while rest % p == 0 {
                    rest /= p;
                }
            }
            rest == 1
        })
        .unwrap_or(n)
}
