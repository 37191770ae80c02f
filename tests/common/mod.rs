//! Synthetic scrolling documents shared by the integration tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scrollstitch::{Frame, FrameReport, ProgressEvent, ProgressSink};

/// A tall RGB page; frames are viewport-sized windows onto it.
pub struct Document {
    pub rgb: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Document {
    /// Random RGB noise: every window correlates only with itself.
    pub fn random(width: usize, height: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let rgb = (0..width * height * 3).map(|_| rng.random::<u8>()).collect();
        Self { rgb, width, height }
    }

    /// Solid colour bands of `band` rows, each pixel jittered by up to
    /// `±texture` per channel so no two rows of the page look alike.
    pub fn banded(width: usize, height: usize, band: usize, texture: i16, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rgb = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            let b = (y / band) as i16;
            let base = [
                (b * 67 + 40) % 176 + 40,
                (b * 101 + 90) % 176 + 40,
                (b * 37 + 150) % 176 + 40,
            ];
            for _ in 0..width {
                for channel in base {
                    let value = channel + rng.random_range(-texture..=texture);
                    rgb.push(value.clamp(0, 255) as u8);
                }
            }
        }
        Self { rgb, width, height }
    }

    /// Rows `top..top + rows` as a frame.
    pub fn window(&self, top: usize, rows: usize) -> Frame {
        let stride = self.width * 3;
        let bytes = self.rgb[top * stride..(top + rows) * stride].to_vec();
        Frame::from_rgb(bytes, self.width, rows).unwrap()
    }

    /// Raw RGB bytes of the first `rows` rows.
    pub fn head(&self, rows: usize) -> &[u8] {
        &self.rgb[..rows * self.width * 3]
    }
}

/// Frames scrolled down the document at the given window tops.
pub fn frames_at(doc: &Document, tops: &[usize], rows: usize) -> Vec<Frame> {
    tops.iter().map(|&top| doc.window(top, rows)).collect()
}

/// Upscales a frame by pixel duplication.
pub fn upscale(frame: &Frame, factor: usize) -> Frame {
    let (w, h) = (frame.width(), frame.height());
    let src = frame.rgb();
    let mut out = Vec::with_capacity(w * h * factor * factor * 3);
    for y in 0..h * factor {
        for x in 0..w * factor {
            let idx = ((y / factor) * w + x / factor) * 3;
            out.extend_from_slice(&src[idx..idx + 3]);
        }
    }
    Frame::from_rgb(out, w * factor, h * factor).unwrap()
}

/// Progress sink that keeps everything it is given.
#[derive(Default)]
pub struct Recorder {
    pub frames: Vec<FrameReport>,
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for Recorder {
    fn on_frame(&mut self, report: &FrameReport) {
        self.frames.push(*report);
    }

    fn on_progress(&mut self, event: &ProgressEvent) {
        self.events.push(*event);
    }
}
