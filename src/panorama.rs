//! The growing composite image and the append policy.
//!
//! A panorama starts as a verbatim copy of the first frame. Its width never
//! changes and its height only grows, by exactly the number of rows reported
//! from each accepted append. Both the RGB pixels and their luminance are
//! kept, so the template for the next frame is a plain view over the tail.

use crate::image::frame::CHANNELS;
use crate::image::{Frame, ImageView};
use crate::params::StitchParams;
use crate::search::MatchResult;
use crate::util::{StitchError, StitchResult};

/// Result of offering a frame to the panorama.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The match score did not exceed the quality threshold.
    LowConfidence,
    /// The matched region reaches the bottom of the frame.
    NoNewContent,
    /// The surplus below the match was at most `min_scroll` rows.
    TrivialSurplus(usize),
    /// This many rows were appended.
    Appended(usize),
}

impl AppendOutcome {
    /// Rows added to the panorama by this outcome.
    pub fn rows_added(&self) -> usize {
        match self {
            AppendOutcome::Appended(rows) => *rows,
            _ => 0,
        }
    }
}

/// Owned composite image.
#[derive(Clone)]
pub struct Panorama {
    rgb: Vec<u8>,
    luma: Vec<u8>,
    width: usize,
    height: usize,
}

impl Panorama {
    /// Creates a panorama from the first frame of a run.
    pub fn from_first_frame(frame: &Frame) -> Self {
        Self {
            rgb: frame.rgb().to_vec(),
            luma: frame.luma().as_slice().to_vec(),
            width: frame.width(),
            height: frame.height(),
        }
    }

    /// Returns the panorama width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the panorama height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if the panorama holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the interleaved RGB buffer.
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// Returns the luminance view of the whole panorama.
    pub fn luma(&self) -> ImageView<'_, u8> {
        ImageView::from_parts(&self.luma, self.width, self.height)
    }

    /// Returns the search template: the bottom `template_height` rows, or
    /// everything if the panorama is shorter.
    pub fn template(&self, template_height: usize) -> ImageView<'_, u8> {
        self.luma().bottom(template_height)
    }

    /// Applies the append policy for one matched frame.
    ///
    /// Rows below `match.content_start()` are appended only when the score
    /// exceeds the quality threshold and the surplus exceeds `min_scroll`.
    pub fn try_append(
        &mut self,
        frame: &Frame,
        matched: &MatchResult,
        params: &StitchParams,
    ) -> StitchResult<AppendOutcome> {
        if frame.width() != self.width {
            return Err(StitchError::WidthMismatch {
                expected: self.width,
                got: frame.width(),
            });
        }
        if matched.score.is_nan() || matched.score <= params.quality_threshold {
            return Ok(AppendOutcome::LowConfidence);
        }
        let content_start = matched.content_start();
        if content_start >= frame.height() {
            return Ok(AppendOutcome::NoNewContent);
        }
        let surplus = frame.height() - content_start;
        if surplus <= params.min_scroll {
            return Ok(AppendOutcome::TrivialSurplus(surplus));
        }

        self.append_rows(frame, content_start);
        Ok(AppendOutcome::Appended(surplus))
    }

    fn append_rows(&mut self, frame: &Frame, start: usize) {
        let rows = frame.height() - start;
        self.rgb.reserve(rows * self.width * CHANNELS);
        self.rgb.extend_from_slice(frame.rgb_rows_from(start));
        self.luma.extend_from_slice(frame.luma_rows_from(start));
        self.height += rows;
    }

    /// Consumes the panorama and returns `(rgb, width, height)`.
    pub fn into_parts(self) -> (Vec<u8>, usize, usize) {
        (self.rgb, self.width, self.height)
    }
}

impl std::fmt::Debug for Panorama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panorama")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{AppendOutcome, Panorama};
    use crate::image::Frame;
    use crate::params::StitchParams;
    use crate::search::MatchResult;

    fn ramp(width: usize, height: usize, base: u8) -> Frame {
        let data: Vec<u8> = (0..width * height)
            .map(|i| base.wrapping_add((i / width) as u8))
            .collect();
        Frame::from_gray(&data, width, height).unwrap()
    }

    fn matched(score: f32, offset_y: usize, template_rows: usize) -> MatchResult {
        MatchResult {
            score,
            offset_x: 0,
            offset_y,
            template_rows,
        }
    }

    #[test]
    fn appends_surplus_rows() {
        let mut pano = Panorama::from_first_frame(&ramp(4, 120, 0));
        let frame = ramp(4, 120, 50);
        let params = StitchParams::default();

        let outcome = pano
            .try_append(&frame, &matched(0.99, 10, 100), &params)
            .unwrap();
        assert_eq!(outcome, AppendOutcome::Appended(10));
        assert_eq!(pano.height(), 130);
        assert_eq!(pano.width(), 4);
        assert_eq!(pano.luma().row(120).unwrap(), &[160; 4]);
        assert_eq!(pano.rgb().len(), 4 * 130 * 3);
    }

    #[test]
    fn rejection_paths_leave_panorama_unchanged() {
        let mut pano = Panorama::from_first_frame(&ramp(4, 120, 0));
        let frame = ramp(4, 120, 7);
        let params = StitchParams::default();

        let low = pano.try_append(&frame, &matched(0.8, 0, 100), &params);
        assert_eq!(low.unwrap(), AppendOutcome::LowConfidence);
        let nan = pano.try_append(&frame, &matched(f32::NAN, 0, 100), &params);
        assert_eq!(nan.unwrap(), AppendOutcome::LowConfidence);
        let none = pano.try_append(&frame, &matched(0.95, 20, 100), &params);
        assert_eq!(none.unwrap(), AppendOutcome::NoNewContent);
        let jitter = pano.try_append(&frame, &matched(0.95, 15, 100), &params);
        assert_eq!(jitter.unwrap(), AppendOutcome::TrivialSurplus(5));
        assert_eq!(pano.height(), 120);
    }

    #[test]
    fn template_covers_whole_short_panorama() {
        let pano = Panorama::from_first_frame(&ramp(3, 40, 0));
        assert_eq!(pano.template(100).height(), 40);
        assert_eq!(pano.template(10).height(), 10);
        assert_eq!(pano.template(10).row(0).unwrap(), &[30; 3]);
    }

    #[test]
    fn rejects_frames_of_another_width() {
        let mut pano = Panorama::from_first_frame(&ramp(4, 10, 0));
        let res = pano.try_append(&ramp(5, 10, 0), &matched(1.0, 0, 5), &StitchParams::default());
        assert!(res.is_err());
    }
}
