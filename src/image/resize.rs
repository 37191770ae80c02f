//! Bilinear resampling used to keep every frame at the run's reference width.

use crate::image::frame::{Frame, CHANNELS};
use crate::util::{StitchError, StitchResult};

/// Resizes an RGB frame with bilinear sampling.
///
/// Destination pixel centres map back to the source with
/// `src = (dst + 0.5) * scale - 0.5`, clamped to the valid range, and each
/// channel is rounded to the nearest integer.
pub fn resize_rgb_bilinear(src: &Frame, dst_width: usize, dst_height: usize) -> StitchResult<Frame> {
    if dst_width == 0 || dst_height == 0 {
        return Err(StitchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }

    let src_width = src.width();
    let src_height = src.height();
    let rgb = src.rgb();
    let scale_x = src_width as f32 / dst_width as f32;
    let scale_y = src_height as f32 / dst_height as f32;

    // Horizontal taps are shared by every row.
    let taps_x: Vec<(usize, usize, f32)> = (0..dst_width)
        .map(|x| axis_taps(x, scale_x, src_width))
        .collect();

    let mut out = Vec::with_capacity(dst_width * dst_height * CHANNELS);
    for y in 0..dst_height {
        let (y0, y1, fy) = axis_taps(y, scale_y, src_height);
        let row0 = &rgb[y0 * src_width * CHANNELS..(y0 + 1) * src_width * CHANNELS];
        let row1 = &rgb[y1 * src_width * CHANNELS..(y1 + 1) * src_width * CHANNELS];
        for &(x0, x1, fx) in &taps_x {
            for c in 0..CHANNELS {
                let a = row0[x0 * CHANNELS + c] as f32;
                let b = row0[x1 * CHANNELS + c] as f32;
                let d = row1[x0 * CHANNELS + c] as f32;
                let e = row1[x1 * CHANNELS + c] as f32;
                let top = a + (b - a) * fx;
                let bottom = d + (e - d) * fx;
                let value = top + (bottom - top) * fy;
                out.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    Frame::from_rgb(out, dst_width, dst_height)
}

/// Scales a frame to `reference_width`, preserving its aspect ratio.
///
/// The new height is `floor(height * reference_width / width)`, never less
/// than one row. Frames already at the reference width are returned as is.
pub fn normalize_width(frame: Frame, reference_width: usize) -> StitchResult<Frame> {
    if frame.width() == reference_width {
        return Ok(frame);
    }
    let ratio = reference_width as f64 / frame.width() as f64;
    let new_height = ((frame.height() as f64 * ratio) as usize).max(1);
    resize_rgb_bilinear(&frame, reference_width, new_height)
}

fn axis_taps(dst: usize, scale: f32, src_len: usize) -> (usize, usize, f32) {
    let max = (src_len - 1) as f32;
    let pos = ((dst as f32 + 0.5) * scale - 0.5).clamp(0.0, max);
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(src_len - 1);
    (i0, i1, pos - i0 as f32)
}

#[cfg(test)]
mod tests {
    use super::{normalize_width, resize_rgb_bilinear};
    use crate::image::Frame;

    #[test]
    fn uniform_frame_stays_uniform() {
        let frame = Frame::from_rgb(vec![90; 8 * 6 * 3], 8, 6).unwrap();
        let resized = resize_rgb_bilinear(&frame, 5, 3).unwrap();
        assert_eq!(resized.width(), 5);
        assert_eq!(resized.height(), 3);
        assert!(resized.rgb().iter().all(|&v| v == 90));
    }

    #[test]
    fn normalize_width_preserves_aspect_ratio() {
        let frame = Frame::from_rgb(vec![0; 200 * 150 * 3], 200, 150).unwrap();
        let normalized = normalize_width(frame, 100).unwrap();
        assert_eq!(normalized.width(), 100);
        assert_eq!(normalized.height(), 75);

        let odd = Frame::from_rgb(vec![0; 3 * 10 * 3], 3, 10).unwrap();
        let widened = normalize_width(odd, 4).unwrap();
        assert_eq!(widened.height(), 13);
    }

    #[test]
    fn normalize_width_is_identity_at_reference() {
        let frame = Frame::from_gray(&[1, 2, 3, 4], 2, 2).unwrap();
        let same = normalize_width(frame, 2).unwrap();
        assert_eq!(same.luma().as_slice(), &[1, 2, 3, 4]);
    }
}
