//! Conversions between `image` crate buffers and pipeline frames.
//!
//! Only the examples and offline tooling go through here; the pipeline core
//! never touches file formats.

use cone_track_core::{Frame, RgbImage};

use crate::pipeline::PipelineError;

/// Wrap a decoded `image` RGB8 buffer as a pipeline frame.
pub fn frame_from_rgb8(img: &::image::RgbImage, timestamp_us: i64) -> Result<Frame, PipelineError> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let data = img.as_raw().clone();
    let expected = w * h * 3;
    let got = data.len();
    let rgb = RgbImage::from_raw(w, h, data)
        .ok_or(PipelineError::InvalidFrameBuffer { expected, got })?;
    Ok(Frame::new(rgb, timestamp_us))
}

/// Convert an annotated pipeline image back into an `image` buffer for saving.
pub fn annotated_to_rgb8(img: &RgbImage) -> Result<::image::RgbImage, PipelineError> {
    let expected = img.width() * img.height() * 3;
    ::image::RgbImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .ok_or(PipelineError::InvalidFrameBuffer {
            expected,
            got: img.data().len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_rgb_buffer() {
        let mut src = ::image::RgbImage::new(4, 3);
        src.put_pixel(2, 1, ::image::Rgb([10, 20, 30]));
        let frame = frame_from_rgb8(&src, 5).unwrap();
        assert_eq!(frame.timestamp_us, 5);
        assert_eq!(frame.image.pixel(2, 1), [10, 20, 30]);

        let back = annotated_to_rgb8(&frame.image).unwrap();
        assert_eq!(back.get_pixel(2, 1).0, [10, 20, 30]);
    }
}
