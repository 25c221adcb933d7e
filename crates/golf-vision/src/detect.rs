//! Conversions between `image` buffers and the pipeline types.

use golf_vision_core::{ColorSpace, Frame, FrameError, GrayImage, GrayImageView};

/// Wrap an `image::RgbImage` as an RGB [`Frame`].
pub fn frame_from_rgb_image(img: &::image::RgbImage) -> Result<Frame, FrameError> {
    Frame::from_raw(
        img.width() as usize,
        img.height() as usize,
        Frame::CHANNELS,
        ColorSpace::Rgb,
        img.as_raw().clone(),
    )
}

/// Render a frame as an `image::RgbImage`, converting from its colour space.
pub fn frame_to_rgb_image(frame: &Frame) -> ::image::RgbImage {
    ::image::RgbImage::from_fn(frame.width() as u32, frame.height() as u32, |x, y| {
        ::image::Rgb(frame.rgb_at(x as usize, y as usize))
    })
}

/// Borrow an `image::GrayImage` as a mask view.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a mask into an `image::GrayImage` (e.g. to save it as PNG).
pub fn mask_to_gray_image(mask: &GrayImage) -> ::image::GrayImage {
    mask.view().to_luma()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_image_round_trips_through_frame() {
        let img = ::image::RgbImage::from_fn(4, 3, |x, y| ::image::Rgb([x as u8 * 10, y as u8 * 20, 7]));
        let frame = frame_from_rgb_image(&img).expect("frame");
        assert_eq!((frame.width(), frame.height()), (4, 3));
        assert_eq!(frame.rgb_at(3, 2), [30, 40, 7]);
        assert_eq!(frame_to_rgb_image(&frame), img);
    }

    #[test]
    fn mask_converts_to_gray_image() {
        let mut mask = GrayImage::new(5, 2);
        mask.set(4, 1, 255);
        let img = mask_to_gray_image(&mask);
        assert_eq!(img.get_pixel(4, 1).0, [255]);
        assert_eq!(gray_view(&img).get(4, 1), 255);
    }
}
