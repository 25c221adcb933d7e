//! External contour extraction on a binary mask.
//!
//! Foreground is every non-zero pixel, connected through 8-neighbourhoods.
//! Borders are followed with `imageproc`'s border-following contour finder;
//! only outer borders without a parent are kept, so components sitting
//! inside holes of other components are skipped. Every boundary pixel is
//! kept, in traversal order, starting at the component's first pixel in
//! raster order.

use golf_vision_core::{GrayImageView, PixelRect};
use imageproc::contours::{find_contours, BorderType};

/// Closed boundary as a sequence of pixel coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<(i64, i64)>,
}

impl Contour {
    /// Closed arc length.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                ((x1 - x0) as f64).hypot((y1 - y0) as f64)
            })
            .sum()
    }

    /// Polygon area by the shoelace formula.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                x0 * y1 - x1 * y0
            })
            .sum();
        twice.abs() as f64 * 0.5
    }

    /// Smallest upright rectangle containing every boundary pixel.
    pub fn bounding_rect(&self) -> PixelRect {
        let Some(&(fx, fy)) = self.points.first() else {
            return PixelRect::default();
        };
        let (mut x0, mut y0, mut x1, mut y1) = (fx, fy, fx, fy);
        for &(x, y) in &self.points[1..] {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        PixelRect::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0 + 1) as u32,
            (y1 - y0 + 1) as u32,
        )
    }
}

/// Outer contours of all external components, in raster order of their
/// first pixel.
pub fn find_external_contours(mask: &GrayImageView<'_>) -> Vec<Contour> {
    if mask.width == 0 || mask.height == 0 {
        return Vec::new();
    }
    find_contours::<i64>(&mask.to_luma())
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour {
            points: c.points.into_iter().map(|p| (p.x, p.y)).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use golf_vision_core::GrayImage;

    fn rect_mask(w: usize, h: usize, rects: &[(usize, usize, usize, usize)]) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = rects
                .iter()
                .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
            if inside {
                255
            } else {
                0
            }
        })
    }

    #[test]
    fn rectangle_boundary_has_expected_metrics() {
        let mask = rect_mask(20, 20, &[(3, 4, 5, 8)]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        let c = &contours[0];

        // every boundary pixel once: 2*(5+8) - 4
        assert_eq!(c.points.len(), 22);
        assert_eq!(c.bounding_rect(), PixelRect::new(3, 4, 5, 8));
        assert!((c.perimeter() - 22.0).abs() < 1e-12);
        assert!((c.area() - 28.0).abs() < 1e-12);
    }

    #[test]
    fn components_inside_holes_are_not_external() {
        // ring with a dot in its hole, plus a separate blob
        let mut mask = rect_mask(30, 20, &[(2, 2, 11, 11), (20, 5, 4, 4)]);
        for y in 4..11 {
            for x in 4..11 {
                mask.set(x, y, 0);
            }
        }
        mask.set(7, 7, 255);

        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].bounding_rect(), PixelRect::new(2, 2, 11, 11));
        assert_eq!(contours[1].bounding_rect(), PixelRect::new(20, 5, 4, 4));
    }

    #[test]
    fn diagonal_pixels_form_one_component() {
        let mut mask = GrayImage::new(6, 6);
        mask.set(1, 1, 255);
        mask.set(2, 2, 255);
        mask.set(3, 3, 255);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), PixelRect::new(1, 1, 3, 3));
        assert_eq!(contours[0].area(), 0.0);
    }

    #[test]
    fn single_pixel_and_empty_masks() {
        let mut mask = GrayImage::new(4, 4);
        assert!(find_external_contours(&mask.view()).is_empty());

        mask.set(2, 1, 9);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), PixelRect::new(2, 1, 1, 1));
        assert_eq!(contours[0].perimeter(), 0.0);
    }

    #[test]
    fn component_touching_the_border_is_traced() {
        let mask = rect_mask(8, 8, &[(0, 0, 3, 8)]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), PixelRect::new(0, 0, 3, 8));
    }
}
