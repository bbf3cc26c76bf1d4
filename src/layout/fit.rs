//! # Image Fitting
//!
//! Scale-to-fit placement of an image inside a page's usable area. The
//! scale is the largest one that keeps both sides inside the usable area, so
//! small images are enlarged and large ones shrunk; the aspect ratio never
//! changes and the result is centered on both axes.

use serde::Serialize;

use crate::error::{LayoutError, Result};
use crate::model::{BorderSpec, BorderStyle, ImageSpec, PageGeometry, Placement};

/// Fit an image into the usable area of a page and center it.
pub fn fit(image: &ImageSpec, page: &PageGeometry) -> Result<Placement> {
    if image.width_px == 0 || image.height_px == 0 {
        return Err(LayoutError::InvalidDimensions(format!(
            "image is {}x{} pixels",
            image.width_px, image.height_px
        )));
    }

    let usable_w = page.usable_width();
    let usable_h = page.usable_height();
    let px_w = image.width_px as f64;
    let px_h = image.height_px as f64;

    let ratio = (usable_w / px_w).min(usable_h / px_h);
    let width = px_w * ratio;
    let height = px_h * ratio;

    Ok(Placement {
        x: page.margin() + (usable_w - width) / 2.0,
        y: page.margin() + (usable_h - height) / 2.0,
        width,
        height,
    })
}

/// The stroke rectangle for a bordered image: the placement grown outward by
/// the stroke width on every side. `None` when the style is `none`.
pub fn border_rect(placement: &Placement, border: &BorderSpec) -> Option<Placement> {
    if border.style == BorderStyle::None {
        return None;
    }
    Some(placement.expand(border.stroke_width))
}

/// One entry of a multi-page image sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencedImage {
    pub page_index: usize,
    pub placement: Placement,
}

/// Lay out images one per page, in input order.
pub fn layout_sequence(images: &[ImageSpec], page: &PageGeometry) -> Result<Vec<SequencedImage>> {
    if images.is_empty() {
        return Err(LayoutError::EmptyInput { what: "image" });
    }
    images
        .iter()
        .enumerate()
        .map(|(page_index, image)| {
            Ok(SequencedImage {
                page_index,
                placement: fit(image, page)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    fn a4() -> PageGeometry {
        PageGeometry::new(210.0, 297.0, 10.0).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn landscape_image_is_width_bound() {
        let p = fit(&ImageSpec::new(800, 600), &a4()).unwrap();
        assert_close(p.width, 190.0);
        assert_close(p.height, 142.5);
        assert_close(p.x, 10.0);
        assert_close(p.y, (277.0 - 142.5) / 2.0 + 10.0);
    }

    #[test]
    fn portrait_image_is_width_bound_on_a4() {
        let p = fit(&ImageSpec::new(600, 800), &a4()).unwrap();
        assert_close(p.width, 190.0);
        assert!((p.height - 253.333_333).abs() < 1e-5);
    }

    #[test]
    fn tall_image_is_height_bound() {
        let p = fit(&ImageSpec::new(100, 1000), &a4()).unwrap();
        assert_close(p.height, 277.0);
        assert_close(p.width, 27.7);
        assert_close(p.y, 10.0);
        assert_close(p.x, 10.0 + (190.0 - 27.7) / 2.0);
    }

    #[test]
    fn small_image_is_scaled_up() {
        let p = fit(&ImageSpec::new(19, 10), &a4()).unwrap();
        assert_close(p.width, 190.0);
        assert_close(p.height, 100.0);
    }

    #[test]
    fn zero_pixels_rejected() {
        assert!(matches!(
            fit(&ImageSpec::new(0, 10), &a4()),
            Err(LayoutError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn border_expands_by_stroke() {
        let p = Placement {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        };
        let border = BorderSpec {
            style: BorderStyle::Dotted,
            color: Color::BLACK,
            stroke_width: 2.0,
        };
        let rect = border_rect(&p, &border).unwrap();
        assert_eq!(
            rect,
            Placement {
                x: 8.0,
                y: 18.0,
                width: 104.0,
                height: 54.0
            }
        );

        let none = BorderSpec {
            style: BorderStyle::None,
            ..border
        };
        assert!(border_rect(&p, &none).is_none());
    }

    #[test]
    fn sequence_numbers_pages() {
        let images = [ImageSpec::new(800, 600), ImageSpec::new(600, 800), ImageSpec::new(1, 1)];
        let seq = layout_sequence(&images, &a4()).unwrap();
        assert_eq!(seq.len(), 3);
        for (i, entry) in seq.iter().enumerate() {
            assert_eq!(entry.page_index, i);
            assert_eq!(entry.placement, fit(&images[i], &a4()).unwrap());
        }
    }

    #[test]
    fn empty_sequence_rejected() {
        assert!(matches!(
            layout_sequence(&[], &a4()),
            Err(LayoutError::EmptyInput { what: "image" })
        ));
    }

    #[test]
    fn bad_image_in_sequence_fails_whole_sequence() {
        let images = [ImageSpec::new(10, 10), ImageSpec::new(10, 0)];
        assert!(layout_sequence(&images, &a4()).is_err());
    }
}
