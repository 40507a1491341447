//! Custom `genpdf` elements used by the report composer.

use image::GenericImageView;

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const CAPTION_SPACING_MM: f64 = 2.0;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_size(image: &image::DynamicImage) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / DEFAULT_IMAGE_DPI;
    let height_mm = MM_PER_INCH * (px_height as f64) / DEFAULT_IMAGE_DPI;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// A chart image with a caption stacked underneath.
///
/// The image and the caption share one alignment, and the image can be scaled
/// to a requested width while keeping its aspect ratio.  Decoding is delegated
/// to the [`image`] crate for descriptive errors.
pub struct CaptionedImage {
    image: Image,
    caption: Paragraph,
    alignment: Alignment,
    natural_size: Size,
    requested_width: Option<Mm>,
}

impl CaptionedImage {
    /// Decodes `bytes` into an image element with the given caption text.
    pub fn from_bytes(bytes: impl AsRef<[u8]>, caption: impl Into<String>) -> Result<Self, Error> {
        let dynamic = image::load_from_memory(bytes.as_ref())
            .context("Failed to decode chart image from bytes")?;
        let natural_size = estimated_size(&dynamic);
        let image = Image::from_dynamic_image(dynamic)?;

        let mut element = Self {
            image,
            caption: Paragraph::new(caption.into()),
            alignment: Alignment::Center,
            natural_size,
            requested_width: None,
        };
        element.apply_alignment();
        Ok(element)
    }

    /// Constrains the rendered width in millimetres, preserving aspect ratio.
    pub fn with_width_mm(mut self, width_mm: f64) -> Self {
        self.requested_width = Some(mm_from_f64(width_mm));
        self
    }

    /// Sets the shared alignment of the image and its caption.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self.apply_alignment();
        self
    }

    fn apply_alignment(&mut self) {
        self.image.set_alignment(self.alignment);
        self.caption.set_alignment(self.alignment);
    }

    fn apply_width(&mut self) {
        if let Some(width) = self.requested_width {
            let natural = mm_to_f64(self.natural_size.width);
            if natural > f64::EPSILON {
                let scale = mm_to_f64(width) / natural;
                self.image.set_scale(Scale::new(scale, scale));
            }
        }
    }
}

impl Element for CaptionedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        self.apply_alignment();
        self.apply_width();

        let mut result = RenderResult::default();
        let image_result = self.image.render(context, area.clone(), style)?;
        result.size = result.size.stack_vertical(image_result.size);
        result.has_more |= image_result.has_more;

        let spacing = mm_from_f64(CAPTION_SPACING_MM);
        area.add_offset(Position::new(0, image_result.size.height + spacing));
        result.size = result.size.stack_vertical(Size::new(0, spacing));

        let caption_result = self.caption.render(context, area, style)?;
        result.size = result.size.stack_vertical(caption_result.size);
        result.has_more |= caption_result.has_more;

        Ok(result)
    }
}
