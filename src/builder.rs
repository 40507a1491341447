//! Document construction for the sales report.
//!
//! Wraps `genpdf::Document` creation with the bundled font family and a page
//! decorator that repeats the report header on every page and reserves a
//! fixed-height strip for the page-number footer.

use genpdf::elements::Paragraph;
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{self, Style};
use genpdf::{self, Alignment, Element, Mm, PageDecorator, PaperSize, Position};

use crate::fonts;

const PAGE_MARGINS_MM: f64 = 15.0;
const FOOTER_HEIGHT_MM: f64 = 12.0;
const HEADER_FONT_SIZE: u8 = 11;
const FOOTER_FONT_SIZE: u8 = 8;

/// Builds a `genpdf::Document` configured for the sales report: A4 paper,
/// uniform margins, a repeating centered header line, and a page-number
/// footer.
pub struct ReportDocumentBuilder {
    header_title: String,
}

impl ReportDocumentBuilder {
    pub fn new(header_title: impl Into<String>) -> Self {
        Self {
            header_title: header_title.into(),
        }
    }

    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::default_font_family()?;
        let mut document = genpdf::Document::new(font_family);
        document.set_paper_size(PaperSize::A4);
        document.set_title(self.header_title.clone());

        document.set_page_decorator(ReportPageDecorator::new(self.header_title));
        Ok(document)
    }
}

/// Page decorator that draws the running header and footer and shrinks the
/// content area accordingly.
struct ReportPageDecorator {
    page: usize,
    header_title: String,
}

impl ReportPageDecorator {
    fn new(header_title: String) -> Self {
        Self {
            page: 0,
            header_title,
        }
    }

    fn header(&self) -> impl Element {
        let mut title = Paragraph::new(self.header_title.clone());
        title.set_alignment(Alignment::Center);
        title.styled(Style::new().bold().with_font_size(HEADER_FONT_SIZE))
    }

    fn footer(&self) -> impl Element {
        let mut line = Paragraph::new(format!("Page {}", self.page));
        line.set_alignment(Alignment::Center);
        line.styled(Style::new().italic().with_font_size(FOOTER_FONT_SIZE))
    }
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        area.add_margins(PAGE_MARGINS_MM);

        let mut header = self.header();
        let header_result = header.render(context, area.clone(), style)?;
        // Blank line between the header rule and the body.
        area.add_offset(Position::new(0, header_result.size.height + Mm::from(4.0)));

        let footer_height = Mm::from(FOOTER_HEIGHT_MM);
        let available = area.size().height;
        if footer_height > available {
            return Err(Error::new(
                "Footer height exceeds available space",
                ErrorKind::InvalidData,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - footer_height));
        let mut footer = self.footer();
        let footer_result = footer.render(context, footer_area, style)?;
        if footer_result.has_more {
            return Err(Error::new(
                "Footer does not fit into the reserved space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - footer_height);
        Ok(area)
    }
}
