//! PDF rendering tests.  These require the bundled fonts (see
//! `assets/fonts/README.md`); when the fonts are missing they skip with an
//! explanatory message instead of failing.

use sales_reporter::analysis::analyze;
use sales_reporter::charts::{render_monthly_chart, render_product_chart};
use sales_reporter::data::{load_records, SAMPLE_DATA};
use sales_reporter::fonts;
use sales_reporter::report::{compose_document, ChartImages};
use sha2::{Digest, Sha256};
use std::io::Write;

const FIXED_TIMESTAMP: &str = "2023-04-01 12:00:00";

fn render_sample_report() -> Option<Vec<u8>> {
    if !fonts::default_fonts_available() {
        return None;
    }

    let mut data_file = tempfile::NamedTempFile::new().expect("create temp file");
    data_file
        .write_all(SAMPLE_DATA.as_bytes())
        .expect("write sample data");

    let records = load_records(data_file.path()).expect("load sample data");
    let analysis = analyze(&records).expect("analyze sample data");
    let charts = ChartImages {
        product_chart: render_product_chart(&analysis).expect("render bar chart"),
        monthly_chart: render_monthly_chart(&analysis).expect("render line chart"),
    };

    let document =
        compose_document(&analysis, &charts, FIXED_TIMESTAMP).expect("compose document");
    let mut bytes = Vec::new();
    document.render(&mut bytes).expect("render pdf");
    Some(bytes)
}

/// Blanks out the volatile metadata the PDF backend embeds (timestamps,
/// document IDs) so renders of identical content hash identically.
fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            else {
                break;
            };
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(&mut normalized, b"<xmp:MetadataDate>", b"</xmp:MetadataDate>");
    scrub_xml(&mut normalized, b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>");
    scrub_xml(&mut normalized, b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>");
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

#[test]
fn renders_non_empty_report() {
    let Some(bytes) = render_sample_report() else {
        eprintln!(
            "Skipping renders_non_empty_report: bundled fonts missing. Set SALES_REPORTER_FONTS_DIR or install assets/fonts."
        );
        return;
    };
    assert!(
        bytes.starts_with(b"%PDF"),
        "rendered report should be a PDF document"
    );
}

#[test]
fn rendering_is_deterministic() {
    let (Some(bytes_a), Some(bytes_b)) = (render_sample_report(), render_sample_report()) else {
        eprintln!(
            "Skipping rendering_is_deterministic: bundled fonts missing. Set SALES_REPORTER_FONTS_DIR or install assets/fonts."
        );
        return;
    };

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "report renders must be deterministic after metadata normalization"
    );
}
