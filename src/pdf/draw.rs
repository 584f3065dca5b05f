use pdf_writer::types::TextRenderingMode;
use pdf_writer::{Content, Name, Str};

use crate::fonts::{EmbeddedFont, FontFace};
use crate::geometry::PageGeometry;
use crate::layout::{Align, ComposedLine};

/// Fraction of the font size between the top of a line box and its baseline.
pub(super) const ASCENT_RATIO: f32 = 0.75;

/// A composed line pinned to a page: `top` is the line box's top edge,
/// measured down from the top of the page.
pub(super) struct PositionedLine {
    pub(super) top: f32,
    pub(super) line: ComposedLine,
}

impl PositionedLine {
    pub(super) fn baseline(&self) -> f32 {
        self.top + self.line.style.size * ASCENT_RATIO
    }

    pub(super) fn x(&self, face: &FontFace, geometry: &PageGeometry) -> f32 {
        match self.line.align {
            Align::Left => geometry.margin_left,
            Align::Right => {
                geometry.width
                    - geometry.margin_right
                    - face.text_width(&self.line.text, self.line.style.size)
            }
        }
    }
}

pub(super) struct LineFont<'f> {
    pub(super) embedded: &'f EmbeddedFont,
    pub(super) face: &'f FontFace,
    pub(super) synthetic_bold: bool,
}

/// Content stream for one page, skipping redundant color and font operators.
pub(super) struct PageCanvas<'g> {
    content: Content,
    geometry: &'g PageGeometry,
    fill: Option<[u8; 3]>,
    font: Option<(String, f32)>,
}

impl<'g> PageCanvas<'g> {
    pub(super) fn new(geometry: &'g PageGeometry) -> Self {
        PageCanvas {
            content: Content::new(),
            geometry,
            fill: None,
            font: None,
        }
    }

    pub(super) fn draw(&mut self, line: &PositionedLine, font: &LineFont<'_>, color: [u8; 3]) {
        let bytes = font.embedded.encode(&line.line.text);
        if bytes.is_empty() {
            return;
        }
        let x = line.x(font.face, self.geometry);
        let y = self.geometry.to_pdf_y(line.baseline());
        let size = line.line.style.size;
        let [r, g, b] = color.map(|c| c as f32 / 255.0);

        if font.synthetic_bold {
            // Stroked text state is scoped to q/Q so the tracked state stays valid.
            self.content.save_state();
            self.content.set_fill_rgb(r, g, b);
            self.content.set_stroke_rgb(r, g, b);
            self.content.set_line_width((size * 0.03).max(0.3));
            self.content.begin_text();
            self.content
                .set_text_rendering_mode(TextRenderingMode::FillStroke);
            self.content
                .set_font(Name(font.embedded.pdf_name.as_bytes()), size);
            self.content.next_line(x, y);
            self.content.show(Str(&bytes));
            self.content.end_text();
            self.content.restore_state();
            return;
        }

        if self.fill != Some(color) {
            if color == [0, 0, 0] {
                self.content.set_fill_gray(0.0);
            } else {
                self.content.set_fill_rgb(r, g, b);
            }
            self.fill = Some(color);
        }
        self.content.begin_text();
        let wanted = (font.embedded.pdf_name.clone(), size);
        if self.font.as_ref() != Some(&wanted) {
            self.content
                .set_font(Name(font.embedded.pdf_name.as_bytes()), size);
            self.font = Some(wanted);
        }
        self.content.next_line(x, y);
        self.content.show(Str(&bytes));
        self.content.end_text();
    }

    /// Finished, Flate-compressed content stream.
    pub(super) fn finish(self) -> Vec<u8> {
        let raw = self.content.finish();
        miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6)
    }
}
