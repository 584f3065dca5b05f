/// Page size and margins in PDF points, y measured downward from the top edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.0,
        height: 842.0,
        margin_top: 50.0,
        margin_bottom: 50.0,
        margin_left: 50.0,
        margin_right: 50.0,
    };

    pub fn with_margins(width: f32, height: f32, margin: f32) -> Self {
        PageGeometry {
            width,
            height,
            margin_top: margin,
            margin_bottom: margin,
            margin_left: margin,
            margin_right: margin,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Lowest y a block may reach without spilling into the bottom margin.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin_bottom
    }

    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Convert a top-down y offset to PDF user space (origin bottom-left).
    pub(crate) fn to_pdf_y(&self, y: f32) -> f32 {
        self.height - y
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::A4
    }
}
