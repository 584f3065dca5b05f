mod draw;

use std::collections::HashSet;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::cancel::CancellationSignal;
use crate::config::PageSelection;
use crate::error::Error;
use crate::fonts::{EmbeddedFont, FontSet, Weight};
use crate::layout::{Ink, Layout, compose};
use crate::model::Template;

use draw::{LineFont, PageCanvas, PositionedLine};

const BODY_COLOR: [u8; 3] = [0, 0, 0];
const MUTED_COLOR: [u8; 3] = [136, 136, 136];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FontSlot {
    Regular,
    Bold,
}

impl FontSlot {
    fn of(fonts: &FontSet, weight: Weight) -> FontSlot {
        match fonts.face(weight) {
            (_, true) => FontSlot::Regular,
            _ if weight == Weight::Bold => FontSlot::Bold,
            _ => FontSlot::Regular,
        }
    }

    fn weight(self) -> Weight {
        match self {
            FontSlot::Regular => Weight::Regular,
            FontSlot::Bold => Weight::Bold,
        }
    }
}

pub(crate) struct RenderedPdf {
    pub(crate) bytes: Vec<u8>,
    /// Zero-based layout pages that made it into the file, in order.
    pub(crate) pages: Vec<usize>,
}

fn ink_color(ink: Ink, template: Template) -> [u8; 3] {
    match ink {
        Ink::Accent => template.accent(),
        Ink::Body => BODY_COLOR,
        Ink::Muted => MUTED_COLOR,
    }
}

/// Replay the layout's block positions as lines on one page.
fn page_lines(layout: &Layout<'_>, page: usize, fonts: &FontSet) -> Vec<PositionedLine> {
    let wrap_width = layout.geometry().content_width();
    layout
        .blocks_on(page)
        .flat_map(|block| {
            compose(&block.content, fonts, wrap_width)
                .lines
                .into_iter()
                .map(move |line| PositionedLine {
                    top: block.y + line.dy,
                    line,
                })
        })
        .collect()
}

/// Draw the selected pages of `layout` into a PDF. Pages outside `selection`
/// are skipped entirely; nothing is returned unless every page was written.
pub(crate) fn render(
    layout: &Layout<'_>,
    fonts: &FontSet,
    template: Template,
    selection: &PageSelection,
    title: &str,
    cancel: &CancellationSignal,
) -> Result<RenderedPdf, Error> {
    let t0 = std::time::Instant::now();
    let geometry = layout.geometry();

    let pages: Vec<usize> = (0..layout.page_count())
        .filter(|&p| selection.contains(p))
        .collect();
    if pages.is_empty() {
        return Err(Error::EmptySelection {
            selection: selection.to_string(),
            page_count: layout.page_count(),
        });
    }

    // Phase 1: compose every line of the requested pages
    let mut all_lines: Vec<Vec<PositionedLine>> = Vec::with_capacity(pages.len());
    for &page in &pages {
        cancel.check()?;
        all_lines.push(page_lines(layout, page, fonts));
    }
    let t_compose = t0.elapsed();

    // Phase 2: register fonts, subsetted to the characters actually drawn
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };
    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    let mut used_chars: [HashSet<char>; 2] = [HashSet::new(), HashSet::new()];
    for pl in all_lines.iter().flatten() {
        let slot = FontSlot::of(fonts, pl.line.style.weight);
        used_chars[slot as usize].extend(pl.line.text.chars());
    }

    let mut embedded: Vec<(FontSlot, EmbeddedFont)> = Vec::new();
    for slot in [FontSlot::Regular, FontSlot::Bold] {
        let used = &used_chars[slot as usize];
        if slot == FontSlot::Bold && used.is_empty() {
            continue;
        }
        let (face, _) = fonts.face(slot.weight());
        let font_ref = alloc();
        let pdf_name = format!("F{}", embedded.len() + 1);
        embedded.push((slot, face.embed(&mut pdf, font_ref, pdf_name, used, &mut alloc)));
    }
    let t_fonts = t0.elapsed();

    // Phase 3: content streams
    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, lines) in all_lines.iter().enumerate() {
        cancel.check()?;
        let mut canvas = PageCanvas::new(geometry);
        for pl in lines {
            let weight = pl.line.style.weight;
            let slot = FontSlot::of(fonts, weight);
            let Some((_, font)) = embedded.iter().find(|(s, _)| *s == slot) else {
                continue;
            };
            let (face, synthetic_bold) = fonts.face(weight);
            let line_font = LineFont {
                embedded: font,
                face,
                synthetic_bold,
            };
            canvas.draw(pl, &line_font, ink_color(pl.line.ink, template));
        }
        pdf.stream(content_ids[i], &canvas.finish())
            .filter(Filter::FlateDecode);
        log::debug!("Page {} written ({} lines)", pages[i] + 1, lines.len());
    }
    let t_pages = t0.elapsed();

    // Phase 4: document structure
    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(concat!("resume-pdf ", env!("CARGO_PKG_VERSION"))));

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for (_, font) in &embedded {
            font_dict.pair(Name(font.pdf_name.as_bytes()), font.font_ref);
        }
    }

    log::info!(
        "Render phases: compose={:.1}ms, font_embed={:.1}ms, pages={:.1}ms, assembly={:.1}ms ({} of {} pages)",
        t_compose.as_secs_f64() * 1000.0,
        (t_fonts - t_compose).as_secs_f64() * 1000.0,
        (t_pages - t_fonts).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_pages).as_secs_f64() * 1000.0,
        n,
        layout.page_count(),
    );

    Ok(RenderedPdf {
        bytes: pdf.finish(),
        pages,
    })
}
