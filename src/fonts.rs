use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::config::FontConfig;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
}

impl TextStyle {
    pub const fn regular(size: f32) -> Self {
        TextStyle {
            size,
            weight: Weight::Regular,
        }
    }

    pub const fn bold(size: f32) -> Self {
        TextStyle {
            size,
            weight: Weight::Bold,
        }
    }
}

/// Font metric queries with no drawing side effects. Layout measures through
/// this trait and the renderer draws with the same implementation, so the
/// two passes agree on every line break.
pub trait TextMetrics {
    /// Advance width of `text` in points, spaces included.
    fn text_width(&self, text: &str, style: TextStyle) -> f32;
}

enum FontData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for FontData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FontData::Mapped(m) => &m[..],
            FontData::Owned(v) => v.as_slice(),
        }
    }
}

enum FaceSource {
    /// One of the 14 standard PDF fonts; never embedded.
    Standard(&'static str),
    TrueType { data: FontData, face_index: u32 },
}

pub struct FontFace {
    name: String,
    source: FaceSource,
    /// Advance widths at 1000 units/em for WinAnsi bytes 32..=255.
    widths_1000: Vec<f32>,
}

impl FontFace {
    pub fn helvetica() -> Self {
        FontFace {
            name: "Helvetica".into(),
            source: FaceSource::Standard("Helvetica"),
            widths_1000: helvetica_widths(false),
        }
    }

    pub fn helvetica_bold() -> Self {
        FontFace {
            name: "Helvetica-Bold".into(),
            source: FaceSource::Standard("Helvetica-Bold"),
            widths_1000: helvetica_widths(true),
        }
    }

    /// Memory-map a TrueType/OpenType file and read its metrics.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::font(path, e))?;
        let data = unsafe { Mmap::map(&file) }.map_err(|e| Error::font(path, e))?;
        Self::from_data(FontData::Mapped(data), 0)
            .map_err(|detail| Error::font(path, detail))
    }

    pub fn from_bytes(bytes: Vec<u8>, face_index: u32) -> Result<Self, Error> {
        Self::from_data(FontData::Owned(bytes), face_index).map_err(Error::Font)
    }

    fn from_data(data: FontData, face_index: u32) -> Result<Self, String> {
        let face = Face::parse(data.as_ref(), face_index).map_err(|e| e.to_string())?;
        let units = face.units_per_em() as f32;
        let widths_1000 = (32u8..=255u8)
            .map(|byte| {
                face.glyph_index(winansi_to_char(byte))
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f32 / units * 1000.0)
                    .unwrap_or(0.0)
            })
            .collect();
        let name = postscript_name(&face).unwrap_or_else(|| "EmbeddedFont".to_string());
        Ok(FontFace {
            name,
            source: FaceSource::TrueType { data, face_index },
            widths_1000,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn is_standard(&self) -> bool {
        matches!(self.source, FaceSource::Standard(_))
    }

    /// Width of a single character in 1000-units. WinAnsi characters come from
    /// the precomputed table; anything else is looked up in the face itself.
    fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            return self.widths_1000[(byte - 32) as usize];
        }
        match &self.source {
            FaceSource::Standard(_) => 0.0,
            FaceSource::TrueType { data, face_index } => Face::parse(data.as_ref(), *face_index)
                .ok()
                .and_then(|face| {
                    let units = face.units_per_em() as f32;
                    face.glyph_index(ch)
                        .and_then(|gid| face.glyph_hor_advance(gid))
                        .map(|adv| adv as f32 / units * 1000.0)
                })
                .unwrap_or(0.0),
        }
    }

    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    /// Write the font objects into `pdf` under `font_ref`. TrueType faces are
    /// subsetted to `used_chars` and embedded as a Type0/CIDFont with
    /// Identity-H encoding.
    pub(crate) fn embed(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        pdf_name: String,
        used_chars: &HashSet<char>,
        alloc: &mut impl FnMut() -> Ref,
    ) -> EmbeddedFont {
        let t0 = std::time::Instant::now();
        let char_to_gid = match &self.source {
            FaceSource::Standard(base) => {
                pdf.type1_font(font_ref)
                    .base_font(Name(base.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                None
            }
            FaceSource::TrueType { data, face_index } => {
                let embedded = embed_truetype(
                    pdf,
                    font_ref,
                    &self.name,
                    data.as_ref(),
                    *face_index,
                    used_chars,
                    alloc,
                );
                if embedded.is_none() {
                    log::warn!("Embedding {} failed, substituting Helvetica", self.name);
                    pdf.type1_font(font_ref)
                        .base_font(Name(b"Helvetica"))
                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                }
                embedded
            }
        };
        log::debug!(
            "embed font {} as {pdf_name} ({} chars) → {:.1}ms",
            self.name,
            used_chars.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        if char_to_gid.is_none() {
            let dropped = winansi_unencodable(used_chars);
            if !dropped.is_empty() {
                let dropped: String = dropped.into_iter().collect();
                log::warn!(
                    "{} cannot encode {dropped:?}; these characters are left out. \
                     Set RESUME_PDF_FONT to a TrueType font that covers them",
                    self.name
                );
            }
        }
        EmbeddedFont {
            pdf_name,
            font_ref,
            char_to_gid,
        }
    }
}

/// A font registered in the output document.
pub(crate) struct EmbeddedFont {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl EmbeddedFont {
    /// Encode text for a `Tj` operand: 2-byte glyph ids for embedded
    /// TrueType, WinAnsi bytes for standard fonts.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Regular and bold faces used for a whole document.
pub struct FontSet {
    regular: FontFace,
    bold: Option<FontFace>,
}

impl FontSet {
    pub fn builtin() -> Self {
        FontSet {
            regular: FontFace::helvetica(),
            bold: Some(FontFace::helvetica_bold()),
        }
    }

    pub fn new(regular: FontFace, bold: Option<FontFace>) -> Self {
        FontSet { regular, bold }
    }

    /// Load the configured faces. A custom regular face without a bold
    /// companion gets synthesized bold; with no custom faces at all the
    /// standard Helvetica pair is used.
    pub fn load(config: &FontConfig) -> Result<Self, Error> {
        let regular = match &config.regular {
            Some(path) => FontFace::open(path)?,
            None => FontFace::helvetica(),
        };
        let bold = match &config.bold {
            Some(path) => Some(FontFace::open(path)?),
            None if regular.is_standard() => Some(FontFace::helvetica_bold()),
            None => None,
        };
        log::info!(
            "Fonts: regular={} bold={}",
            regular.name(),
            bold.as_ref().map_or("synthetic", |b| b.name()),
        );
        Ok(FontSet { regular, bold })
    }

    /// Face for `weight`, and whether bold must be faked by stroking.
    pub(crate) fn face(&self, weight: Weight) -> (&FontFace, bool) {
        match (weight, &self.bold) {
            (Weight::Regular, _) => (&self.regular, false),
            (Weight::Bold, Some(bold)) => (bold, false),
            (Weight::Bold, None) => (&self.regular, true),
        }
    }
}

impl Default for FontSet {
    fn default() -> Self {
        FontSet::builtin()
    }
}

impl TextMetrics for FontSet {
    fn text_width(&self, text: &str, style: TextStyle) -> f32 {
        self.face(style.weight).0.text_width(text, style.size)
    }
}

fn postscript_name(face: &Face) -> Option<String> {
    let mut family = None;
    for name in face.names() {
        if !name.is_unicode() {
            continue;
        }
        if name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
        if name.name_id == ttf_parser::name_id::FAMILY && family.is_none() {
            family = name.to_string();
        }
    }
    family.map(|f| f.replace(' ', ""))
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their Unicode codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}', // bullet
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert text to WinAnsi bytes, dropping characters the encoding cannot
/// represent (they also measure as zero width).
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b >= 32)
        .collect()
}

/// Printable characters of `used` that WinAnsi has no code for, sorted.
pub(crate) fn winansi_unencodable(used: &HashSet<char>) -> Vec<char> {
    let mut dropped: Vec<char> = used
        .iter()
        .copied()
        .filter(|&ch| !ch.is_control() && char_to_winansi(ch) < 32)
        .collect();
    dropped.sort_unstable();
    dropped
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Helvetica / Helvetica-Bold AFM widths for printable ASCII; the Latin-1 half
/// falls back to an average glyph width.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    const REGULAR: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
        278, 278, 584, 584, 584, 556, 1015, // :..@
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
        278, 278, 278, 469, 556, 333, // [..`
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
        334, 260, 334, 584, // {..~
    ];
    const BOLD: [u16; 95] = [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ];
    let table = if bold { &BOLD } else { &REGULAR };
    (32u16..=255u16)
        .map(|b| match b {
            32..=126 => table[(b - 32) as usize] as f32,
            0xA0 => 278.0,
            _ => 556.0,
        })
        .collect()
}

/// Embed a TrueType/OpenType face as a CIDFont (Type0 composite) with
/// Identity-H encoding, subsetted to the characters the document uses.
/// Returns the char → subset glyph id map used to encode text.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font_name: &str,
    font_data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<HashMap<char, u16>> {
    let face = Face::parse(font_data, face_index).ok()?;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let units = face.units_per_em() as f32;
    let to_1000 = |v: f32| v / units * 1000.0;
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        to_1000(bb.x_min as f32),
        to_1000(bb.y_min as f32),
        to_1000(bb.x_max as f32),
        to_1000(bb.y_max as f32),
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    // Sorted so glyph ids are assigned deterministically.
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| to_1000(adv as f32))
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(font_data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {font_name}: {e}; embedding full font");
        font_data.to_vec()
    });
    let data_len = i32::try_from(subset_data.len()).ok()?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font_name.replace(' ', "");
    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(to_1000(face.ascender() as f32))
        .descent(to_1000(face.descender() as f32))
        .cap_height(face.capital_height().map_or(700.0, |h| to_1000(h as f32)))
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = || pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };

    let cid_font_ref = alloc();
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), system_info());
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}
