#![allow(dead_code)]

use std::path::{Path, PathBuf};

use resume_pdf::Resume;
use resume_pdf::model::{Experience, Skill};

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn sample_resume() -> Resume {
    let json = std::fs::read_to_string(fixture_path("sample_resume.json"))
        .expect("sample fixture should exist");
    Resume::from_json(&json).expect("sample fixture should parse")
}

/// A resume with `n` identical experiences long enough to span several pages.
pub fn long_resume(n: usize) -> Resume {
    let mut r = sample_resume();
    r.experiences = (0..n)
        .map(|i| Experience {
            id: format!("exp-{i}"),
            job_title: format!("Engineer {i}"),
            company: "Acme".into(),
            start_date: "01/2020".into(),
            end_date: "12/2020".into(),
            description: "Shipped features and fixed bugs across the stack. ".repeat(8),
        })
        .collect();
    r
}

pub fn skill(name: &str) -> Skill {
    Skill {
        id: name.to_lowercase(),
        name: name.into(),
        level: "Advanced".into(),
    }
}

pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Value of the first `/Count n` entry in the page tree.
pub fn pdf_page_count(pdf: &[u8]) -> Option<usize> {
    let needle = b"/Count ";
    let at = pdf.windows(needle.len()).position(|w| w == needle)? + needle.len();
    let digits: String = pdf[at..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    digits.parse().ok()
}

pub fn init_logging() {
    let _ = env_logger::try_init();
}

fn is_glyf_font(path: &Path) -> bool {
    std::fs::read(path).is_ok_and(|data| {
        ttf_parser::Face::parse(&data, 0)
            .is_ok_and(|face| face.tables().glyf.is_some() && face.glyph_index('A').is_some())
    })
}

fn find_ttf_in(dir: &Path, depth: usize) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    for path in &entries {
        if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
            && is_glyf_font(path)
        {
            return Some(path.clone());
        }
    }
    if depth == 0 {
        return None;
    }
    entries
        .iter()
        .filter(|p| p.is_dir())
        .find_map(|p| find_ttf_in(p, depth - 1))
}

/// A TrueType file from RESUME_PDF_TEST_FONT or the usual system font
/// directories, if the machine has one.
pub fn find_system_ttf() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("RESUME_PDF_TEST_FONT") {
        return Some(PathBuf::from(path));
    }
    let home_fonts = std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local/share/fonts"))
        .ok();
    [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .chain(home_fonts)
    .find_map(|dir| find_ttf_in(&dir, 4))
}

/// Decompressed contents of every Flate stream in `pdf` that inflates cleanly.
pub fn inflated_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut rest = pdf;
    while let Some(start) = rest.windows(7).position(|w| w == b"stream\n") {
        let body = &rest[start + 7..];
        let Some(end) = body.windows(10).position(|w| w == b"\nendstream") else {
            break;
        };
        if let Ok(data) = miniz_oxide::inflate::decompress_to_vec_zlib(&body[..end]) {
            out.push(data);
        }
        rest = &body[end + 10..];
    }
    out
}
