use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::model::Template;

/// Which pages of the laid-out document get written. Indices are zero-based;
/// the textual form is one-based (`"1-3,5"`), as print dialogs show them.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PageSelection {
    #[default]
    All,
    Ranges(Vec<RangeInclusive<usize>>),
}

impl PageSelection {
    pub fn contains(&self, page_index: usize) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page_index)),
        }
    }
}

impl FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }
        let parse_page = |part: &str| -> Result<usize, Error> {
            let n: usize = part
                .trim()
                .parse()
                .map_err(|_| Error::InvalidPageRange(format!("'{part}' is not a page number")))?;
            if n == 0 {
                return Err(Error::InvalidPageRange("pages are numbered from 1".into()));
            }
            Ok(n - 1)
        };
        let mut ranges = Vec::new();
        for part in s.split(',') {
            let range = match part.split_once('-') {
                Some((a, b)) => {
                    let (start, end) = (parse_page(a)?, parse_page(b)?);
                    if start > end {
                        return Err(Error::InvalidPageRange(format!("'{part}' is reversed")));
                    }
                    start..=end
                }
                None => {
                    let p = parse_page(part)?;
                    p..=p
                }
            };
            ranges.push(range);
        }
        Ok(PageSelection::Ranges(ranges))
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::All => f.write_str("all"),
            PageSelection::Ranges(ranges) => {
                for (i, r) in ranges.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if r.start() == r.end() {
                        write!(f, "{}", r.start() + 1)?;
                    } else {
                        write!(f, "{}-{}", r.start() + 1, r.end() + 1)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// TrueType/OpenType faces to measure and embed instead of built-in Helvetica.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

impl FontConfig {
    /// Reads RESUME_PDF_FONT and RESUME_PDF_FONT_BOLD.
    pub fn from_env() -> Self {
        let path_var = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        FontConfig {
            regular: path_var("RESUME_PDF_FONT"),
            bold: path_var("RESUME_PDF_FONT_BOLD"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub geometry: PageGeometry,
    pub pages: PageSelection,
    /// Overrides the resume's own template id.
    pub template: Option<Template>,
    pub fonts: FontConfig,
}

impl ExportOptions {
    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    pub fn template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    pub fn fonts(mut self, fonts: FontConfig) -> Self {
        self.fonts = fonts;
        self
    }
}

/// Store directory: RESUME_PDF_STORE, else `$XDG_DATA_HOME/resume-pdf/resumes`,
/// else `~/.local/share/resume-pdf/resumes`.
pub fn default_store_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("RESUME_PDF_STORE")
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir.trim()));
    }
    let base = if cfg!(target_os = "macos") {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support"))
    } else if cfg!(target_os = "windows") {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    } else {
        std::env::var("XDG_DATA_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".local/share"))
            })
    };
    base.map(|d| d.join("resume-pdf").join("resumes"))
}
