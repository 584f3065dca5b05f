//! Per-block line composition. Both the measuring pass and the drawing pass
//! go through [`compose`], so a block is drawn exactly as tall as it was
//! measured.

use crate::fonts::{TextMetrics, TextStyle};
use crate::model::{Certification, Education, Experience, PersonalInfo, Project, Skill};

use super::BlockContent;
use super::wrap::{line_advance, wrap_words};

pub const BODY: TextStyle = TextStyle::regular(14.0);
pub const TITLE: TextStyle = TextStyle::bold(24.0);
pub const SUMMARY_HEADING: TextStyle = TextStyle::bold(16.0);
pub const SECTION_HEADING: TextStyle = TextStyle::bold(18.0);
pub const FOOTER: TextStyle = TextStyle::regular(14.0);

const TITLE_HEIGHT: f32 = 40.0;
const CONTACT_LINE: f32 = 25.0;
const SECTION_GAP: f32 = 10.0;
const SUMMARY_HEADING_ADVANCE: f32 = 25.0;
const SECTION_HEADING_ADVANCE: f32 = 30.0;
const SKILL_HEIGHT: f32 = 20.0;
const FOOTER_HEIGHT: f32 = 24.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ink {
    /// Template accent color.
    Accent,
    Body,
    Muted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    /// Right edge at the right margin.
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComposedLine {
    /// Top of the line box, relative to the block anchor.
    pub dy: f32,
    pub text: String,
    pub style: TextStyle,
    pub ink: Ink,
    pub align: Align,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComposedBlock {
    pub lines: Vec<ComposedLine>,
    pub height: f32,
}

struct Composer<'m, M: TextMetrics + ?Sized> {
    metrics: &'m M,
    wrap_width: f32,
    lines: Vec<ComposedLine>,
    y: f32,
}

impl<'m, M: TextMetrics + ?Sized> Composer<'m, M> {
    fn new(metrics: &'m M, wrap_width: f32) -> Self {
        Composer {
            metrics,
            wrap_width,
            lines: Vec::new(),
            y: 0.0,
        }
    }

    fn gap(&mut self, h: f32) {
        self.y += h;
    }

    fn line(&mut self, text: String, style: TextStyle, ink: Ink, advance: f32) {
        self.lines.push(ComposedLine {
            dy: self.y,
            text,
            style,
            ink,
            align: Align::Left,
        });
        self.y += advance;
    }

    /// Body line that only exists (and only takes space) when `value` is set.
    fn field(&mut self, label: &str, value: &str, advance: f32) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let text = if label.is_empty() {
            value.to_string()
        } else {
            format!("{label}: {value}")
        };
        self.line(text, BODY, Ink::Body, advance);
    }

    /// Date span; the slot is reserved even when both ends are blank.
    fn dates(&mut self, label: &str, start: &str, end: &str, advance: f32) {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() && end.is_empty() {
            self.gap(advance);
            return;
        }
        let span = format!("{start} - {end}");
        let text = if label.is_empty() {
            span
        } else {
            format!("{label}: {span}")
        };
        self.line(text, BODY, Ink::Body, advance);
    }

    fn wrapped(&mut self, text: &str, style: TextStyle, ink: Ink) {
        for line in wrap_words(text, self.metrics, style, self.wrap_width) {
            self.line(line, style, ink, line_advance(style));
        }
    }

    fn finish(self) -> ComposedBlock {
        ComposedBlock {
            lines: self.lines,
            height: self.y,
        }
    }
}

/// Lay out the lines of one block. Blocks with nothing to show come back with
/// zero height and are dropped by the paginator.
pub fn compose<M: TextMetrics + ?Sized>(
    content: &BlockContent<'_>,
    metrics: &M,
    wrap_width: f32,
) -> ComposedBlock {
    let mut c = Composer::new(metrics, wrap_width);
    match *content {
        BlockContent::Title(title) => {
            if title.trim().is_empty() {
                c.gap(TITLE_HEIGHT);
            } else {
                c.line(title.trim().to_string(), TITLE, Ink::Accent, TITLE_HEIGHT);
            }
        }
        BlockContent::PersonalInfo(info) => personal_info(&mut c, info),
        BlockContent::Summary(summary) => {
            if !summary.trim().is_empty() {
                c.gap(SECTION_GAP);
                c.line(
                    "Professional Summary:".into(),
                    SUMMARY_HEADING,
                    Ink::Accent,
                    SUMMARY_HEADING_ADVANCE,
                );
                c.wrapped(summary, BODY, Ink::Body);
            }
        }
        BlockContent::Header(section) => {
            c.gap(SECTION_GAP);
            c.line(
                section.heading().into(),
                SECTION_HEADING,
                Ink::Accent,
                SECTION_HEADING_ADVANCE,
            );
        }
        BlockContent::Experience(e) => experience(&mut c, e),
        BlockContent::Education(e) => education(&mut c, e),
        BlockContent::Project(p) => project(&mut c, p),
        BlockContent::Certification(cert) => certification(&mut c, cert),
        BlockContent::Skill(skill) => skill_line(&mut c, skill),
        BlockContent::Footer(last_modified) => {
            c.lines.push(ComposedLine {
                dy: 0.0,
                text: format!("Last modified: {}", format_date(last_modified)),
                style: FOOTER,
                ink: Ink::Muted,
                align: Align::Right,
            });
            c.gap(FOOTER_HEIGHT);
        }
    }
    c.finish()
}

fn personal_info<M: TextMetrics + ?Sized>(c: &mut Composer<'_, M>, info: &PersonalInfo) {
    for (label, value) in info.labeled_fields() {
        c.field(label, value, CONTACT_LINE);
    }
}

fn experience<M: TextMetrics + ?Sized>(c: &mut Composer<'_, M>, e: &Experience) {
    if e.is_empty() {
        return;
    }
    c.field("", &e.job_title, 20.0);
    c.field("", &e.company, 15.0);
    c.dates("", &e.start_date, &e.end_date, 20.0);
    c.wrapped(&e.description, BODY, Ink::Body);
    c.gap(20.0);
}

fn education<M: TextMetrics + ?Sized>(c: &mut Composer<'_, M>, e: &Education) {
    if e.is_empty() {
        return;
    }
    c.field("", &e.degree, 15.0);
    c.field("", &e.field, 15.0);
    c.field("", &e.institution, 15.0);
    c.dates("", &e.start_date, &e.end_date, 25.0);
    c.wrapped(&e.description, BODY, Ink::Body);
    c.gap(25.0);
}

fn project<M: TextMetrics + ?Sized>(c: &mut Composer<'_, M>, p: &Project) {
    if p.is_empty() {
        return;
    }
    c.field("", &p.name, 20.0);
    c.field("Role", &p.role, 15.0);
    c.field("Tech", &p.technologies, 15.0);
    c.dates("", &p.start_date, &p.end_date, 20.0);
    c.wrapped(&p.description, BODY, Ink::Body);
    c.gap(20.0);
}

fn certification<M: TextMetrics + ?Sized>(c: &mut Composer<'_, M>, cert: &Certification) {
    if cert.is_empty() {
        return;
    }
    c.field("", &cert.name, 15.0);
    c.field("Issued by", &cert.issuing_organization, 15.0);
    c.dates("Dates", &cert.issue_date, &cert.expiration_date, 20.0);
    c.field("Credential ID", &cert.credential_id, 15.0);
    c.field("Credential URL", &cert.credential_url, 15.0);
    c.gap(20.0);
}

fn skill_line<M: TextMetrics + ?Sized>(c: &mut Composer<'_, M>, skill: &Skill) {
    if skill.is_empty() {
        return;
    }
    let (name, level) = (skill.name.trim(), skill.level.trim());
    let text = if level.is_empty() {
        name.to_string()
    } else {
        format!("{name} ({level})")
    };
    c.line(text, BODY, Ink::Body, SKILL_HEIGHT);
}

/// `MMM dd, yyyy` in UTC, e.g. "Mar 04, 2025".
pub fn format_date(epoch_millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(epoch_millis)
        .map(|dt| dt.format("%b %d, %Y").to_string())
        .unwrap_or_default()
}
