mod compose;
mod wrap;

use std::convert::Infallible;

use crate::cancel::CancellationSignal;
use crate::error::Error;
use crate::fonts::TextMetrics;
use crate::geometry::PageGeometry;
use crate::model::{
    Certification, Education, Experience, PersonalInfo, Project, Resume, Skill,
};

pub use compose::{
    Align, BODY, ComposedBlock, ComposedLine, Ink, compose, format_date,
};
pub use wrap::{LINE_GAP, line_advance, wrap_words, wrapped_height};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Title,
    PersonalInfo,
    Summary,
    ExperienceHeader,
    ExperienceItem,
    EducationHeader,
    EducationItem,
    ProjectsHeader,
    ProjectItem,
    CertificationsHeader,
    CertificationItem,
    SkillsHeader,
    SkillsItem,
    Footer,
}

/// List sections, in print order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Experience,
    Education,
    Projects,
    Certifications,
    Skills,
}

impl Section {
    pub const ORDER: [Section; 5] = [
        Section::Experience,
        Section::Education,
        Section::Projects,
        Section::Certifications,
        Section::Skills,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            Section::Experience => "Work Experience",
            Section::Education => "Education",
            Section::Projects => "Projects",
            Section::Certifications => "Certifications",
            Section::Skills => "Skills",
        }
    }

    fn header_kind(self) -> BlockKind {
        match self {
            Section::Experience => BlockKind::ExperienceHeader,
            Section::Education => BlockKind::EducationHeader,
            Section::Projects => BlockKind::ProjectsHeader,
            Section::Certifications => BlockKind::CertificationsHeader,
            Section::Skills => BlockKind::SkillsHeader,
        }
    }

    fn items<'a>(self, resume: &'a Resume) -> Vec<BlockContent<'a>> {
        match self {
            Section::Experience => resume.experiences.iter().map(BlockContent::Experience).collect(),
            Section::Education => resume.educations.iter().map(BlockContent::Education).collect(),
            Section::Projects => resume.projects.iter().map(BlockContent::Project).collect(),
            Section::Certifications => resume
                .certifications
                .iter()
                .map(BlockContent::Certification)
                .collect(),
            Section::Skills => resume.skills.iter().map(BlockContent::Skill).collect(),
        }
    }
}

/// Payload of a content block, borrowed from the resume snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlockContent<'a> {
    Title(&'a str),
    PersonalInfo(&'a PersonalInfo),
    Summary(&'a str),
    Header(Section),
    Experience(&'a Experience),
    Education(&'a Education),
    Project(&'a Project),
    Certification(&'a Certification),
    Skill(&'a Skill),
    /// Last-modified timestamp, epoch milliseconds.
    Footer(i64),
}

impl BlockContent<'_> {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Title(_) => BlockKind::Title,
            BlockContent::PersonalInfo(_) => BlockKind::PersonalInfo,
            BlockContent::Summary(_) => BlockKind::Summary,
            BlockContent::Header(section) => section.header_kind(),
            BlockContent::Experience(_) => BlockKind::ExperienceItem,
            BlockContent::Education(_) => BlockKind::EducationItem,
            BlockContent::Project(_) => BlockKind::ProjectItem,
            BlockContent::Certification(_) => BlockKind::CertificationItem,
            BlockContent::Skill(_) => BlockKind::SkillsItem,
            BlockContent::Footer(_) => BlockKind::Footer,
        }
    }
}

/// A block with its height known but no position yet.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredBlock<'a> {
    pub content: BlockContent<'a>,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBlock<'a> {
    pub content: BlockContent<'a>,
    pub height: f32,
    pub page: usize,
    /// Top of the block, measured down from the top edge of the page.
    pub y: f32,
}

impl PlacedBlock<'_> {
    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }
}

/// Why a new page was started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageBreak {
    /// Index of the page that was started.
    pub page: usize,
    pub trigger: BlockKind,
    /// Cursor position on the previous page when the break was taken.
    pub y_before: f32,
    pub block_height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layout<'a> {
    geometry: PageGeometry,
    blocks: Vec<PlacedBlock<'a>>,
    breaks: Vec<PageBreak>,
    page_count: usize,
}

impl<'a> Layout<'a> {
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn blocks(&self) -> &[PlacedBlock<'a>] {
        &self.blocks
    }

    pub fn breaks(&self) -> &[PageBreak] {
        &self.breaks
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn blocks_on(&self, page: usize) -> impl Iterator<Item = &PlacedBlock<'a>> + '_ {
        self.blocks.iter().filter(move |b| b.page == page)
    }
}

/// Measure every block of `resume` in print order: title, personal info,
/// summary, then each list section under its header, then the footer.
/// Blocks with nothing to show are left out, and a section whose items are
/// all empty contributes no header.
pub fn measure_blocks<'a, M: TextMetrics + ?Sized>(
    resume: &'a Resume,
    geometry: &PageGeometry,
    metrics: &M,
) -> Vec<MeasuredBlock<'a>> {
    let wrap_width = geometry.content_width();
    let measure = |content: BlockContent<'a>| MeasuredBlock {
        height: compose(&content, metrics, wrap_width).height,
        content,
    };

    let mut blocks = vec![measure(BlockContent::Title(&resume.title))];
    blocks.extend(
        [
            BlockContent::PersonalInfo(&resume.personal_info),
            BlockContent::Summary(&resume.personal_info.summary),
        ]
        .into_iter()
        .map(measure)
        .filter(|b| b.height > 0.0),
    );

    for section in Section::ORDER {
        let items: Vec<MeasuredBlock<'a>> = section
            .items(resume)
            .into_iter()
            .map(measure)
            .filter(|b| b.height > 0.0)
            .collect();
        if items.is_empty() {
            continue;
        }
        blocks.push(measure(BlockContent::Header(section)));
        blocks.extend(items);
    }

    blocks.push(measure(BlockContent::Footer(resume.last_modified)));
    blocks
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    page: usize,
    y: f32,
    page_has_content: bool,
}

impl Cursor {
    fn start(geometry: &PageGeometry) -> Self {
        Cursor {
            page: 0,
            y: geometry.margin_top,
            page_has_content: false,
        }
    }

    /// Where a block of `height` goes: here if it fits, else the top of the
    /// next page. A block that arrives on an untouched page stays put even if
    /// it overflows, since moving it on would only leave a blank page.
    fn slot(self, height: f32, geometry: &PageGeometry) -> Cursor {
        if self.page_has_content && self.y + height > geometry.content_bottom() {
            Cursor {
                page: self.page + 1,
                y: geometry.margin_top,
                page_has_content: false,
            }
        } else {
            self
        }
    }
}

fn place_blocks<'a, E>(
    blocks: Vec<MeasuredBlock<'a>>,
    geometry: &PageGeometry,
    mut check: impl FnMut() -> Result<(), E>,
) -> Result<Layout<'a>, E> {
    let mut placed = Vec::with_capacity(blocks.len());
    let mut breaks = Vec::new();
    let end = blocks
        .into_iter()
        .try_fold(Cursor::start(geometry), |cursor, block| {
            check()?;
            let at = cursor.slot(block.height, geometry);
            if at.page != cursor.page {
                let brk = PageBreak {
                    page: at.page,
                    trigger: block.content.kind(),
                    y_before: cursor.y,
                    block_height: block.height,
                };
                log::debug!(
                    "Page break due to {:?} overflow ({:.1} + {:.1} > {:.1}), new page {}",
                    brk.trigger,
                    brk.y_before,
                    brk.block_height,
                    geometry.content_bottom(),
                    brk.page,
                );
                breaks.push(brk);
            }
            placed.push(PlacedBlock {
                content: block.content,
                height: block.height,
                page: at.page,
                y: at.y,
            });
            Ok(Cursor {
                page: at.page,
                y: at.y + block.height,
                page_has_content: true,
            })
        })?;

    Ok(Layout {
        geometry: *geometry,
        page_count: end.page + 1,
        blocks: placed,
        breaks,
    })
}

/// Lay out `resume` on pages of `geometry`. Deterministic and infallible:
/// the same snapshot, geometry and metrics always give the same layout.
pub fn paginate<'a, M: TextMetrics + ?Sized>(
    resume: &'a Resume,
    geometry: &PageGeometry,
    metrics: &M,
) -> Layout<'a> {
    let blocks = measure_blocks(resume, geometry, metrics);
    let Ok(layout) = place_blocks(blocks, geometry, || Ok::<(), Infallible>(()));
    log::debug!(
        "Layout: {} blocks on {} page(s)",
        layout.blocks.len(),
        layout.page_count
    );
    layout
}

/// [`paginate`], checking `cancel` before each block is placed.
pub fn paginate_cancellable<'a, M: TextMetrics + ?Sized>(
    resume: &'a Resume,
    geometry: &PageGeometry,
    metrics: &M,
    cancel: &CancellationSignal,
) -> Result<Layout<'a>, Error> {
    let blocks = measure_blocks(resume, geometry, metrics);
    place_blocks(blocks, geometry, || cancel.check())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fonts::{FontSet, TextStyle};
    use crate::model::Template;

    /// Every character advances half the font size.
    pub(crate) struct Monospace;

    impl TextMetrics for Monospace {
        fn text_width(&self, text: &str, style: TextStyle) -> f32 {
            text.chars().count() as f32 * style.size * 0.5
        }
    }

    fn experience(description: &str) -> Experience {
        Experience {
            id: "e1".into(),
            job_title: "Engineer".into(),
            company: "Acme".into(),
            start_date: "01/2020".into(),
            end_date: "Present".into(),
            description: description.into(),
        }
    }

    fn skill(name: &str) -> Skill {
        Skill {
            id: name.into(),
            name: name.into(),
            level: "Advanced".into(),
        }
    }

    fn kinds(layout: &Layout<'_>) -> Vec<BlockKind> {
        layout.blocks().iter().map(PlacedBlock::kind).collect()
    }

    #[test]
    fn empty_resume_is_title_and_footer_on_one_page() {
        let resume = Resume::default();
        let layout = paginate(&resume, &PageGeometry::A4, &Monospace);
        assert_eq!(layout.page_count(), 1);
        assert_eq!(kinds(&layout), [BlockKind::Title, BlockKind::Footer]);
        assert_eq!(layout.blocks()[1].y, 90.0);
        assert!(layout.breaks().is_empty());
    }

    #[test]
    fn sections_follow_fixed_order() {
        let resume = Resume {
            title: "CV".into(),
            personal_info: PersonalInfo {
                full_name: "Ada".into(),
                summary: "Writes programs.".into(),
                ..Default::default()
            },
            skills: vec![skill("Rust")],
            experiences: vec![experience("x")],
            certifications: vec![Certification {
                name: "CKA".into(),
                ..Default::default()
            }],
            projects: vec![Project {
                name: "p".into(),
                ..Default::default()
            }],
            educations: vec![Education {
                degree: "BSc".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let layout = paginate(&resume, &PageGeometry::A4, &Monospace);
        assert_eq!(
            kinds(&layout),
            [
                BlockKind::Title,
                BlockKind::PersonalInfo,
                BlockKind::Summary,
                BlockKind::ExperienceHeader,
                BlockKind::ExperienceItem,
                BlockKind::EducationHeader,
                BlockKind::EducationItem,
                BlockKind::ProjectsHeader,
                BlockKind::ProjectItem,
                BlockKind::CertificationsHeader,
                BlockKind::CertificationItem,
                BlockKind::SkillsHeader,
                BlockKind::SkillsItem,
                BlockKind::Footer,
            ]
        );
    }

    #[test]
    fn section_of_only_empty_items_has_no_header() {
        let resume = Resume {
            projects: vec![Project::default(), Project::default()],
            skills: vec![Skill::default()],
            ..Default::default()
        };
        let layout = paginate(&resume, &PageGeometry::A4, &Monospace);
        assert!(!kinds(&layout).contains(&BlockKind::ProjectsHeader));
        assert!(!kinds(&layout).contains(&BlockKind::SkillsHeader));
        assert!(!kinds(&layout).contains(&BlockKind::ProjectItem));
    }

    #[test]
    fn whitespace_only_item_takes_no_space() {
        let resume = Resume {
            experiences: vec![Experience {
                description: "   \n ".into(),
                ..Default::default()
            }],
            educations: vec![Education {
                degree: " ".into(),
                start_date: "\t".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let layout = paginate(&resume, &PageGeometry::A4, &Monospace);
        assert_eq!(kinds(&layout), [BlockKind::Title, BlockKind::Footer]);
        assert_eq!(layout.blocks()[1].y, 90.0);
    }

    #[test]
    fn three_hundred_char_description_offsets() {
        // 30 nine-letter words plus a final period: 300 characters. At 14pt
        // each char is 7pt wide, so 7 words (483pt) fit in 495pt and an 8th
        // (553pt) does not: 7+7+7+7+2 = 5 lines.
        let mut words = vec!["abcdefghi"; 30].join(" ");
        words.push('.');
        assert_eq!(words.len(), 300);
        let resume = Resume {
            experiences: vec![experience(&words)],
            skills: vec![skill("Rust")],
            ..Default::default()
        };
        let g = PageGeometry::A4;
        assert_eq!(wrap_words(&words, &Monospace, BODY, g.content_width()).len(), 5);

        let layout = paginate(&resume, &g, &Monospace);
        let b = layout.blocks();
        assert_eq!(b[0].kind(), BlockKind::Title);
        assert_eq!(b[1].kind(), BlockKind::ExperienceHeader);
        assert_eq!(b[1].y, 90.0);
        assert_eq!(b[2].kind(), BlockKind::ExperienceItem);
        assert_eq!(b[2].y, 130.0);
        assert_eq!(b[2].height, 20.0 + 15.0 + 20.0 + 5.0 * 19.0 + 20.0);
        assert_eq!(b[3].kind(), BlockKind::SkillsHeader);
        assert_eq!(b[3].y, 300.0);
        assert_eq!(b[4].y, 340.0);
        assert_eq!(b[5].kind(), BlockKind::Footer);
        assert_eq!(b[5].y, 360.0);
    }

    #[test]
    fn block_that_does_not_fit_moves_to_next_page() {
        let resume = Resume {
            skills: (0..60).map(|i| skill(&format!("s{i}"))).collect(),
            ..Default::default()
        };
        let g = PageGeometry::A4;
        let layout = paginate(&resume, &g, &Monospace);
        // Title 50..90, header 90..130, skills of 20 from 130: 33 fit (to 790).
        let skills: Vec<&PlacedBlock<'_>> = layout
            .blocks()
            .iter()
            .filter(|b| b.kind() == BlockKind::SkillsItem)
            .collect();
        assert_eq!(skills[32].page, 0);
        assert_eq!(skills[32].y, 770.0);
        assert_eq!(skills[33].page, 1);
        assert_eq!(skills[33].y, 50.0);
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.breaks().len(), 1);
        assert_eq!(layout.breaks()[0].trigger, BlockKind::SkillsItem);
        assert_eq!(layout.breaks()[0].y_before, 790.0);
    }

    #[test]
    fn oversized_block_overflows_on_its_own_page() {
        let huge = vec!["word"; 2000].join(" ");
        let resume = Resume {
            experiences: vec![experience(&huge)],
            skills: vec![skill("Rust")],
            ..Default::default()
        };
        let g = PageGeometry::A4;
        let layout = paginate(&resume, &g, &Monospace);
        let item = layout
            .blocks()
            .iter()
            .find(|b| b.kind() == BlockKind::ExperienceItem)
            .unwrap();
        assert!(item.height > g.content_height());
        assert_eq!(item.page, 1);
        assert_eq!(item.y, g.margin_top);
        // Following blocks start a fresh page rather than stacking on the overflow.
        let header = layout
            .blocks()
            .iter()
            .find(|b| b.kind() == BlockKind::SkillsHeader)
            .unwrap();
        assert_eq!(header.page, 2);
        assert_eq!(layout.page_count(), 3);
    }

    #[test]
    fn oversized_first_block_does_not_leave_blank_page() {
        let huge = vec!["word"; 2000].join(" ");
        let resume = Resume {
            personal_info: PersonalInfo {
                summary: huge,
                ..Default::default()
            },
            ..Default::default()
        };
        // Content area of 100pt: the summary alone spans hundreds of lines.
        let g = PageGeometry::with_margins(200.0, 120.0, 10.0);
        let layout = paginate(&resume, &g, &Monospace);
        for page in 0..layout.page_count() {
            assert!(layout.blocks_on(page).next().is_some(), "page {page} is blank");
        }
    }

    fn assert_fits_or_oversized(layout: &Layout<'_>) {
        let g = layout.geometry();
        for b in layout.blocks() {
            assert!(
                b.y + b.height <= g.content_bottom() || b.height > g.content_height(),
                "{:?} at {} + {} overflows",
                b.kind(),
                b.y,
                b.height
            );
        }
    }

    fn sample_resumes() -> Vec<Resume> {
        (0..12)
            .map(|n| Resume {
                title: format!("Resume {n}"),
                personal_info: PersonalInfo {
                    full_name: "Grace Hopper".into(),
                    email: if n % 2 == 0 { "grace@example.com".into() } else { String::new() },
                    summary: vec!["compilers"; n * 15].join(" "),
                    ..Default::default()
                },
                experiences: (0..n)
                    .map(|i| experience(&vec!["shipped"; i * 37 + 3].join(" ")))
                    .collect(),
                skills: (0..n * 3).map(|i| skill(&format!("skill{i}"))).collect(),
                projects: (0..n % 4)
                    .map(|i| Project {
                        name: format!("project {i}"),
                        description: vec!["feature"; i * 50].join(" "),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn every_block_fits_unless_oversized() {
        for resume in sample_resumes() {
            let layout = paginate(&resume, &PageGeometry::A4, &FontSet::builtin());
            assert!(layout.page_count() >= 1);
            assert_fits_or_oversized(&layout);
            let max_page = layout.blocks().iter().map(|b| b.page).max().unwrap();
            assert_eq!(layout.page_count(), max_page + 1);
        }
    }

    #[test]
    fn pages_are_monotonic_and_offsets_never_overlap() {
        for resume in sample_resumes() {
            let layout = paginate(&resume, &PageGeometry::A4, &Monospace);
            for pair in layout.blocks().windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(b.page >= a.page);
                if a.page == b.page {
                    assert_eq!(b.y, a.y + a.height);
                } else {
                    assert_eq!(b.y, layout.geometry().margin_top);
                }
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        for resume in sample_resumes() {
            let fonts = FontSet::builtin();
            let a = paginate(&resume, &PageGeometry::A4, &fonts);
            let b = paginate(&resume, &PageGeometry::A4, &fonts);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn template_does_not_affect_layout() {
        for resume in sample_resumes() {
            let mut modern = resume.clone();
            modern.template_id = Template::Modern.id().into();
            let fonts = FontSet::builtin();
            let a = paginate(&resume, &PageGeometry::A4, &fonts);
            let b = paginate(&modern, &PageGeometry::A4, &fonts);
            assert_eq!(a.page_count(), b.page_count());
            let offsets = |l: &Layout<'_>| -> Vec<(usize, f32)> {
                l.blocks().iter().map(|b| (b.page, b.y)).collect()
            };
            assert_eq!(offsets(&a), offsets(&b));
        }
    }

    #[test]
    fn cancelled_layout_stops() {
        let resume = sample_resumes().pop().unwrap();
        let cancel = CancellationSignal::new();
        cancel.cancel();
        let err = paginate_cancellable(&resume, &PageGeometry::A4, &Monospace, &cancel)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Cancelled));

        let live = CancellationSignal::new();
        let layout = paginate_cancellable(&resume, &PageGeometry::A4, &Monospace, &live).unwrap();
        assert_eq!(layout, paginate(&resume, &PageGeometry::A4, &Monospace));
    }
}
