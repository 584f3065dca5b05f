mod common;

use resume_pdf::layout::{BlockKind, paginate};
use resume_pdf::fonts::FontSet;
use resume_pdf::{
    CancellationSignal, Error, ExportOptions, PageGeometry, PageSelection, Resume, Template,
};

use common::{count, fixture_path, init_logging, long_resume, pdf_page_count, sample_resume};

#[test]
fn sample_fits_on_one_page() {
    init_logging();
    let resume = sample_resume();
    let doc = resume_pdf::export(&resume, &ExportOptions::default()).unwrap();
    assert!(doc.bytes.starts_with(b"%PDF-"));
    assert_eq!(doc.page_count, 1);
    assert_eq!(doc.pages_written, vec![1]);
    assert_eq!(pdf_page_count(&doc.bytes), Some(1));
}

#[test]
fn export_matches_layout_page_count() {
    init_logging();
    let resume = long_resume(12);
    let fonts = FontSet::builtin();
    let layout = paginate(&resume, &PageGeometry::A4, &fonts);
    assert!(layout.page_count() > 2);

    let doc = resume_pdf::export(&resume, &ExportOptions::default()).unwrap();
    assert_eq!(doc.page_count, layout.page_count());
    assert_eq!(pdf_page_count(&doc.bytes), Some(layout.page_count()));
}

#[test]
fn page_subset_writes_only_selected_pages() {
    let resume = long_resume(12);
    let options = ExportOptions::default().pages("1,3".parse().unwrap());
    let doc = resume_pdf::export(&resume, &options).unwrap();
    assert!(doc.page_count >= 3);
    assert_eq!(doc.pages_written, vec![1, 3]);
    assert_eq!(pdf_page_count(&doc.bytes), Some(2));
}

#[test]
fn selection_beyond_document_is_rejected() {
    let options = ExportOptions::default().pages("40-41".parse().unwrap());
    let err = resume_pdf::export(&sample_resume(), &options).unwrap_err();
    assert!(matches!(err, Error::EmptySelection { page_count: 1, .. }));
}

#[test]
fn invalid_page_ranges() {
    for bad in ["0", "3-1", "x", "1,,2"] {
        assert!(
            matches!(bad.parse::<PageSelection>(), Err(Error::InvalidPageRange(_))),
            "{bad}"
        );
    }
}

#[test]
fn template_changes_colors_not_pages() {
    let resume = long_resume(6);
    let classic = resume_pdf::export(
        &resume,
        &ExportOptions::default().template(Template::Classic),
    )
    .unwrap();
    let modern = resume_pdf::export(
        &resume,
        &ExportOptions::default().template(Template::Modern),
    )
    .unwrap();
    assert_eq!(classic.page_count, modern.page_count);
    assert_ne!(classic.bytes, modern.bytes);
}

#[test]
fn empty_resume_still_has_a_page() {
    let doc = resume_pdf::export(&Resume::default(), &ExportOptions::default()).unwrap();
    assert_eq!(doc.page_count, 1);
    assert!(count(&doc.bytes, b"/Title") >= 1);
}

#[test]
fn oversized_description_terminates() {
    let mut resume = sample_resume();
    resume.experiences[0].description = "overflow ".repeat(3000);
    let fonts = FontSet::builtin();
    let layout = paginate(&resume, &PageGeometry::A4, &fonts);
    let big = layout
        .blocks()
        .iter()
        .find(|b| b.kind() == BlockKind::ExperienceItem)
        .unwrap();
    assert!(big.height > PageGeometry::A4.content_height());
    let doc = resume_pdf::export(&resume, &ExportOptions::default()).unwrap();
    assert_eq!(doc.page_count, layout.page_count());
}

#[test]
fn export_to_path_writes_atomically() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resume.pdf");
    let doc = resume_pdf::export_json_file(
        &fixture_path("sample_resume.json"),
        &out,
        &ExportOptions::default(),
    )
    .unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), doc.bytes);
    assert!(!dir.path().join("resume.pdf.partial").exists());
}

#[test]
fn cancelled_export_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resume.pdf");
    let cancel = CancellationSignal::new();
    cancel.cancel();
    let err = resume_pdf::export_to_path(
        &long_resume(10),
        &ExportOptions::default(),
        &out,
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(!out.exists());
    assert!(!dir.path().join("resume.pdf.partial").exists());
}

#[test]
fn missing_font_file_fails_before_layout() {
    let options = ExportOptions::default().fonts(resume_pdf::FontConfig {
        regular: Some("/nonexistent/font.ttf".into()),
        bold: None,
    });
    let err = resume_pdf::export(&sample_resume(), &options).unwrap_err();
    assert!(matches!(err, Error::Font(_) | Error::Io(_)));
}
