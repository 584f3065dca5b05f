mod cancel;
pub mod config;
mod error;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod model;
mod pdf;
pub mod rewrite;
pub mod store;

pub use cancel::CancellationSignal;
pub use config::{ExportOptions, FontConfig, PageSelection};
pub use error::{Error, Result};
pub use geometry::PageGeometry;
pub use model::{Resume, Template};

use std::path::Path;
use std::time::Instant;

use fonts::FontSet;

/// A finished PDF plus what the layout produced.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    /// Pages in the full layout, regardless of the selection.
    pub page_count: usize,
    /// One-based page numbers written to `bytes`.
    pub pages_written: Vec<usize>,
}

pub fn export(resume: &Resume, options: &ExportOptions) -> Result<ExportedDocument> {
    export_with_cancel(resume, options, &CancellationSignal::new())
}

pub fn export_with_cancel(
    resume: &Resume,
    options: &ExportOptions,
    cancel: &CancellationSignal,
) -> Result<ExportedDocument> {
    let t0 = Instant::now();

    let fonts = FontSet::load(&options.fonts)?;
    let t_fonts = t0.elapsed();

    let layout = layout::paginate_cancellable(resume, &options.geometry, &fonts, cancel)?;
    let t_layout = t0.elapsed();

    let template = options.template.unwrap_or_else(|| resume.template());
    let rendered = pdf::render(
        &layout,
        &fonts,
        template,
        &options.pages,
        resume.job_name(),
        cancel,
    )?;
    let t_render = t0.elapsed();

    log::info!(
        "Timing: fonts={:.1}ms, layout={:.1}ms, render={:.1}ms, total={:.1}ms (output {} bytes)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_layout - t_fonts).as_secs_f64() * 1000.0,
        (t_render - t_layout).as_secs_f64() * 1000.0,
        t_render.as_secs_f64() * 1000.0,
        rendered.bytes.len(),
    );

    Ok(ExportedDocument {
        bytes: rendered.bytes,
        page_count: layout.page_count(),
        pages_written: rendered.pages.iter().map(|p| p + 1).collect(),
    })
}

/// Export and write to `output`. The file appears only once the whole
/// document is written; a failed or cancelled export leaves nothing behind.
pub fn export_to_path(
    resume: &Resume,
    options: &ExportOptions,
    output: &Path,
    cancel: &CancellationSignal,
) -> Result<ExportedDocument> {
    let doc = export_with_cancel(resume, options, cancel)?;

    let t0 = Instant::now();
    let mut partial = output.as_os_str().to_owned();
    partial.push(".partial");
    let partial = std::path::PathBuf::from(partial);

    cancel.check()?;
    let written =
        std::fs::write(&partial, &doc.bytes).and_then(|()| std::fs::rename(&partial, output));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&partial);
        return Err(Error::Io(e));
    }

    log::info!(
        "Wrote {} ({} bytes, {:.1}ms)",
        output.display(),
        doc.bytes.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(doc)
}

/// Read a resume JSON file and export it to `output`.
pub fn export_json_file(input: &Path, output: &Path, options: &ExportOptions) -> Result<ExportedDocument> {
    let json = std::fs::read_to_string(input)?;
    let resume = Resume::from_json(&json)?;
    export_to_path(&resume, options, output, &CancellationSignal::new())
}
