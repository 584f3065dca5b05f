use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use resume_pdf::fonts::FontSet;
use resume_pdf::store::{JsonDirStore, ResumeStore};
use resume_pdf::{
    CancellationSignal, Error, ExportOptions, FontConfig, PageGeometry, PageSelection, Resume,
    Template,
};

#[derive(Parser)]
#[command(name = "resume-pdf", version, about = "Paginated PDF export for resumes")]
struct Cli {
    /// Store directory (default: RESUME_PDF_STORE or the user data directory)
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a resume to PDF
    Export {
        #[command(flatten)]
        source: Source,

        /// Output PDF (default: <title>.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Pages to write, one-based (e.g. "1-3,5")
        #[arg(long, default_value = "all")]
        pages: PageSelection,

        /// Override the resume's template
        #[arg(long, value_enum)]
        template: Option<TemplateArg>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Print block positions and page breaks without writing a PDF
    Layout {
        #[command(flatten)]
        source: Source,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Manage stored resumes
    #[command(subcommand)]
    Store(StoreCommand),

    /// Rewrite one experience description through the completion service
    Improve {
        /// Stored resume id
        id: i64,

        /// Experience id within the resume
        #[arg(long)]
        experience: String,
    },

    /// Generate a professional summary through the completion service
    Summary {
        /// Stored resume id
        id: i64,
    },
}

#[derive(Subcommand)]
enum StoreCommand {
    /// List resumes, most recently modified first
    List,
    /// Print a stored resume as JSON
    Show { id: i64 },
    /// Add a resume JSON file to the store
    Import { file: PathBuf },
    /// Remove a stored resume
    Delete { id: i64 },
    /// Find resumes by title, name, email or phone
    Search {
        query: String,

        /// Only titles containing this text ("All" for any)
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Resume JSON file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Stored resume id
    #[arg(long)]
    id: Option<i64>,
}

#[derive(clap::Args)]
struct PageArgs {
    /// Page width in points
    #[arg(long, default_value_t = PageGeometry::A4.width)]
    width: f32,

    /// Page height in points
    #[arg(long, default_value_t = PageGeometry::A4.height)]
    height: f32,

    /// Margin on all four sides in points
    #[arg(long, default_value_t = PageGeometry::A4.margin_top)]
    margin: f32,
}

impl PageArgs {
    fn geometry(&self) -> Result<PageGeometry, Error> {
        let geometry = PageGeometry::with_margins(self.width, self.height, self.margin);
        if geometry.content_width() <= 0.0 || geometry.content_height() <= 0.0 {
            return Err(Error::Config(format!(
                "margins of {} leave no room on a {}x{} page",
                self.margin, self.width, self.height
            )));
        }
        Ok(geometry)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateArg {
    Classic,
    Modern,
    Minimalist,
}

impl From<TemplateArg> for Template {
    fn from(t: TemplateArg) -> Self {
        match t {
            TemplateArg::Classic => Template::Classic,
            TemplateArg::Modern => Template::Modern,
            TemplateArg::Minimalist => Template::Minimalist,
        }
    }
}

fn open_store(dir: Option<&Path>) -> Result<JsonDirStore, Error> {
    match dir {
        Some(dir) => JsonDirStore::open(dir),
        None => JsonDirStore::open_default(),
    }
}

fn load(source: &Source, store_dir: Option<&Path>) -> Result<Resume, Error> {
    match (&source.file, source.id) {
        (Some(path), _) => Resume::from_json(&std::fs::read_to_string(path)?),
        (None, Some(id)) => open_store(store_dir)?
            .get(id)?
            .ok_or(Error::ResumeNotFound(id)),
        (None, None) => Err(Error::Config("no resume given".into())),
    }
}

fn file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{stem}.pdf")
}

#[cfg(feature = "gemini")]
fn rewriter() -> Result<resume_pdf::rewrite::Rewriter<resume_pdf::rewrite::GeminiClient>, Error> {
    Ok(resume_pdf::rewrite::Rewriter::new(
        resume_pdf::rewrite::GeminiClient::from_env()?,
    ))
}

#[cfg(not(feature = "gemini"))]
fn rewriter() -> Result<resume_pdf::rewrite::Rewriter<NoBackend>, Error> {
    Err(Error::Config(
        "built without the `gemini` feature; no completion service available".into(),
    ))
}

#[cfg(not(feature = "gemini"))]
struct NoBackend;

#[cfg(not(feature = "gemini"))]
impl resume_pdf::rewrite::TextCompletion for NoBackend {
    fn complete(&self, _prompt: &str) -> resume_pdf::Result<String> {
        Err(Error::Completion("no backend".into()))
    }
}

fn print_listing(resumes: &[Resume]) {
    for r in resumes {
        println!(
            "{:>5}  {}  {:<10}  {}",
            r.id,
            resume_pdf::layout::format_date(r.last_modified),
            r.template().id(),
            r.job_name()
        );
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let store_dir = cli.store.as_deref();
    match cli.command {
        Command::Export {
            source,
            output,
            pages,
            template,
            page,
        } => {
            let resume = load(&source, store_dir)?;
            let mut options = ExportOptions::default()
                .geometry(page.geometry()?)
                .pages(pages)
                .fonts(FontConfig::from_env());
            if let Some(t) = template {
                options = options.template(t.into());
            }
            let output = output.unwrap_or_else(|| PathBuf::from(file_stem(resume.job_name())));
            let doc =
                resume_pdf::export_to_path(&resume, &options, &output, &CancellationSignal::new())?;
            println!(
                "{} ({} of {} pages)",
                output.display(),
                doc.pages_written.len(),
                doc.page_count
            );
        }
        Command::Layout { source, page } => {
            let resume = load(&source, store_dir)?;
            let geometry = page.geometry()?;
            let fonts = FontSet::load(&FontConfig::from_env())?;
            let layout = resume_pdf::layout::paginate(&resume, &geometry, &fonts);
            for block in layout.blocks() {
                println!(
                    "page {:>3}  y {:>7.1}  h {:>7.1}  {:?}",
                    block.page + 1,
                    block.y,
                    block.height,
                    block.kind()
                );
            }
            for br in layout.breaks() {
                println!(
                    "break before page {}: {:?} ({:.1} high) at y {:.1}",
                    br.page + 1,
                    br.trigger,
                    br.block_height,
                    br.y_before
                );
            }
            println!("{} page(s)", layout.page_count());
        }
        Command::Store(cmd) => {
            let mut store = open_store(store_dir)?;
            match cmd {
                StoreCommand::List => print_listing(&store.list_recent()?),
                StoreCommand::Search { query, filter } => {
                    print_listing(&store.search(&query, filter.as_deref())?)
                }
                StoreCommand::Show { id } => {
                    let r = store.get(id)?.ok_or(Error::ResumeNotFound(id))?;
                    println!("{}", r.to_json()?);
                }
                StoreCommand::Import { file } => {
                    let mut r = Resume::from_json(&std::fs::read_to_string(&file)?)?;
                    resume_pdf::store::touch(&mut r);
                    let id = store.create(r)?;
                    println!("{id}");
                }
                StoreCommand::Delete { id } => {
                    if !store.delete(id)? {
                        return Err(Error::ResumeNotFound(id));
                    }
                }
            }
        }
        Command::Improve { id, experience } => {
            let rewriter = rewriter()?;
            let mut store = open_store(store_dir)?;
            let mut r = store.get(id)?.ok_or(Error::ResumeNotFound(id))?;
            rewriter.improve_experience(&mut r, &experience)?;
            resume_pdf::store::touch(&mut r);
            store.update(&r)?;
            if let Some(e) = r.experiences.iter().find(|e| e.id == experience) {
                println!("{}", e.description);
            }
        }
        Command::Summary { id } => {
            let rewriter = rewriter()?;
            let mut store = open_store(store_dir)?;
            let mut r = store.get(id)?.ok_or(Error::ResumeNotFound(id))?;
            let Some(summary) = rewriter.generate_summary(&r) else {
                return Err(Error::Completion("no summary generated".into()));
            };
            r.personal_info.summary = summary;
            resume_pdf::store::touch(&mut r);
            store.update(&r)?;
            println!("{}", r.personal_info.summary);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
