//! Keyed resume persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::Resume;

/// Resume records keyed by a positive integer id.
pub trait ResumeStore {
    /// Insert `resume`, assigning the next free id when `resume.id == 0`.
    /// A record with the same id is replaced.
    fn create(&mut self, resume: Resume) -> Result<i64>;

    fn get(&self, id: i64) -> Result<Option<Resume>>;

    /// All resumes, most recently modified first.
    fn list_recent(&self) -> Result<Vec<Resume>>;

    /// Replace an existing record. Fails with [`Error::ResumeNotFound`] if
    /// there is nothing stored under `resume.id`.
    fn update(&mut self, resume: &Resume) -> Result<()>;

    /// Returns whether a record was removed.
    fn delete(&mut self, id: i64) -> Result<bool>;

    /// Case-insensitive match of `query` against title, name, email and
    /// phone, most recent first. `filter` additionally requires the title to
    /// contain it; `None` or `"All"` accepts every title. A blank query
    /// matches nothing.
    fn search(&self, query: &str, filter: Option<&str>) -> Result<Vec<Resume>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let filter = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty() && f != "all");
        let hits = self
            .list_recent()?
            .into_iter()
            .filter(|r| {
                let title = r.title.to_lowercase();
                let info = &r.personal_info;
                let text_match = [&title, &info.full_name, &info.email, &info.phone]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query));
                text_match && filter.as_ref().is_none_or(|f| title.contains(f.as_str()))
            })
            .collect();
        Ok(hits)
    }
}

/// Id for a new record given the highest stored id. Ids start at 1; 0 means
/// "not stored yet".
fn next_id(highest: Option<i64>) -> Result<i64> {
    highest
        .unwrap_or(0)
        .max(0)
        .checked_add(1)
        .ok_or_else(|| Error::Config("resume ids exhausted".into()))
}

fn check_explicit_id(id: i64) -> Result<()> {
    if id < 0 {
        return Err(Error::InvalidResumeId(id));
    }
    Ok(())
}

/// Stamp `last_modified` with the current time, as a save does.
pub fn touch(resume: &mut Resume) {
    resume.last_modified = chrono::Utc::now().timestamp_millis();
}

fn sort_recent(resumes: &mut [Resume]) {
    // Ties keep id order so listings are stable.
    resumes.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then(a.id.cmp(&b.id))
    });
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<i64, Resume>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResumeStore for MemoryStore {
    fn create(&mut self, mut resume: Resume) -> Result<i64> {
        check_explicit_id(resume.id)?;
        if resume.id == 0 {
            resume.id = next_id(self.records.keys().next_back().copied())?;
        }
        let id = resume.id;
        self.records.insert(id, resume);
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Option<Resume>> {
        Ok(self.records.get(&id).cloned())
    }

    fn list_recent(&self) -> Result<Vec<Resume>> {
        let mut all: Vec<Resume> = self.records.values().cloned().collect();
        sort_recent(&mut all);
        Ok(all)
    }

    fn update(&mut self, resume: &Resume) -> Result<()> {
        match self.records.get_mut(&resume.id) {
            Some(slot) => {
                *slot = resume.clone();
                Ok(())
            }
            None => Err(Error::ResumeNotFound(resume.id)),
        }
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        Ok(self.records.remove(&id).is_some())
    }
}

/// One pretty-printed `<id>.json` file per resume in a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        log::debug!("Resume store at {}", dir.display());
        Ok(JsonDirStore { dir })
    }

    /// Open the directory from RESUME_PDF_STORE or the user data directory.
    pub fn open_default() -> Result<Self> {
        let dir = crate::config::default_store_dir().ok_or_else(|| {
            Error::Config("no store directory: set RESUME_PDF_STORE or HOME".into())
        })?;
        Self::open(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn ids(&self) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json")
                && let Some(id) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse::<i64>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    fn write(&self, resume: &Resume) -> Result<()> {
        let path = self.path_for(resume.id);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, resume.to_json()?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl ResumeStore for JsonDirStore {
    fn create(&mut self, mut resume: Resume) -> Result<i64> {
        check_explicit_id(resume.id)?;
        if resume.id == 0 {
            resume.id = next_id(self.ids()?.last().copied())?;
        }
        self.write(&resume)?;
        log::debug!("Stored resume {} in {}", resume.id, self.dir.display());
        Ok(resume.id)
    }

    fn get(&self, id: i64) -> Result<Option<Resume>> {
        match std::fs::read_to_string(self.path_for(id)) {
            Ok(json) => Ok(Some(Resume::from_json(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_recent(&self) -> Result<Vec<Resume>> {
        let mut all = Vec::new();
        for id in self.ids()? {
            match self.get(id) {
                Ok(Some(resume)) => all.push(resume),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping unreadable resume {id}: {e}"),
            }
        }
        sort_recent(&mut all);
        Ok(all)
    }

    fn update(&mut self, resume: &Resume) -> Result<()> {
        if !self.path_for(resume.id).exists() {
            return Err(Error::ResumeNotFound(resume.id));
        }
        self.write(resume)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        match std::fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
