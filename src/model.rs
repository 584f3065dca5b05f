use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    Classic,
    Modern,
    Minimalist,
}

impl Template {
    /// Unknown identifiers render as Classic.
    pub fn from_id(id: &str) -> Self {
        match id {
            "Modern" => Template::Modern,
            "Minimalist" => Template::Minimalist,
            _ => Template::Classic,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Template::Classic => "Classic",
            Template::Modern => "Modern",
            Template::Minimalist => "Minimalist",
        }
    }

    /// Accent color for the title and headings.
    pub fn accent(self) -> [u8; 3] {
        match self {
            Template::Classic => [0, 0, 0],
            Template::Modern => [0, 102, 204],
            Template::Minimalist => [68, 68, 68],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub summary: String,
    pub address: String,
}

impl PersonalInfo {
    /// Contact fields in print order, paired with their labels.
    pub fn labeled_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Name", &self.full_name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Address", &self.address),
            ("LinkedIn", &self.linkedin),
            ("GitHub", &self.github),
        ]
    }
}

/// Whitespace-only text counts as empty.
fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub id: String,
    pub job_title: String,
    pub company: String,
    pub start_date: String, // MM/YYYY
    pub end_date: String,   // MM/YYYY or "Present"
    pub description: String,
}

impl Experience {
    pub fn is_empty(&self) -> bool {
        blank(&self.job_title)
            && blank(&self.company)
            && blank(&self.start_date)
            && blank(&self.end_date)
            && blank(&self.description)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: String,
    pub degree: String,
    pub field: String,
    pub institution: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

impl Education {
    pub fn is_empty(&self) -> bool {
        blank(&self.degree)
            && blank(&self.field)
            && blank(&self.institution)
            && blank(&self.start_date)
            && blank(&self.end_date)
            && blank(&self.description)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub role: String,
    pub technologies: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

impl Project {
    pub fn is_empty(&self) -> bool {
        blank(&self.name)
            && blank(&self.role)
            && blank(&self.technologies)
            && blank(&self.start_date)
            && blank(&self.end_date)
            && blank(&self.description)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub id: String,
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: String,
    pub expiration_date: String, // MM/YYYY or "No Expiration"
    pub credential_id: String,
    pub credential_url: String,
}

impl Certification {
    pub fn is_empty(&self) -> bool {
        blank(&self.name)
            && blank(&self.issuing_organization)
            && blank(&self.issue_date)
            && blank(&self.expiration_date)
            && blank(&self.credential_id)
            && blank(&self.credential_url)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: String, // Beginner, Intermediate, Advanced
}

impl Default for Skill {
    fn default() -> Self {
        Skill {
            id: String::new(),
            name: String::new(),
            level: "Beginner".to_string(),
        }
    }
}

impl Skill {
    pub fn is_empty(&self) -> bool {
        blank(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resume {
    pub id: i64,
    pub title: String,
    pub personal_info: PersonalInfo,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    pub template_id: String,
}

impl Default for Resume {
    fn default() -> Self {
        Resume {
            id: 0,
            title: String::new(),
            personal_info: PersonalInfo::default(),
            experiences: Vec::new(),
            educations: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            last_modified: 0,
            template_id: Template::Classic.id().to_string(),
        }
    }
}

impl Resume {
    pub fn template(&self) -> Template {
        Template::from_id(&self.template_id)
    }

    /// Title used for the document info dictionary and print job name.
    pub fn job_name(&self) -> &str {
        match self.title.trim() {
            "" => "Resume",
            title => title,
        }
    }

    pub fn from_json(json: &str) -> crate::Result<Resume> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
