use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("project at position {0} has an empty id")]
    EmptyId(usize),
    #[error("project id {0} appears more than once")]
    DuplicateId(String),
    #[error("catalog is not valid json: {0}")]
    Malformed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub display_name: String,
    /// Icon label shown on the desktop, e.g. `tesla_offroad.exe`.
    pub file_name: String,
    pub subtitle: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Read-only, ordered list of projects shown on the desktop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (index, project) in projects.iter().enumerate() {
            if project.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(index));
            }
            if !seen.insert(project.id.as_str()) {
                return Err(CatalogError::DuplicateId(project.id.clone()));
            }
        }
        Ok(Self { projects })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let projects: Vec<Project> =
            serde_json::from_str(raw).map_err(|err| CatalogError::Malformed(err.to_string()))?;
        Self::new(projects)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid catalog {}", path.display()))
    }

    pub fn builtin() -> Self {
        Self {
            projects: vec![
                project(
                    "jobsculptor",
                    "JobSculptor",
                    "jobsculptor.exe",
                    "AI-Powered Job-Application Manager",
                    "An intuitive interface for effortless job application management with AI-driven assistance. Built with React Native Expo and powered by Supabase.",
                    &["Research", "AI Integration", "Full-Stack Development", "React Native"],
                    "projects/jobsculptor_banner.png",
                ),
                project(
                    "tesla",
                    "Tesla Off-Road",
                    "tesla_offroad.exe",
                    "Mobile 4x4 EV Adventure",
                    "A mobile off-road driving game with realistic physics and monetization. Reached 100K+ downloads.",
                    &["Game Programming", "Unity", "Monetization", "Level Design"],
                    "projects/tesla_banner.jpg",
                ),
                project(
                    "xblade",
                    "X-Blade",
                    "xblade_game.exe",
                    "Arcade Action Shooter",
                    "An arcade shooter with rewarded ads, leaderboards and competitive gameplay.",
                    &["Lead Programming", "Unity", "VFX", "Game Center"],
                    "projects/xblade_banner.jpg",
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(|project| project.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

fn project(
    id: &str,
    display_name: &str,
    file_name: &str,
    subtitle: &str,
    description: &str,
    tags: &[&str],
    image: &str,
) -> Project {
    Project {
        id: id.to_string(),
        display_name: display_name.to_string(),
        file_name: file_name.to_string(),
        subtitle: subtitle.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        image: image.to_string(),
        link: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_catalog_is_ordered_and_valid() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.ids().collect::<Vec<_>>(),
            vec!["jobsculptor", "tesla", "xblade"]
        );
        assert!(Catalog::new(catalog.projects().to_vec()).is_ok());
    }

    #[test]
    fn parses_external_catalog() {
        let catalog = Catalog::from_json(
            r#"[{"id":"site","displayName":"Astro","fileName":"astro.exe","subtitle":"Web",
                "description":"Static site","image":"astro.png","link":"https://astro.org.in"}]"#,
        )
        .unwrap();
        let project = catalog.get("site").unwrap();
        assert_eq!(project.tags, Vec::<String>::new());
        assert_eq!(project.link.as_deref(), Some("https://astro.org.in"));
    }

    #[test]
    fn rejects_duplicate_and_empty_ids() {
        let mut projects = Catalog::builtin().projects().to_vec();
        projects.push(projects[1].clone());
        assert_eq!(
            Catalog::new(projects),
            Err(CatalogError::DuplicateId("tesla".into()))
        );

        let mut blank = Catalog::builtin().projects().to_vec();
        blank[2].id = "  ".into();
        assert_eq!(Catalog::new(blank), Err(CatalogError::EmptyId(2)));
    }

    #[test]
    fn load_file_reports_path() {
        let err = Catalog::load_file("/nonexistent/catalog.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }
}
