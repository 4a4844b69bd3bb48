// Repository to project transformation.
// Turns raw GitHub repository rows into display-ready project cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::Repository;

/// Most projects shown in the feed.
pub const MAX_PROJECTS: usize = 12;

/// Most tags on a single project.
pub const MAX_TAGS: usize = 5;

/// Most topic-derived tags added after the language tags.
const MAX_TOPIC_TAGS: usize = 3;

const FALLBACK_DESCRIPTION: &str = "A project showcasing modern development practices.";
const FALLBACK_TAG: &str = "Project";

/// Card backgrounds, assigned by position.
pub const GRADIENTS: [&str; 8] = [
    "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
    "linear-gradient(135deg, #30cfd0 0%, #330867 100%)",
    "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
    "linear-gradient(135deg, #ff9a9e 0%, #fecfef 100%)",
    "linear-gradient(135deg, #ffecd2 0%, #fcb69f 100%)",
];

/// A project card for the portfolio's projects section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub links: ProjectLinks,
    pub gradient: String,
    pub updated_at: DateTime<Utc>,
    pub stars: u64,
}

/// Outbound links for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// Drop forks, order by last update (newest first), keep the first
/// `MAX_PROJECTS`, and turn each into a project card.
pub fn select_projects(mut repos: Vec<Repository>) -> Vec<Project> {
    repos.retain(|repo| !repo.fork);
    repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    repos
        .iter()
        .take(MAX_PROJECTS)
        .enumerate()
        .map(|(index, repo)| to_project(repo, index))
        .collect()
}

/// Build the card for the repository shown at `index`.
pub fn to_project(repo: &Repository, index: usize) -> Project {
    let demo = repo
        .homepage
        .as_deref()
        .map(str::trim)
        .filter(|homepage| !homepage.is_empty())
        .map(str::to_string);

    Project {
        title: title_case(&repo.name),
        description: repo
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(FALLBACK_DESCRIPTION)
            .to_string(),
        tags: tags_for(repo),
        links: ProjectLinks {
            demo,
            github: Some(repo.html_url.clone()),
        },
        gradient: gradient_for(index).to_string(),
        updated_at: repo.updated_at,
        stars: repo.stargazers_count,
    }
}

/// `my-cool-app` becomes `My Cool App`.
pub fn title_case(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Tags implied by a repository's primary language.
pub fn language_tags(language: &str) -> Vec<&str> {
    match language {
        "TypeScript" => vec!["TypeScript", "React", "Next.js"],
        "JavaScript" => vec!["JavaScript", "React", "Node.js"],
        "Jupyter Notebook" => vec!["Python", "Data Science"],
        other => vec![other],
    }
}

/// Language tags, then up to three new topics; `Project` if nothing applies.
pub fn tags_for(repo: &Repository) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    if let Some(language) = repo.language.as_deref().filter(|l| !l.is_empty()) {
        for tag in language_tags(language) {
            push_unique(&mut tags, tag);
        }
    }

    let mut topics_added = 0;
    for topic in &repo.topics {
        if topics_added == MAX_TOPIC_TAGS {
            break;
        }
        if push_unique(&mut tags, topic) {
            topics_added += 1;
        }
    }

    if tags.is_empty() {
        tags.push(FALLBACK_TAG.to_string());
    }

    tags.truncate(MAX_TAGS);
    tags
}

fn push_unique(tags: &mut Vec<String>, tag: &str) -> bool {
    if tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

pub fn gradient_for(index: usize) -> &'static str {
    GRADIENTS[index % GRADIENTS.len()]
}
