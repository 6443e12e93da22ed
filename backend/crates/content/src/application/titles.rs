//! Titles Use Case
//!
//! Writes reference categories and genres by slug; an unknown slug is a
//! field error, not a 404. Reads return the full title with its rating.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use kernel::error::validation::Violations;
use kernel::pagination::{Page, PageQuery};

use crate::domain::entities::{Taxonomy, TermId, Title, TitleId, TitleRecord};
use crate::domain::repository::{TermRepository, TitleFilter, TitleRepository};
use crate::domain::value_objects::{Name, Slug, Year};
use crate::error::{ContentError, ContentResult};

/// Raw request fields, shared by create and partial update
#[derive(Debug, Clone, Default)]
pub struct TitleInput {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Category slug; `Some(None)` clears the category on update
    pub category: Option<Option<String>>,
    /// Genre slugs
    pub genre: Option<Vec<String>>,
}

pub struct TitlesUseCase<R>
where
    R: TitleRepository + TermRepository,
{
    repo: Arc<R>,
}

impl<R> TitlesUseCase<R>
where
    R: TitleRepository + TermRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: TitleFilter, page: PageQuery) -> ContentResult<Page<Title>> {
        self.repo.list_titles(&filter, &page).await
    }

    pub async fn get(&self, id: TitleId) -> ContentResult<Title> {
        self.repo
            .find_title(id)
            .await?
            .ok_or(ContentError::TitleNotFound)
    }

    pub async fn create(&self, input: TitleInput) -> ContentResult<Title> {
        let mut violations = Violations::new();

        let name = violations
            .require("name", input.name)
            .and_then(|raw| violations.check("name", Name::new(raw)));
        let year = violations
            .require("year", input.year)
            .and_then(|raw| violations.check("year", Year::new(raw, current_year())));
        let category_id = match input.category.flatten() {
            Some(slug) => self.resolve(&mut violations, Taxonomy::Category, "category", &slug).await?,
            None => None,
        };
        let genre_ids = self
            .resolve_genres(&mut violations, input.genre.unwrap_or_default())
            .await?;

        let (Some(name), Some(year)) = (name, year) else {
            return Err(violations.into());
        };
        violations.into_result()?;

        let record = TitleRecord {
            name,
            year,
            description: input.description.filter(|d| !d.trim().is_empty()),
            category_id,
            genre_ids,
        };
        let id = self.repo.create_title(&record).await?;

        tracing::info!(title_id = %id, name = record.name.as_str(), "Title created");

        self.get(id).await
    }

    pub async fn update(&self, id: TitleId, input: TitleInput) -> ContentResult<Title> {
        let current = self.get(id).await?;
        let mut record = TitleRecord::from(&current);
        let mut violations = Violations::new();

        if let Some(raw) = input.name {
            if let Some(name) = violations.check("name", Name::new(raw)) {
                record.name = name;
            }
        }
        if let Some(raw) = input.year {
            if let Some(year) = violations.check("year", Year::new(raw, current_year())) {
                record.year = year;
            }
        }
        if let Some(description) = input.description {
            record.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        match input.category {
            Some(Some(slug)) => {
                record.category_id = self
                    .resolve(&mut violations, Taxonomy::Category, "category", &slug)
                    .await?;
            }
            Some(None) => record.category_id = None,
            None => {}
        }
        if let Some(slugs) = input.genre {
            record.genre_ids = self.resolve_genres(&mut violations, slugs).await?;
        }

        violations.into_result()?;

        if !self.repo.update_title(id, &record).await? {
            return Err(ContentError::TitleNotFound);
        }

        tracing::info!(title_id = %id, "Title updated");

        self.get(id).await
    }

    pub async fn delete(&self, id: TitleId) -> ContentResult<()> {
        if !self.repo.delete_title(id).await? {
            return Err(ContentError::TitleNotFound);
        }

        tracing::info!(title_id = %id, "Title deleted");

        Ok(())
    }

    /// Look up one slug, recording a field error when it is invalid or unknown
    async fn resolve(
        &self,
        violations: &mut Violations,
        kind: Taxonomy,
        field: &'static str,
        raw: &str,
    ) -> ContentResult<Option<TermId>> {
        let Some(slug) = violations.check(field, Slug::new(raw)) else {
            return Ok(None);
        };
        match self.repo.find_term(kind, &slug).await? {
            Some(term) => Ok(Some(term.id)),
            None => {
                violations.add(field, format!("Object with slug={slug} does not exist"));
                Ok(None)
            }
        }
    }

    async fn resolve_genres(
        &self,
        violations: &mut Violations,
        slugs: Vec<String>,
    ) -> ContentResult<Vec<TermId>> {
        let mut ids = Vec::with_capacity(slugs.len());
        for raw in slugs {
            if let Some(id) = self.resolve(violations, Taxonomy::Genre, "genre", &raw).await? {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}
