//! Categories and Genres Use Case
//!
//! Both taxonomies share one shape: a name and a unique slug, listed by name,
//! created and deleted by admins. Access control happens in the handlers.

use std::sync::Arc;

use kernel::error::validation::Violations;
use kernel::pagination::{Page, PageQuery};

use crate::domain::entities::{Taxonomy, Term};
use crate::domain::repository::TermRepository;
use crate::domain::value_objects::{Name, Slug};
use crate::error::{ContentError, ContentResult};

/// Raw request fields
#[derive(Debug, Clone, Default)]
pub struct TermInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

pub struct TermsUseCase<R>
where
    R: TermRepository,
{
    repo: Arc<R>,
    kind: Taxonomy,
}

impl<R> TermsUseCase<R>
where
    R: TermRepository,
{
    pub fn new(repo: Arc<R>, kind: Taxonomy) -> Self {
        Self { repo, kind }
    }

    pub async fn list(&self, search: Option<String>, page: PageQuery) -> ContentResult<Page<Term>> {
        let search = search.filter(|s| !s.trim().is_empty());
        self.repo
            .list_terms(self.kind, search.as_deref(), &page)
            .await
    }

    pub async fn create(&self, input: TermInput) -> ContentResult<Term> {
        let mut violations = Violations::new();

        let name = violations
            .require("name", input.name)
            .and_then(|raw| violations.check("name", Name::new(raw)));
        let slug = violations
            .require("slug", input.slug)
            .and_then(|raw| violations.check("slug", Slug::new(raw)));

        let (Some(name), Some(slug)) = (name, slug) else {
            return Err(violations.into());
        };

        if self.repo.find_term(self.kind, &slug).await?.is_some() {
            return Err(ContentError::SlugTaken(self.kind));
        }

        let term = self.repo.create_term(self.kind, &name, &slug).await?;

        tracing::info!(kind = self.kind.as_str(), slug = %term.slug, "Term created");

        Ok(term)
    }

    pub async fn delete(&self, slug: &str) -> ContentResult<()> {
        let slug = Slug::new(slug).map_err(|_| ContentError::TermNotFound(self.kind))?;

        if !self.repo.delete_term(self.kind, &slug).await? {
            return Err(ContentError::TermNotFound(self.kind));
        }

        tracing::info!(kind = self.kind.as_str(), slug = %slug, "Term deleted");

        Ok(())
    }
}
