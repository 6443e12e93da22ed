//! In-Memory Repository
//!
//! Backs the server when no database is configured, and the test suites.
//! Cascades and ordering match the PostgreSQL schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use auth::models::user_id::UserId;
use chrono::Utc;
use kernel::pagination::{Page, PageQuery};
use tokio::sync::RwLock;

use crate::domain::entities::{
    Comment, CommentId, NewComment, NewReview, Review, ReviewId, Taxonomy, Term, TermId, Title,
    TitleId, TitleRecord, rating,
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TermRepository, TitleFilter, TitleRepository,
};
use crate::domain::value_objects::{Name, Slug};
use crate::error::{ContentError, ContentResult};

#[derive(Default)]
struct Store {
    sequence: i64,
    categories: Vec<Term>,
    genres: Vec<Term>,
    titles: BTreeMap<TitleId, TitleRecord>,
    reviews: Vec<Review>,
    comments: Vec<Comment>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    fn terms(&self, kind: Taxonomy) -> &Vec<Term> {
        match kind {
            Taxonomy::Category => &self.categories,
            Taxonomy::Genre => &self.genres,
        }
    }

    fn terms_mut(&mut self, kind: Taxonomy) -> &mut Vec<Term> {
        match kind {
            Taxonomy::Category => &mut self.categories,
            Taxonomy::Genre => &mut self.genres,
        }
    }

    fn term(&self, kind: Taxonomy, id: TermId) -> Option<Term> {
        self.terms(kind).iter().find(|t| t.id == id).cloned()
    }

    fn hydrate(&self, id: TitleId, record: &TitleRecord) -> Title {
        let mut genres: Vec<Term> = record
            .genre_ids
            .iter()
            .filter_map(|g| self.term(Taxonomy::Genre, *g))
            .collect();
        genres.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));

        Title {
            id,
            name: record.name.clone(),
            year: record.year,
            description: record.description.clone(),
            category: record
                .category_id
                .and_then(|c| self.term(Taxonomy::Category, c)),
            genres,
            rating: rating(
                self.reviews
                    .iter()
                    .filter(|r| r.title_id == id)
                    .map(|r| r.score),
            ),
        }
    }

    fn matches(&self, record: &TitleRecord, filter: &TitleFilter) -> bool {
        let slug_of = |kind, id| self.term(kind, id).map(|t| t.slug);

        if let Some(genre) = &filter.genre {
            let found = record
                .genre_ids
                .iter()
                .any(|g| slug_of(Taxonomy::Genre, *g).is_some_and(|s| s.as_str() == genre));
            if !found {
                return false;
            }
        }
        if let Some(category) = &filter.category {
            let found = record
                .category_id
                .and_then(|c| slug_of(Taxonomy::Category, c))
                .is_some_and(|s| s.as_str() == category);
            if !found {
                return false;
            }
        }
        if filter.year.is_some_and(|y| y != record.year.value()) {
            return false;
        }
        if let Some(name) = &filter.name {
            if !contains_ci(record.name.as_str(), name) {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let in_description = record
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, search));
            if !contains_ci(record.name.as_str(), search) && !in_description {
                return false;
            }
        }
        true
    }

    fn remove_review_cascade(&mut self, id: ReviewId) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|r| r.id != id);
        self.comments.retain(|c| c.review_id != id);
        self.reviews.len() != before
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn page_of<T>(items: Vec<T>, page: &PageQuery) -> Page<T> {
    let count = items.len() as u64;
    Page::new(page.slice(items), count, page)
}

#[derive(Clone, Default)]
pub struct InMemoryContentRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Terms
// ============================================================================

impl TermRepository for InMemoryContentRepository {
    async fn create_term(&self, kind: Taxonomy, name: &Name, slug: &Slug) -> ContentResult<Term> {
        let mut store = self.store.write().await;
        if store.terms(kind).iter().any(|t| &t.slug == slug) {
            return Err(ContentError::SlugTaken(kind));
        }
        let term = Term {
            id: TermId::new(store.next_id()),
            name: name.clone(),
            slug: slug.clone(),
        };
        store.terms_mut(kind).push(term.clone());
        Ok(term)
    }

    async fn find_term(&self, kind: Taxonomy, slug: &Slug) -> ContentResult<Option<Term>> {
        let store = self.store.read().await;
        Ok(store.terms(kind).iter().find(|t| &t.slug == slug).cloned())
    }

    async fn delete_term(&self, kind: Taxonomy, slug: &Slug) -> ContentResult<bool> {
        let mut store = self.store.write().await;
        let Some(id) = store
            .terms(kind)
            .iter()
            .find(|t| &t.slug == slug)
            .map(|t| t.id)
        else {
            return Ok(false);
        };

        store.terms_mut(kind).retain(|t| t.id != id);
        for record in store.titles.values_mut() {
            match kind {
                Taxonomy::Category if record.category_id == Some(id) => record.category_id = None,
                Taxonomy::Genre => record.genre_ids.retain(|g| *g != id),
                Taxonomy::Category => {}
            }
        }
        Ok(true)
    }

    async fn list_terms(
        &self,
        kind: Taxonomy,
        search: Option<&str>,
        page: &PageQuery,
    ) -> ContentResult<Page<Term>> {
        let store = self.store.read().await;
        let mut terms: Vec<Term> = store
            .terms(kind)
            .iter()
            .filter(|t| search.is_none_or(|s| contains_ci(t.name.as_str(), s)))
            .cloned()
            .collect();
        terms.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()).then(a.id.cmp(&b.id)));
        Ok(page_of(terms, page))
    }
}

// ============================================================================
// Titles
// ============================================================================

impl TitleRepository for InMemoryContentRepository {
    async fn create_title(&self, record: &TitleRecord) -> ContentResult<TitleId> {
        let mut store = self.store.write().await;
        let id = TitleId::new(store.next_id());
        store.titles.insert(id, record.clone());
        Ok(id)
    }

    async fn find_title(&self, id: TitleId) -> ContentResult<Option<Title>> {
        let store = self.store.read().await;
        Ok(store.titles.get(&id).map(|record| store.hydrate(id, record)))
    }

    async fn update_title(&self, id: TitleId, record: &TitleRecord) -> ContentResult<bool> {
        let mut store = self.store.write().await;
        match store.titles.get_mut(&id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_title(&self, id: TitleId) -> ContentResult<bool> {
        let mut store = self.store.write().await;
        if store.titles.remove(&id).is_none() {
            return Ok(false);
        }
        let review_ids: Vec<ReviewId> = store
            .reviews
            .iter()
            .filter(|r| r.title_id == id)
            .map(|r| r.id)
            .collect();
        for review_id in review_ids {
            store.remove_review_cascade(review_id);
        }
        Ok(true)
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: &PageQuery,
    ) -> ContentResult<Page<Title>> {
        let store = self.store.read().await;
        let mut titles: Vec<Title> = store
            .titles
            .iter()
            .filter(|(_, record)| store.matches(record, filter))
            .map(|(id, record)| store.hydrate(*id, record))
            .collect();
        titles.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()).then(a.id.cmp(&b.id)));
        Ok(page_of(titles, page))
    }
}

// ============================================================================
// Reviews
// ============================================================================

impl ReviewRepository for InMemoryContentRepository {
    async fn create_review(&self, review: &NewReview) -> ContentResult<Review> {
        let mut store = self.store.write().await;
        let duplicate = store
            .reviews
            .iter()
            .any(|r| r.title_id == review.title_id && r.author.user_id == review.author.user_id);
        if duplicate {
            return Err(ContentError::DuplicateReview);
        }
        let created = Review {
            id: ReviewId::new(store.next_id()),
            title_id: review.title_id,
            author: review.author.clone(),
            text: review.text.clone(),
            score: review.score,
            pub_date: Utc::now(),
        };
        store.reviews.push(created.clone());
        Ok(created)
    }

    async fn find_review(&self, title_id: TitleId, id: ReviewId) -> ContentResult<Option<Review>> {
        let store = self.store.read().await;
        Ok(store
            .reviews
            .iter()
            .find(|r| r.id == id && r.title_id == title_id)
            .cloned())
    }

    async fn update_review(&self, review: &Review) -> ContentResult<()> {
        let mut store = self.store.write().await;
        if let Some(stored) = store.reviews.iter_mut().find(|r| r.id == review.id) {
            stored.text = review.text.clone();
            stored.score = review.score;
        }
        Ok(())
    }

    async fn delete_review(&self, id: ReviewId) -> ContentResult<bool> {
        Ok(self.store.write().await.remove_review_cascade(id))
    }

    async fn has_review(&self, title_id: TitleId, author: &UserId) -> ContentResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .reviews
            .iter()
            .any(|r| r.title_id == title_id && &r.author.user_id == author))
    }

    async fn purge_author(&self, author: &UserId) -> ContentResult<()> {
        let mut store = self.store.write().await;
        let written: Vec<ReviewId> = store
            .reviews
            .iter()
            .filter(|r| &r.author.user_id == author)
            .map(|r| r.id)
            .collect();
        for id in written {
            store.remove_review_cascade(id);
        }
        store.comments.retain(|c| &c.author.user_id != author);
        Ok(())
    }

    async fn list_reviews(
        &self,
        title_id: TitleId,
        page: &PageQuery,
    ) -> ContentResult<Page<Review>> {
        let store = self.store.read().await;
        let mut reviews: Vec<Review> = store
            .reviews
            .iter()
            .filter(|r| r.title_id == title_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(page_of(reviews, page))
    }
}

// ============================================================================
// Comments
// ============================================================================

impl CommentRepository for InMemoryContentRepository {
    async fn create_comment(&self, comment: &NewComment) -> ContentResult<Comment> {
        let mut store = self.store.write().await;
        let created = Comment {
            id: CommentId::new(store.next_id()),
            review_id: comment.review_id,
            author: comment.author.clone(),
            text: comment.text.clone(),
            pub_date: Utc::now(),
        };
        store.comments.push(created.clone());
        Ok(created)
    }

    async fn find_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
    ) -> ContentResult<Option<Comment>> {
        let store = self.store.read().await;
        Ok(store
            .comments
            .iter()
            .find(|c| c.id == id && c.review_id == review_id)
            .cloned())
    }

    async fn update_comment(&self, comment: &Comment) -> ContentResult<()> {
        let mut store = self.store.write().await;
        if let Some(stored) = store.comments.iter_mut().find(|c| c.id == comment.id) {
            stored.text = comment.text.clone();
        }
        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> ContentResult<bool> {
        let mut store = self.store.write().await;
        let before = store.comments.len();
        store.comments.retain(|c| c.id != id);
        Ok(store.comments.len() != before)
    }

    async fn list_comments(
        &self,
        review_id: ReviewId,
        page: &PageQuery,
    ) -> ContentResult<Page<Comment>> {
        let store = self.store.read().await;
        let mut comments: Vec<Comment> = store
            .comments
            .iter()
            .filter(|c| c.review_id == review_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(page_of(comments, page))
    }
}
