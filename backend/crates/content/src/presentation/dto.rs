//! API DTOs (Data Transfer Objects)
//!
//! Request fields are `Option` so that a missing field becomes a field-level
//! validation message. Responses are the public read views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::application::{CommentInput, ReviewInput, TermInput, TitleInput};
use crate::domain::entities::{Comment, Review, Term, Title};
use crate::domain::repository::TitleFilter;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Keeps an explicit `null` apart from a missing field: missing is `None`,
/// `null` is `Some(None)`. Pair with `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Categories / Genres
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl From<TermRequest> for TermInput {
    fn from(req: TermRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermResponse {
    pub name: String,
    pub slug: String,
}

impl From<Term> for TermResponse {
    fn from(term: Term) -> Self {
        Self {
            name: term.name.as_str().to_string(),
            slug: term.slug.as_str().to_string(),
        }
    }
}

/// `?search=` on category and genre listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

// ============================================================================
// Titles
// ============================================================================

/// Write view: classifications are referenced by slug
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// `null` removes the category on update
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
}

impl From<TitleRequest> for TitleInput {
    fn from(req: TitleRequest) -> Self {
        Self {
            name: req.name,
            year: req.year,
            description: req.description,
            category: req.category,
            genre: req.genre,
        }
    }
}

/// Read view with nested classifications and the computed rating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleResponse {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub rating: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<TermResponse>,
    pub category: Option<TermResponse>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id.value(),
            name: title.name.as_str().to_string(),
            year: title.year.value(),
            rating: title.rating,
            description: title.description,
            genre: title.genres.into_iter().map(TermResponse::from).collect(),
            category: title.category.map(TermResponse::from),
        }
    }
}

/// `GET /titles` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleListQuery {
    pub genre: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
    pub search: Option<String>,
}

impl From<TitleListQuery> for TitleFilter {
    fn from(query: TitleListQuery) -> Self {
        Self {
            genre: non_empty(query.genre),
            category: non_empty(query.category),
            year: query.year,
            name: non_empty(query.name),
            search: non_empty(query.search),
        }
    }
}

// ============================================================================
// Reviews / Comments
// ============================================================================

/// Any `author` or `title` the client sends is ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub text: Option<String>,
    pub score: Option<i64>,
}

impl From<ReviewRequest> for ReviewInput {
    fn from(req: ReviewRequest) -> Self {
        Self {
            text: req.text,
            score: req.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub text: String,
    /// Author's username
    pub author: String,
    pub score: u8,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.value(),
            text: review.text.as_str().to_string(),
            author: review.author.username,
            score: review.score.value(),
            pub_date: review.pub_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

impl From<CommentRequest> for CommentInput {
    fn from(req: CommentRequest) -> Self {
        Self { text: req.text }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.value(),
            text: comment.text.as_str().to_string(),
            author: comment.author.username,
            pub_date: comment.pub_date,
        }
    }
}
