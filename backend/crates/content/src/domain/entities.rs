//! Domain Entities
//!
//! Read models returned by the repositories and the records they persist.

use auth::models::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::id::{SerialId, markers};

use crate::domain::value_objects::{Name, Score, Slug, Text, Year};

pub type TermId = SerialId<markers::Term>;
pub type TitleId = SerialId<markers::Title>;
pub type ReviewId = SerialId<markers::Review>;
pub type CommentId = SerialId<markers::Comment>;

/// The two flat classifications a title carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    /// At most one per title
    Category,
    /// Any number per title
    Genre,
}

impl Taxonomy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Taxonomy::Category => "category",
            Taxonomy::Genre => "genre",
        }
    }
}

/// A category or genre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub name: Name,
    pub slug: Slug,
}

/// Title with its classifications and computed rating
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: TitleId,
    pub name: Name,
    pub year: Year,
    pub description: Option<String>,
    pub category: Option<Term>,
    pub genres: Vec<Term>,
    /// Mean review score rounded to the nearest integer; `None` without reviews
    pub rating: Option<i32>,
}

/// Stored columns of a title; classifications are referenced by id
#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecord {
    pub name: Name,
    pub year: Year,
    pub description: Option<String>,
    pub category_id: Option<TermId>,
    pub genre_ids: Vec<TermId>,
}

impl From<&Title> for TitleRecord {
    fn from(title: &Title) -> Self {
        Self {
            name: title.name.clone(),
            year: title.year,
            description: title.description.clone(),
            category_id: title.category.as_ref().map(|c| c.id),
            genre_ids: title.genres.iter().map(|g| g.id).collect(),
        }
    }
}

/// Author of a review or comment, as shown to clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub title_id: TitleId,
    pub author: Author,
    pub text: Text,
    pub score: Score,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub title_id: TitleId,
    pub author: Author,
    pub text: Text,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub review_id: ReviewId,
    pub author: Author,
    pub text: Text,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub review_id: ReviewId,
    pub author: Author,
    pub text: Text,
}

/// Mean of `scores` rounded half away from zero
pub fn rating(scores: impl IntoIterator<Item = Score>) -> Option<i32> {
    let (sum, count) = scores
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), s| (sum + u32::from(s.value()), count + 1));
    (count > 0).then(|| (f64::from(sum) / f64::from(count)).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[i64]) -> Vec<Score> {
        values.iter().map(|v| Score::new(*v).unwrap()).collect()
    }

    #[test]
    fn test_rating_empty_is_none() {
        assert_eq!(rating(Vec::new()), None);
    }

    #[test]
    fn test_rating_rounds_to_nearest() {
        assert_eq!(rating(scores(&[10])), Some(10));
        assert_eq!(rating(scores(&[7, 8])), Some(8));
        assert_eq!(rating(scores(&[7, 7, 8])), Some(7));
        assert_eq!(rating(scores(&[1, 2, 2, 2])), Some(2));
    }
}
