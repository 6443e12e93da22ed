//! PostgreSQL Repository Implementations

use std::collections::HashMap;

use auth::models::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::pagination::{Page, PageQuery};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    Author, Comment, CommentId, NewComment, NewReview, Review, ReviewId, Taxonomy, Term, TermId,
    Title, TitleId, TitleRecord,
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TermRepository, TitleFilter, TitleRepository,
};
use crate::domain::value_objects::{Name, Score, Slug, Text, Year};
use crate::error::ContentResult;

fn table(kind: Taxonomy) -> &'static str {
    match kind {
        Taxonomy::Category => "categories",
        Taxonomy::Genre => "genres",
    }
}

const TITLE_SELECT: &str = r#"
    SELECT
        t.id,
        t.name,
        t.year,
        t.description,
        c.id AS category_id,
        c.name AS category_name,
        c.slug AS category_slug,
        (SELECT ROUND(AVG(r.score))::INT FROM reviews r WHERE r.title_id = t.id) AS rating
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

const TITLE_FILTER: &str = r#"
    WHERE ($1::TEXT IS NULL OR EXISTS (
            SELECT 1 FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = t.id AND g.slug = $1
        ))
      AND ($2::TEXT IS NULL OR c.slug = $2)
      AND ($3::INT IS NULL OR t.year = $3)
      AND ($4::TEXT IS NULL OR strpos(lower(t.name), lower($4)) > 0)
      AND ($5::TEXT IS NULL
           OR strpos(lower(t.name), lower($5)) > 0
           OR strpos(lower(coalesce(t.description, '')), lower($5)) > 0)
"#;

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.title_id, r.author_id, u.user_name AS author_name, r.text, r.score, r.pub_date
    FROM reviews r
    JOIN users u ON u.user_id = r.author_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.review_id, c.author_id, u.user_name AS author_name, c.text, c.pub_date
    FROM comments c
    JOIN users u ON u.user_id = c.author_id
"#;

/// PostgreSQL-backed content store
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach genres to already loaded title rows, keeping row order
    async fn hydrate(&self, rows: Vec<TitleRow>) -> ContentResult<Vec<Title>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let genre_rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT tg.title_id, g.id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<i64, Vec<Term>> = HashMap::new();
        for row in genre_rows {
            genres.entry(row.title_id).or_default().push(Term {
                id: TermId::new(row.id),
                name: Name::from_db(row.name),
                slug: Slug::from_db(row.slug),
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let title_genres = genres.remove(&row.id).unwrap_or_default();
                row.into_title(title_genres)
            })
            .collect())
    }

    async fn replace_genres(
        tx: &mut sqlx::PgConnection,
        id: TitleId,
        genre_ids: &[TermId],
    ) -> ContentResult<()> {
        let genre_ids: Vec<i64> = genre_ids.iter().map(|g| g.value()).collect();

        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO title_genres (title_id, genre_id)
            SELECT $1, UNNEST($2::BIGINT[])
            "#,
        )
        .bind(id.value())
        .bind(&genre_ids)
        .execute(&mut *tx)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Term Repository Implementation
// ============================================================================

impl TermRepository for PgContentRepository {
    async fn create_term(&self, kind: Taxonomy, name: &Name, slug: &Slug) -> ContentResult<Term> {
        let sql = format!("INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING id", table(kind));
        let id = sqlx::query_scalar::<_, i64>(&sql)
            .bind(name.as_str())
            .bind(slug.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(Term {
            id: TermId::new(id),
            name: name.clone(),
            slug: slug.clone(),
        })
    }

    async fn find_term(&self, kind: Taxonomy, slug: &Slug) -> ContentResult<Option<Term>> {
        let sql = format!("SELECT id, name, slug FROM {} WHERE slug = $1", table(kind));
        let row = sqlx::query_as::<_, TermRow>(&sql)
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TermRow::into_term))
    }

    async fn delete_term(&self, kind: Taxonomy, slug: &Slug) -> ContentResult<bool> {
        let sql = format!("DELETE FROM {} WHERE slug = $1", table(kind));
        let deleted = sqlx::query(&sql)
            .bind(slug.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list_terms(
        &self,
        kind: Taxonomy,
        search: Option<&str>,
        page: &PageQuery,
    ) -> ContentResult<Page<Term>> {
        let filter = "WHERE $1::TEXT IS NULL OR strpos(lower(name), lower($1)) > 0";

        let count_sql = format!("SELECT COUNT(*) FROM {} {filter}", table(kind));
        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT id, name, slug FROM {} {filter} ORDER BY name, id LIMIT $2 OFFSET $3",
            table(kind)
        );
        let rows = sqlx::query_as::<_, TermRow>(&sql)
            .bind(search)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let terms = rows.into_iter().map(TermRow::into_term).collect();
        Ok(Page::new(terms, count as u64, page))
    }
}

// ============================================================================
// Title Repository Implementation
// ============================================================================

impl TitleRepository for PgContentRepository {
    async fn create_title(&self, record: &TitleRecord) -> ContentResult<TitleId> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(record.name.as_str())
        .bind(record.year.value())
        .bind(&record.description)
        .bind(record.category_id.map(|c| c.value()))
        .fetch_one(&mut *tx)
        .await?;

        let id = TitleId::new(id);
        Self::replace_genres(&mut tx, id, &record.genre_ids).await?;
        tx.commit().await?;

        Ok(id)
    }

    async fn find_title(&self, id: TitleId) -> ContentResult<Option<Title>> {
        let sql = format!("{TITLE_SELECT} WHERE t.id = $1");
        let Some(row) = sqlx::query_as::<_, TitleRow>(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn update_title(&self, id: TitleId, record: &TitleRecord) -> ContentResult<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE titles SET
                name = $2,
                year = $3,
                description = $4,
                category_id = $5
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(record.name.as_str())
        .bind(record.year.value())
        .bind(&record.description)
        .bind(record.category_id.map(|c| c.value()))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(false);
        }

        Self::replace_genres(&mut tx, id, &record.genre_ids).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn delete_title(&self, id: TitleId) -> ContentResult<bool> {
        let deleted = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: &PageQuery,
    ) -> ContentResult<Page<Title>> {
        let count_sql = format!(
            "SELECT COUNT(*) FROM titles t LEFT JOIN categories c ON c.id = t.category_id {TITLE_FILTER}"
        );
        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&filter.genre)
            .bind(&filter.category)
            .bind(filter.year)
            .bind(&filter.name)
            .bind(&filter.search)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!("{TITLE_SELECT} {TITLE_FILTER} ORDER BY t.name, t.id LIMIT $6 OFFSET $7");
        let rows = sqlx::query_as::<_, TitleRow>(&sql)
            .bind(&filter.genre)
            .bind(&filter.category)
            .bind(filter.year)
            .bind(&filter.name)
            .bind(&filter.search)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let titles = self.hydrate(rows).await?;
        Ok(Page::new(titles, count as u64, page))
    }
}

// ============================================================================
// Review Repository Implementation
// ============================================================================

impl ReviewRepository for PgContentRepository {
    async fn create_review(&self, review: &NewReview) -> ContentResult<Review> {
        let (id, pub_date) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"
            INSERT INTO reviews (title_id, author_id, text, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, pub_date
            "#,
        )
        .bind(review.title_id.value())
        .bind(review.author.user_id.as_uuid())
        .bind(review.text.as_str())
        .bind(i16::from(review.score.value()))
        .fetch_one(&self.pool)
        .await?;

        Ok(Review {
            id: ReviewId::new(id),
            title_id: review.title_id,
            author: review.author.clone(),
            text: review.text.clone(),
            score: review.score,
            pub_date,
        })
    }

    async fn find_review(&self, title_id: TitleId, id: ReviewId) -> ContentResult<Option<Review>> {
        let sql = format!("{REVIEW_SELECT} WHERE r.id = $1 AND r.title_id = $2");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.value())
            .bind(title_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ReviewRow::into_review))
    }

    async fn update_review(&self, review: &Review) -> ContentResult<()> {
        sqlx::query("UPDATE reviews SET text = $2, score = $3 WHERE id = $1")
            .bind(review.id.value())
            .bind(review.text.as_str())
            .bind(i16::from(review.score.value()))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_review(&self, id: ReviewId) -> ContentResult<bool> {
        let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn purge_author(&self, author: &UserId) -> ContentResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE author_id = $1")
            .bind(author.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM reviews WHERE author_id = $1")
            .bind(author.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn has_review(&self, title_id: TitleId, author: &UserId) -> ContentResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id.value())
        .bind(author.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_reviews(
        &self,
        title_id: TitleId,
        page: &PageQuery,
    ) -> ContentResult<Page<Review>> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id.value())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "{REVIEW_SELECT} WHERE r.title_id = $1 ORDER BY r.pub_date DESC, r.id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(title_id.value())
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let reviews = rows.into_iter().map(ReviewRow::into_review).collect();
        Ok(Page::new(reviews, count as u64, page))
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgContentRepository {
    async fn create_comment(&self, comment: &NewComment) -> ContentResult<Comment> {
        let (id, pub_date) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"
            INSERT INTO comments (review_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, pub_date
            "#,
        )
        .bind(comment.review_id.value())
        .bind(comment.author.user_id.as_uuid())
        .bind(comment.text.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Comment {
            id: CommentId::new(id),
            review_id: comment.review_id,
            author: comment.author.clone(),
            text: comment.text.clone(),
            pub_date,
        })
    }

    async fn find_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
    ) -> ContentResult<Option<Comment>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = $1 AND c.review_id = $2");
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id.value())
            .bind(review_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn update_comment(&self, comment: &Comment) -> ContentResult<()> {
        sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(comment.id.value())
            .bind(comment.text.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> ContentResult<bool> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list_comments(
        &self,
        review_id: ReviewId,
        page: &PageQuery,
    ) -> ContentResult<Page<Comment>> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE review_id = $1")
                .bind(review_id.value())
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            "{COMMENT_SELECT} WHERE c.review_id = $1 ORDER BY c.pub_date DESC, c.id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(review_id.value())
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let comments = rows.into_iter().map(CommentRow::into_comment).collect();
        Ok(Page::new(comments, count as u64, page))
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct TermRow {
    id: i64,
    name: String,
    slug: String,
}

impl TermRow {
    fn into_term(self) -> Term {
        Term {
            id: TermId::new(self.id),
            name: Name::from_db(self.name),
            slug: Slug::from_db(self.slug),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    description: Option<String>,
    category_id: Option<i64>,
    category_name: Option<String>,
    category_slug: Option<String>,
    rating: Option<i32>,
}

impl TitleRow {
    fn into_title(self, genres: Vec<Term>) -> Title {
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Term {
                id: TermId::new(id),
                name: Name::from_db(name),
                slug: Slug::from_db(slug),
            }),
            _ => None,
        };

        Title {
            id: TitleId::new(self.id),
            name: Name::from_db(self.name),
            year: Year::from_db(self.year),
            description: self.description,
            category,
            genres,
            rating: self.rating,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TitleGenreRow {
    title_id: i64,
    id: i64,
    name: String,
    slug: String,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    title_id: i64,
    author_id: Uuid,
    author_name: String,
    text: String,
    score: i16,
    pub_date: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            id: ReviewId::new(self.id),
            title_id: TitleId::new(self.title_id),
            author: Author {
                user_id: UserId::from_uuid(self.author_id),
                username: self.author_name,
            },
            text: Text::from_db(self.text),
            score: Score::from_db(self.score),
            pub_date: self.pub_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    review_id: i64,
    author_id: Uuid,
    author_name: String,
    text: String,
    pub_date: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            review_id: ReviewId::new(self.review_id),
            author: Author {
                user_id: UserId::from_uuid(self.author_id),
                username: self.author_name,
            },
            text: Text::from_db(self.text),
            pub_date: self.pub_date,
        }
    }
}
