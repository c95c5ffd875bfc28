//! [`SqliteStore`], the SQLite implementation of [`CatalogStore`].

use std::{collections::BTreeMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use tierlist_core::{
  aggregate::{self, RankedSubject, TierboardQuery},
  review::{MemberId, NewReview, Polarity, Review, ReviewId, SubjectReviews, Tier, Vote},
  store::CatalogStore,
  subject::{Degree, Semester, Shortcut, Subject, SubjectDetails, TagSet},
};

use crate::{
  encode::{
    encode_dt, encode_member, DETAILS_COLUMNS, REVIEW_COLUMNS, RawDetails, RawReview,
    RawSubject,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tier-list store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-column `UPDATE` on `subject_details`.
  async fn update_details_column(
    &self,
    shortcut: &Shortcut,
    column: &'static str,
    value: String,
  ) -> Result<()> {
    let key = shortcut.as_str().to_owned();
    let changed = self
      .conn
      .call(move |conn| {
        let sql = format!("UPDATE subject_details SET {column} = ?1 WHERE shortcut = ?2");
        Ok(conn.execute(&sql, rusqlite::params![value, key])?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::SubjectNotFound(shortcut.to_string()));
    }
    Ok(())
  }

  async fn review_where(
    &self,
    condition: &'static str,
    params: Vec<String>,
  ) -> Result<Option<Review>> {
    let raw: Option<RawReview> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE {condition}");
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(params), RawReview::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReview::into_review).transpose()
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn get_subject(&self, shortcut: &Shortcut) -> Result<Option<Subject>> {
    let key = shortcut.as_str().to_owned();

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT shortcut, created_at FROM subjects WHERE shortcut = ?1",
            rusqlite::params![key],
            |row| {
              Ok(RawSubject {
                shortcut:   row.get(0)?,
                created_at: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn add_subject(&self, shortcut: &Shortcut) -> Result<bool> {
    let key = shortcut.as_str().to_owned();
    let at_str = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO subjects (shortcut, created_at) VALUES (?1, ?2)
           ON CONFLICT (shortcut) DO NOTHING",
          rusqlite::params![key, at_str],
        )?)
      })
      .await?;

    Ok(inserted > 0)
  }

  async fn remove_subject(&self, shortcut: &Shortcut) -> Result<bool> {
    let key = shortcut.as_str().to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM subjects WHERE shortcut = ?1", rusqlite::params![key])?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn get_subject_details(&self, shortcut: &Shortcut) -> Result<Option<SubjectDetails>> {
    let key = shortcut.as_str().to_owned();

    let raw: Option<RawDetails> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {DETAILS_COLUMNS} FROM subject_details WHERE shortcut = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], RawDetails::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDetails::into_details).transpose()
  }

  async fn set_subject_details(&self, details: &SubjectDetails) -> Result<()> {
    let key      = details.shortcut.as_str().to_owned();
    let name     = details.name.clone();
    let credits  = details.credits;
    let semester = details.semester.to_string();
    let end      = details.end.clone();
    let card     = details.link.clone();
    let kind     = details.kind.to_string();
    let year     = details.year.to_string();
    let degree   = details.degree.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subject_details (
             shortcut, name, credits, semester, end_type, card, type, year, degree
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
           ON CONFLICT (shortcut) DO UPDATE SET
             name = excluded.name,
             credits = excluded.credits,
             semester = excluded.semester,
             end_type = excluded.end_type,
             card = excluded.card,
             type = excluded.type,
             year = excluded.year,
             degree = excluded.degree",
          rusqlite::params![key, name, credits, semester, end, card, kind, year, degree],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_subject_type(
    &self,
    shortcut: &Shortcut,
    kind: &TagSet<String>,
    year: &TagSet<String>,
  ) -> Result<()> {
    let key = shortcut.as_str().to_owned();
    let kind_str = kind.to_string();
    let year_str = year.to_string();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subject_details SET type = ?1, year = ?2 WHERE shortcut = ?3",
          rusqlite::params![kind_str, year_str, key],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::SubjectNotFound(shortcut.to_string()));
    }
    Ok(())
  }

  async fn update_subject_semester(
    &self,
    shortcut: &Shortcut,
    semester: &TagSet<Semester>,
  ) -> Result<()> {
    self
      .update_details_column(shortcut, "semester", semester.to_string())
      .await
  }

  async fn update_subject_degree(
    &self,
    shortcut: &Shortcut,
    degree: &TagSet<Degree>,
  ) -> Result<()> {
    self
      .update_details_column(shortcut, "degree", degree.to_string())
      .await
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn get_reviews_by_subject(&self, shortcut: &Shortcut) -> Result<SubjectReviews> {
    let key = shortcut.as_str().to_owned();

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE shortcut = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![key], RawReview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut reviews: Vec<Review> = raws
      .into_iter()
      .map(RawReview::into_review)
      .collect::<Result<_>>()?;
    reviews.sort_by(aggregate::browse_order);

    let average = aggregate::mean_tier(reviews.iter().map(|r| r.tier));
    Ok(SubjectReviews { reviews, average })
  }

  async fn get_review(&self, id: ReviewId) -> Result<Option<Review>> {
    self
      .review_where("review_id = ?1", vec![id.0.to_string()])
      .await
  }

  async fn get_review_by_author_subject(
    &self,
    author: MemberId,
    shortcut: &Shortcut,
  ) -> Result<Option<Review>> {
    self
      .review_where("member_id = ?1 AND shortcut = ?2", vec![
        encode_member(author),
        shortcut.as_str().to_owned(),
      ])
      .await
  }

  async fn add_review(&self, input: NewReview) -> Result<Review> {
    let created_at = Utc::now();
    let member_str = encode_member(input.author);
    let key        = input.shortcut.as_str().to_owned();
    let tier       = i64::from(input.tier);
    let anonymous  = input.anonymous;
    let text       = input.text.clone();
    let at_str     = encode_dt(created_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviews (member_id, shortcut, tier, anonymous, text_review, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![member_str, key, tier, anonymous, text, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Review {
      id: ReviewId(id),
      author: input.author,
      shortcut: input.shortcut,
      tier: input.tier,
      anonymous: input.anonymous,
      text: input.text,
      created_at,
    })
  }

  async fn update_review(&self, id: ReviewId, input: NewReview) -> Result<Review> {
    let created_at = Utc::now();
    let tier       = i64::from(input.tier);
    let anonymous  = input.anonymous;
    let text       = input.text.clone();
    let at_str     = encode_dt(created_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE reviews SET tier = ?1, anonymous = ?2, text_review = ?3, created_at = ?4
           WHERE review_id = ?5",
          rusqlite::params![tier, anonymous, text, at_str, id.0],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::ReviewNotFound(id.0));
    }

    Ok(Review {
      id,
      author: input.author,
      shortcut: input.shortcut,
      tier: input.tier,
      anonymous: input.anonymous,
      text: input.text,
      created_at,
    })
  }

  async fn remove_review(&self, id: ReviewId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM reviews WHERE review_id = ?1", rusqlite::params![id.0])?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn get_vote_by_author(&self, review_id: ReviewId, voter: MemberId) -> Result<Option<Vote>> {
    let member_str = encode_member(voter);

    let value: Option<bool> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT vote FROM votes WHERE review_id = ?1 AND member_id = ?2",
            rusqlite::params![review_id.0, member_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(value.map(|up| Vote { review_id, voter, value: Polarity::from(up) }))
  }

  async fn add_vote(&self, vote: Vote) -> Result<()> {
    let member_str = encode_member(vote.voter);
    let up = vote.value.is_up();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO votes (review_id, member_id, vote) VALUES (?1, ?2, ?3)
           ON CONFLICT (review_id, member_id) DO UPDATE SET vote = excluded.vote",
          rusqlite::params![vote.review_id.0, member_str, up],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_vote(&self, review_id: ReviewId, voter: MemberId) -> Result<bool> {
    let member_str = encode_member(voter);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM votes WHERE review_id = ?1 AND member_id = ?2",
          rusqlite::params![review_id.0, member_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn vote_count(&self, review_id: ReviewId, polarity: Polarity) -> Result<u64> {
    let up = polarity.is_up();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM votes WHERE review_id = ?1 AND vote = ?2",
          rusqlite::params![review_id.0, up],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(u64::try_from(count).unwrap_or_default())
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn tierboard(&self, query: &TierboardQuery) -> Result<Vec<RankedSubject>> {
    // Tag columns are comma-joined, so filtering happens on decoded rows.
    let rows: Vec<(RawDetails, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.shortcut, d.name, d.credits, d.semester, d.end_type, d.card,
                  d.type, d.year, d.degree, r.tier
           FROM subject_details d
           JOIN reviews r ON r.shortcut = d.shortcut",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((RawDetails::from_row(row)?, row.get(9)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut grouped: BTreeMap<Shortcut, Vec<Tier>> = BTreeMap::new();
    for (raw, tier) in rows {
      let details = raw.into_details()?;
      if !query.matches(&details) {
        continue;
      }
      grouped.entry(details.shortcut).or_default().push(Tier::new(tier)?);
    }

    Ok(aggregate::rank(grouped))
  }
}
