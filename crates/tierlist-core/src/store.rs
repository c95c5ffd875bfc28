//! The `CatalogStore` trait.
//!
//! Implemented by storage backends (e.g. `tierlist-store-sqlite`). The merge
//! engine, the scraper, and the command router depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{
  aggregate::{RankedSubject, TierboardQuery},
  review::{MemberId, NewReview, Polarity, Review, ReviewId, SubjectReviews, Vote},
  subject::{Degree, Semester, Shortcut, Subject, SubjectDetails, TagSet},
};

/// Abstraction over the durable subject/review/vote store.
///
/// The backend enforces the uniqueness invariants: one subject per shortcut,
/// one review per `(author, shortcut)`, one vote per `(review, voter)`.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Retrieve a registry entry. Returns `None` if the shortcut is unknown.
  fn get_subject<'a>(
    &'a self,
    shortcut: &'a Shortcut,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// Register a shortcut. Returns `false` if it already existed.
  fn add_subject<'a>(
    &'a self,
    shortcut: &'a Shortcut,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove a shortcut together with its details, reviews, and votes.
  /// Returns `false` if it did not exist.
  fn remove_subject<'a>(
    &'a self,
    shortcut: &'a Shortcut,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn get_subject_details<'a>(
    &'a self,
    shortcut: &'a Shortcut,
  ) -> impl Future<Output = Result<Option<SubjectDetails>, Self::Error>> + Send + 'a;

  /// Insert or fully replace the details row for `details.shortcut`.
  fn set_subject_details<'a>(
    &'a self,
    details: &'a SubjectDetails,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace the coupled type and year tag sets.
  fn update_subject_type<'a>(
    &'a self,
    shortcut: &'a Shortcut,
    kind: &'a TagSet<String>,
    year: &'a TagSet<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn update_subject_semester<'a>(
    &'a self,
    shortcut: &'a Shortcut,
    semester: &'a TagSet<Semester>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn update_subject_degree<'a>(
    &'a self,
    shortcut: &'a Shortcut,
    degree: &'a TagSet<Degree>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// All reviews of a subject in [`crate::aggregate::browse_order`].
  fn get_reviews_by_subject<'a>(
    &'a self,
    shortcut: &'a Shortcut,
  ) -> impl Future<Output = Result<SubjectReviews, Self::Error>> + Send + 'a;

  fn get_review(
    &self,
    id: ReviewId,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  fn get_review_by_author_subject<'a>(
    &'a self,
    author: MemberId,
    shortcut: &'a Shortcut,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + 'a;

  /// Persist a new review. `id` and `created_at` are set by the store.
  fn add_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Overwrite tier, anonymity, and text of an existing review and refresh
  /// its timestamp.
  fn update_review(
    &self,
    id: ReviewId,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Delete a review and its votes. Returns `false` if it did not exist.
  fn remove_review(
    &self,
    id: ReviewId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  fn get_vote_by_author(
    &self,
    review_id: ReviewId,
    voter: MemberId,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  /// Insert the vote, replacing any earlier vote by the same voter.
  fn add_vote(
    &self,
    vote: Vote,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns `false` if the voter had no vote on the review.
  fn remove_vote(
    &self,
    review_id: ReviewId,
    voter: MemberId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn vote_count(
    &self,
    review_id: ReviewId,
    polarity: Polarity,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// Subjects matching `query`, ranked by [`crate::aggregate::rank`].
  fn tierboard<'a>(
    &'a self,
    query: &'a TierboardQuery,
  ) -> impl Future<Output = Result<Vec<RankedSubject>, Self::Error>> + Send + 'a;
}
