//! SQL schema for the tier-list SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    shortcut    TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL
);

-- Tag columns hold comma-separated sets, e.g. 'Z, L' or '2BIT, 3BIT'.
CREATE TABLE IF NOT EXISTS subject_details (
    shortcut  TEXT PRIMARY KEY REFERENCES subjects(shortcut) ON DELETE CASCADE,
    name      TEXT NOT NULL,
    credits   INTEGER NOT NULL,
    semester  TEXT NOT NULL,
    end_type  TEXT NOT NULL,
    card      TEXT NOT NULL,
    type      TEXT NOT NULL,
    year      TEXT NOT NULL DEFAULT '',
    degree    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reviews (
    review_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id   TEXT NOT NULL,
    shortcut    TEXT NOT NULL REFERENCES subjects(shortcut) ON DELETE CASCADE,
    tier        INTEGER NOT NULL CHECK (tier BETWEEN 0 AND 4),
    anonymous   INTEGER NOT NULL DEFAULT 0,
    text_review TEXT,
    created_at  TEXT NOT NULL,
    UNIQUE (member_id, shortcut)
);

-- vote = 1 for a like, 0 for a dislike.
CREATE TABLE IF NOT EXISTS votes (
    review_id  INTEGER NOT NULL REFERENCES reviews(review_id) ON DELETE CASCADE,
    member_id  TEXT NOT NULL,
    vote       INTEGER NOT NULL,
    PRIMARY KEY (review_id, member_id)
);

CREATE INDEX IF NOT EXISTS reviews_shortcut_idx ON reviews(shortcut);

PRAGMA user_version = 1;
";
