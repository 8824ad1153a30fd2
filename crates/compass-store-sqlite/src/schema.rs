//! SQL schema for the Compass SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per identity. The id is the authentication provider's user id.
CREATE TABLE IF NOT EXISTS profiles (
    student_id    TEXT PRIMARY KEY,
    full_name     TEXT NOT NULL,
    location      TEXT NOT NULL DEFAULT '',
    municipality  TEXT,
    grade         INTEGER,
    school        TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Strictly append-only: no UPDATE or DELETE is ever issued here.
CREATE TABLE IF NOT EXISTS performance_records (
    record_id    TEXT PRIMARY KEY,
    student_id   TEXT NOT NULL REFERENCES profiles(student_id),
    subject      TEXT NOT NULL,
    score        REAL NOT NULL,
    attendance   REAL,
    notes        TEXT,
    recorded_at  TEXT NOT NULL     -- RFC 3339 UTC, fixed width; server-assigned
);

CREATE TABLE IF NOT EXISTS mentors (
    mentor_id     TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    expertise     TEXT NOT NULL,
    location      TEXT NOT NULL DEFAULT '',
    municipality  TEXT,
    contact       TEXT NOT NULL DEFAULT '',
    available     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS support_resources (
    resource_id   TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    category      TEXT NOT NULL,
    description   TEXT,
    location      TEXT NOT NULL DEFAULT '',
    municipality  TEXT,
    contact       TEXT NOT NULL DEFAULT '',
    available     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

-- Append-only conversation log.
CREATE TABLE IF NOT EXISTS chat_messages (
    message_id   TEXT PRIMARY KEY,
    student_id   TEXT REFERENCES profiles(student_id),
    role         TEXT NOT NULL,    -- 'user' | 'assistant'
    content      TEXT NOT NULL,
    metadata     TEXT,             -- JSON or NULL
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS performance_student_idx ON performance_records(student_id, recorded_at);
CREATE INDEX IF NOT EXISTS mentors_municipality_idx ON mentors(municipality COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS resources_municipality_idx ON support_resources(municipality COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS chat_student_idx ON chat_messages(student_id, created_at);

PRAGMA user_version = 1;
";
