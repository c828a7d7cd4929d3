//! SQL schema for the hiring SQLite store.
//!
//! Executed once at connection startup. There is no migration step; the
//! `user_version` pragma only records which layout created the file.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    id    INTEGER PRIMARY KEY,   -- assigned by SQLite when inserted as NULL
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS jobs (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hiredemployees (
    id             INTEGER PRIMARY KEY,
    name           TEXT NOT NULL,
    datetime       TEXT NOT NULL,   -- 'YYYY-MM-DD HH:MM:SS', no timezone
    department_id  INTEGER NOT NULL REFERENCES departments(id),
    job_id         INTEGER NOT NULL REFERENCES jobs(id)
);

CREATE INDEX IF NOT EXISTS hiredemployees_datetime_idx   ON hiredemployees(datetime);
CREATE INDEX IF NOT EXISTS hiredemployees_department_idx ON hiredemployees(department_id);

PRAGMA user_version = 1;
";
