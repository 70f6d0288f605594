pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY,
  email TEXT NOT NULL UNIQUE,
  is_active INTEGER NOT NULL DEFAULT 1,
  is_staff INTEGER NOT NULL DEFAULT 0,
  is_superuser INTEGER NOT NULL DEFAULT 0,
  last_login TEXT
);

CREATE TABLE IF NOT EXISTS submissions (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  job_id INTEGER NOT NULL,
  user_id INTEGER NOT NULL REFERENCES users(id),
  model_type TEXT NOT NULL,
  status TEXT NOT NULL,
  fingerprint TEXT,
  timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS models (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE,
  owner_id INTEGER NOT NULL REFERENCES users(id),
  submission_id INTEGER NOT NULL REFERENCES submissions(id),
  public INTEGER NOT NULL,
  competition TEXT
);

CREATE TABLE IF NOT EXISTS benchmarks (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  identifier TEXT NOT NULL UNIQUE,
  ceiling REAL
);

CREATE TABLE IF NOT EXISTS scores (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  model_id INTEGER NOT NULL REFERENCES models(id),
  benchmark_id INTEGER NOT NULL REFERENCES benchmarks(id),
  score_raw REAL,
  score_ceiled REAL,
  error REAL,
  comment TEXT,
  start_timestamp TEXT NOT NULL,
  end_timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_scores_model ON scores(model_id);
"#;

/// Tables in an order that is safe for row deletion (children first).
pub const TABLES_CHILD_FIRST: [&str; 5] = ["scores", "benchmarks", "models", "submissions", "users"];
