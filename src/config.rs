// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Fraction of correct answers a subject needs to count as passed.
pub const PASS_RATIO: f64 = 0.5;

/// Subject scores are reported on a 0..=10 scale.
pub const SCORE_SCALE: f64 = 10.0;

/// Minutes used for self-select quizzes and legacy retries when nothing else is known.
pub const DEFAULT_QUIZ_MINUTES: u32 = 45;

/// Question count used for self-select quizzes when the caller gives none.
pub const DEFAULT_QUIZ_QUESTION_COUNT: u32 = 45;

/// Fixed primary key of the attributes singleton.
pub const ATTRIBUTES_KEY: &str = "global";

pub const DEFAULT_EXAM_TYPES: [&str; 3] = ["Entrance exam", "Final exam", "Exit exam"];

pub const DEFAULT_LEVELS: [&str; 4] = ["Undergraduate", "Postgraduate", "Specialist I", "Specialist II"];

pub const DEFAULT_SUBJECT_TYPES: [&str; 5] = [
    "Foundation",
    "Specialty",
    "Political & military",
    "Foreign language",
    "Other",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: String,
    pub rust_log: String,
    pub log_dir: String,
    /// Countdown period of the exam timer, in milliseconds.
    pub tick_interval_ms: u64,
    pub allowed_origins: Vec<String>,
    /// Directory holding the built browser UI, served at `/` when set.
    pub static_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quiz-vault.db".to_string());

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let tick_interval_ms = env::var("TICK_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let static_dir = env::var("STATIC_DIR").ok().filter(|s| !s.is_empty());

        Self {
            database_url,
            db_max_connections,
            bind_addr,
            rust_log,
            log_dir,
            tick_interval_ms,
            allowed_origins,
            static_dir,
        }
    }

    /// Configuration for tests and embedding: private in-memory database, fast ticks.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            bind_addr: "127.0.0.1:0".to_string(),
            rust_log: "error".to_string(),
            log_dir: "logs".to_string(),
            tick_interval_ms: 1000,
            allowed_origins: Vec::new(),
            static_dir: None,
        }
    }
}
