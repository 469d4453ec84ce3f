use std::env;

const DEV_CONSOLE_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub dev_mode: bool,
    /// Origins allowed to call the API from a browser (the dashboard SPA).
    pub console_origins: Vec<String>,
    pub bootstrap_admin_email: Option<String>,
    /// Require project ownership (or admin) for the manager branch of task updates.
    pub strict_task_updates: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("TASKBOARD_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let console_origins = match env::var("TASKBOARD_CONSOLE_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) if dev_mode => DEV_CONSOLE_ORIGINS.iter().map(|s| s.to_string()).collect(),
            Err(_) => Vec::new(),
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "taskboard.db".to_string()),
            dev_mode,
            console_origins,
            bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL")
                .ok()
                .filter(|e| !e.trim().is_empty()),
            strict_task_updates: env::var("TASKBOARD_STRICT_TASK_UPDATES")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
