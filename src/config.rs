use std::env;
use std::path::PathBuf;

pub struct Config {
    pub port: u16,
    pub words_dir: PathBuf,
    pub default_language: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            words_dir: env::var("WORDS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            default_language: env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
