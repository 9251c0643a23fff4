mod config;

use std::sync::Arc;

use config::Config;
use guessmate::words::DictionaryManager;
use guessmate::RoomConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let addr = config.addr();

    let words = match DictionaryManager::load(&config.words_dir) {
        Ok(dictionary) => dictionary,
        Err(err) => {
            tracing::warn!(
                dir = %config.words_dir.display(),
                %err,
                "Failed to load word lists, starting with an empty dictionary"
            );
            DictionaryManager::from_lists(Vec::<(&str, Vec<&str>)>::new())
        }
    };

    let room_config = RoomConfig {
        default_language: config.default_language.clone(),
        ..RoomConfig::default()
    };
    let app = guessmate::app_with_config(Arc::new(words), room_config);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
