use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use guessmate::messages::{ClientMessage, RoomStateView, ServerMessage};
use guessmate::words::{LanguageInfo, WordProvider};
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestServer {
    base_url: String,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.base_url)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!(
            "http://{}{}",
            self.base_url.strip_prefix("ws://").unwrap(),
            path
        )
    }
}

/// Word provider with a fixed secret, so tests know the answer in advance.
pub struct ScriptedWords;

impl WordProvider for ScriptedWords {
    fn random_word(&self, language: &str) -> Option<String> {
        (language == "en").then(|| "HELLO".to_string())
    }

    fn is_valid_word(&self, word: &str, language: &str) -> bool {
        language == "en"
            && ["HELLO", "WORLD", "BRAIN", "CRANE", "SLATE", "TRAIN"].contains(&word)
    }

    fn is_supported(&self, language: &str) -> bool {
        language == "en"
    }

    fn available_languages(&self) -> Vec<LanguageInfo> {
        vec![LanguageInfo {
            code: "en".to_string(),
            name: "English".to_string(),
            word_count: 6,
        }]
    }
}

pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with(guessmate::RoomConfig::default()).await
}

pub async fn spawn_test_server_with(config: guessmate::RoomConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let app = guessmate::app_with_config(Arc::new(ScriptedWords), config);
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("ws://{}", addr),
    }
}

pub async fn connect(server: &TestServer) -> WsStream {
    let (ws, _) = connect_async(&server.ws_url())
        .await
        .expect("Failed to connect");
    ws
}

/// Create a room over HTTP and return its code.
pub async fn create_room(server: &TestServer, player_name: &str) -> String {
    let response: serde_json::Value = reqwest::Client::new()
        .post(server.http_url("/create-room"))
        .json(&serde_json::json!({ "player_name": player_name }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    response["room_code"].as_str().unwrap().to_string()
}

pub fn join_msg(room_code: &str, player_name: &str) -> Message {
    join_msg_with_identity(room_code, player_name, None)
}

pub fn join_msg_with_identity(
    room_code: &str,
    player_name: &str,
    persistent_id: Option<&str>,
) -> Message {
    let json = serde_json::to_string(&ClientMessage::JoinRoom {
        room_code: room_code.to_string(),
        player_name: player_name.to_string(),
        persistent_id: persistent_id.map(str::to_string),
    })
    .unwrap();
    Message::Text(json.into())
}

pub fn guess_msg(guess: &str) -> Message {
    let json = serde_json::to_string(&ClientMessage::Guess {
        guess: guess.to_string(),
    })
    .unwrap();
    Message::Text(json.into())
}

pub fn ready_msg(ready: bool) -> Message {
    let json = serde_json::to_string(&ClientMessage::Ready { ready }).unwrap();
    Message::Text(json.into())
}

pub fn start_round_msg() -> Message {
    let json = serde_json::to_string(&ClientMessage::StartRound).unwrap();
    Message::Text(json.into())
}

pub async fn recv(ws: &mut WsStream) -> ServerMessage {
    let msg = ws.next().await.unwrap().unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

/// Join a room and return the server-assigned persistent id, leaving the
/// stream positioned after the initial joined_room message.
pub async fn join_room(ws: &mut WsStream, room_code: &str, player_name: &str) -> String {
    ws.send(join_msg(room_code, player_name)).await.unwrap();
    match recv(ws).await {
        ServerMessage::JoinedRoom { persistent_id } => persistent_id,
        other => panic!("expected joined_room, got {:?}", other),
    }
}

/// Skip forward to the next room_state broadcast.
pub async fn next_state(ws: &mut WsStream) -> RoomStateView {
    loop {
        if let ServerMessage::RoomState { state } = recv(ws).await {
            return state;
        }
    }
}

/// Skip forward to the next player_guesses message.
pub async fn next_guesses(ws: &mut WsStream) -> (Vec<String>, u32) {
    loop {
        if let ServerMessage::PlayerGuesses {
            guesses,
            round_number,
        } = recv(ws).await
        {
            return (guesses, round_number);
        }
    }
}
