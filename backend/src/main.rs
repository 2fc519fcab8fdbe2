use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tangle_core::config::PuzzleConfig;
use tangle_core::game::PuzzleSession;
use tangle_core::level::LevelDef;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

mod protocol;

use protocol::{format_error, handle_message};

// Application State
struct AppState {
    config: PuzzleConfig,
    level: LevelDef,
}

fn load_config() -> PuzzleConfig {
    let Ok(path) = std::env::var("TANGLE_CONFIG") else {
        return PuzzleConfig::default();
    };

    match std::fs::read_to_string(&path).map_err(|e| e.to_string()).and_then(|text| {
        PuzzleConfig::from_json(&text).map_err(|e| e.to_string())
    }) {
        Ok(config) => {
            info!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            warn!("Ignoring config {}: {}", path, e);
            PuzzleConfig::default()
        }
    }
}

fn load_level() -> LevelDef {
    let Ok(path) = std::env::var("TANGLE_LEVEL") else {
        return LevelDef::crossing_demo();
    };

    match std::fs::read_to_string(&path).map_err(|e| e.to_string()).and_then(|text| {
        LevelDef::from_json(&text).map_err(|e| e.to_string())
    }) {
        Ok(level) => {
            info!("Loaded level '{}' from {}", level.name, path);
            level
        }
        Err(e) => {
            warn!("Ignoring level {}: {}", path, e);
            LevelDef::crossing_demo()
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let shared_state = Arc::new(AppState {
        config: load_config(),
        level: load_level(),
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}

async fn root() -> &'static str {
    "Tangle puzzle server"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    info!("Client connected: {}", session_id);

    let (mut sender, mut receiver) = socket.split();

    // One puzzle per connection, starting on the server's level
    let mut session = PuzzleSession::new(state.config.clone());
    let events = session.subscribe();

    let initial = handle_message(&mut session, &events, &state.level, "LOAD_LEVEL");
    for reply in initial {
        if sender.send(Message::Text(reply)).await.is_err() {
            return;
        }
    }

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Socket error on {}: {}", session_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("{} received: {}", session_id, text);
                let replies = handle_message(&mut session, &events, &state.level, &text);
                for reply in replies {
                    if sender.send(Message::Text(reply)).await.is_err() {
                        return;
                    }
                }
            }
            Message::Close(_) => break,
            Message::Binary(_) => {
                let reply = format_error("UNSUPPORTED", "Binary messages are not supported", "warning");
                if sender.send(Message::Text(reply)).await.is_err() {
                    return;
                }
            }
            _ => {}
        }
    }

    info!("Client disconnected: {}", session_id);
}
