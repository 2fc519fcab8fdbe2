//! Text protocol spoken over the websocket.
//!
//! Inbound messages are `COMMAND` or `COMMAND:{json}`. Outbound messages use
//! the same prefix convention: `EVENT:`, `STATE_UPDATE:`, `MOVE_RESULT:` and
//! `ERROR_UPDATE:`.

use serde::Deserialize;
use serde_json::json;
use std::sync::mpsc::Receiver;
use tangle_core::game::{PuzzleEvent, PuzzleSession};
use tangle_core::geometry::Point2;
use tangle_core::level::LevelDef;
use tangle_core::model::{PinId, SlotId};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PinAt {
    pub pin: PinId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SnapCmd {
    pub pin: PinId,
    pub slot: SlotId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `None` reloads the server's default level
    LoadLevel(Option<LevelDef>),
    BeginMove(PinAt),
    UpdateMove(Position),
    EndMove(Position),
    CancelMove,
    Snap(SnapCmd),
    State,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed {command} payload: {source}")]
    BadPayload {
        command: &'static str,
        source: serde_json::Error,
    },
}

fn payload<'a, T: Deserialize<'a>>(command: &'static str, json: &'a str) -> Result<T, ProtocolError> {
    serde_json::from_str(json).map_err(|source| ProtocolError::BadPayload { command, source })
}

pub fn parse_command(text: &str) -> Result<Command, ProtocolError> {
    let (name, body) = match text.split_once(':') {
        Some((name, body)) => (name, Some(body)),
        None => (text, None),
    };

    match (name, body) {
        ("LOAD_LEVEL", None) => Ok(Command::LoadLevel(None)),
        ("LOAD_LEVEL", Some(json)) => Ok(Command::LoadLevel(Some(payload("LOAD_LEVEL", json)?))),
        ("BEGIN_MOVE", Some(json)) => Ok(Command::BeginMove(payload("BEGIN_MOVE", json)?)),
        ("UPDATE_MOVE", Some(json)) => Ok(Command::UpdateMove(payload("UPDATE_MOVE", json)?)),
        ("END_MOVE", Some(json)) => Ok(Command::EndMove(payload("END_MOVE", json)?)),
        ("CANCEL_MOVE", None) => Ok(Command::CancelMove),
        ("SNAP", Some(json)) => Ok(Command::Snap(payload("SNAP", json)?)),
        ("STATE", None) => Ok(Command::State),
        _ => Err(ProtocolError::UnknownCommand(text.to_string())),
    }
}

/// Format an error as a JSON message for the frontend
pub fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!(
        "ERROR_UPDATE:{}",
        json!({
            "code": code,
            "message": message,
            "severity": severity
        })
    )
}

fn state_update(session: &PuzzleSession) -> String {
    let json = serde_json::to_string(&session.snapshot()).unwrap_or("{}".into());
    format!("STATE_UPDATE:{}", json)
}

/// Apply one inbound message and collect every outbound message it produced,
/// notifications first.
pub fn handle_message(
    session: &mut PuzzleSession,
    events: &Receiver<PuzzleEvent>,
    default_level: &LevelDef,
    text: &str,
) -> Vec<String> {
    let mut replies = Vec::new();

    let command = match parse_command(text) {
        Ok(command) => command,
        Err(e) => {
            warn!("{}", e);
            replies.push(format_error("BAD_COMMAND", &e.to_string(), "warning"));
            return replies;
        }
    };

    let mut send_state = false;
    let mut outcome = None;
    let mut error = None;

    match command {
        Command::LoadLevel(level) => {
            let level = level.as_ref().unwrap_or(default_level);
            match session.load_level(level) {
                Ok(()) => {
                    info!("Loaded level '{}'", level.name);
                    send_state = true;
                }
                Err(e) => error = Some(format_error("LEVEL_ERROR", &format!("Failed to load level: {}", e), "error")),
            }
        }
        Command::BeginMove(cmd) => {
            if !session.begin_move(cmd.pin, Point2::new(cmd.x, cmd.y)) {
                let message = format!("Cannot pick up {}", cmd.pin);
                error = Some(format_error("MOVE_REJECTED", &message, "warning"));
            }
        }
        Command::UpdateMove(pos) => session.update_move(pos.point()),
        Command::EndMove(pos) => {
            outcome = session.end_move(pos.point());
            send_state = outcome.is_some();
        }
        Command::CancelMove => {
            outcome = session.cancel_move();
            send_state = outcome.is_some();
        }
        Command::Snap(cmd) => {
            if session.snap(cmd.pin, cmd.slot) {
                send_state = true;
            } else {
                let message = format!("Cannot snap {} into {}", cmd.pin, cmd.slot);
                error = Some(format_error("SNAP_REJECTED", &message, "warning"));
            }
        }
        Command::State => send_state = true,
    }

    for event in events.try_iter() {
        let json = serde_json::to_string(&event).unwrap_or("{}".into());
        replies.push(format!("EVENT:{}", json));
    }
    if let Some(outcome) = outcome {
        let json = serde_json::to_string(&outcome).unwrap_or("{}".into());
        replies.push(format!("MOVE_RESULT:{}", json));
    }
    if let Some(error) = error {
        replies.push(error);
    }
    if send_state {
        replies.push(state_update(session));
    }

    replies
}
