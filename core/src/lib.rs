pub mod config;
pub mod game;
pub mod geometry;
pub mod level;
pub mod logic;
pub mod model;
pub mod rendering;

pub fn version() -> &'static str {
    "0.1.0"
}
