//! BAXATHON client
//!
//! 3つのページ（Whiskey Goggles / BOB / Honey Barrel）の非同期処理を
//! `baxathon_common` の状態機械とHTTPクライアントで駆動する。

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod media;
pub mod preview;
pub mod repl;
pub mod upload;
