//! Application command handlers for solatran.
//!
//! # Commands
//! - `serve`: OAuth login server with the transfer dispatcher
//! - `keygen`: Generate the payer keypair
//! - `balance`: Show the ledger balance of the payer or any address
//! - `subtitle`: Transcribe an audio/video file into SRT subtitles
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod balance;
pub mod config;
pub mod keygen;
pub mod logs;
pub mod serve;
pub mod subtitle;

pub use balance::handle_balance;
pub use config::handle_config;
pub use keygen::handle_keygen;
pub use logs::handle_logs;
pub use serve::handle_serve;
pub use subtitle::handle_subtitle;
