//! Core of The Engine Room: the application pipeline store, its board
//! projection and mutations, and the AI advisory engine.
//!
//! Hosts (the terminal UI and the CLI) own presentation; everything here
//! returns data and [`notice::Notice`]s instead of printing.

pub mod advisory;
pub mod board;
pub mod config;
pub mod export;
pub mod notice;
pub mod presentation;
pub mod record;
pub mod settings;
pub mod storage;
pub mod submission;

pub use board::Board;
pub use config::EngineRoomConfig;
pub use notice::Notice;
pub use notice::NoticeLevel;
pub use record::ApplicationRecord;
pub use record::RecordId;
pub use record::Stage;
pub use record::Status;
pub use storage::FileKvStore;
pub use storage::RecordStore;
