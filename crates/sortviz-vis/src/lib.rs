//! Sortviz Visualization
//!
//! Live front ends for the sorting engine.
//!
//! # Architecture
//!
//! - **Server**: Owns the playback controller and runs it on command
//! - **WebSocket**: Streams frames, tones and alerts to browser clients
//! - **REST API**: Start/stop/reset runs, edit config, scrub a recorded timeline
//! - **Terminal**: Draws frames as a line of block characters
//!
//! # Usage
//!
//! ```ignore
//! let store = JsonFileStore::open("sortviz.json")?;
//! let server = VisServer::new(Box::new(store), None);
//! server.serve(3000).await?;
//! ```

mod events;
mod server;
mod term;

pub use events::{BroadcastSink, Update};
pub use server::{Ack, AppState, VisServer};
pub use term::{sparkline, TermSink};
