//! # SkyTwin Web
//!
//! HTTP and WebSocket access to a running airspace simulation. This crate
//! renders nothing; it hands snapshots and events to whatever front end
//! draws them, and takes start/pause/reset commands back.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the server
//! cargo run -p skytwin-web -- --port 3000
//!
//! # Watch the fleet
//! curl http://localhost:3000/api/stats
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/snapshot` | Agents, events, tick and running flag |
//! | GET | `/api/agents` | All agents |
//! | GET | `/api/agents/:id` | One agent |
//! | GET | `/api/events` | Event log, newest first |
//! | GET | `/api/stats` | Aggregate counts |
//! | POST | `/api/start` | Resume ticking |
//! | POST | `/api/pause` | Halt ticking |
//! | POST | `/api/reset` | New run, optional config overrides |
//! | POST | `/api/step` | One tick while paused |
//! | WS | `/ws/events` | Live events and snapshots |

pub mod routes;
pub mod state;

pub use state::AppState;
