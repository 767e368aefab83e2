//! Session state: the single-writer cell, the keyed in-flight request map and
//! the resolver that drives `GET /api/auth/me`.

mod inflight;
mod resolver;
mod store;

pub use inflight::{InflightMap, Ticket};
pub use resolver::{SessionResolver, SESSION_QUERY_KEY};
pub use store::{session_cell, SessionHandle, SessionWriter};
