//! Session relay: call lifecycle and debounced code broadcasting

pub mod config;
pub mod session;
pub mod session_relay;
pub mod timer;


pub use config::RelayConfig;
pub use session::{Session, SessionState};
pub use session_relay::{RelayCommand, RelayEvent, RelayHandle, SessionRelay, SessionRelayBuilder};
pub use timer::Debouncer;
