//! Master side of the I/O gateway bus protocol.

pub mod chunk;
pub mod codec;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod gps;
pub mod protocol;
pub mod telemetry;
pub mod transport;

pub use self::config::{Config, Timing};
pub use self::gateway::Controller;
pub use self::gps::{GpsRecord, GpsValidity};
pub use self::protocol::{Command, Opcode, PinMode, UsablePin};
pub use self::telemetry::Telemetry;
pub use self::transport::Transport;
