#![no_std]

mod bitrate;
mod codec;
mod command;
mod config;
mod engine;
mod error;
mod event;
mod frame;
mod interface;
mod line;
mod relay;
mod state;

#[cfg(test)]
mod mock;

// Longest line either direction:
// T 1FFFFFFF 8 1122334455667788 FFFF \r

const MAX_ID_SIZE: usize = 8;

pub const MAX_DATA_LENGTH: usize = 8;
const MAX_ENCODED_DATA_LENGTH: usize = MAX_DATA_LENGTH * 2;

/// Letter + id + DLC + data, without timestamp or terminator
pub const MAX_FRAME_LINE_SIZE: usize = 1 + MAX_ID_SIZE + 1 + MAX_ENCODED_DATA_LENGTH;

/// Longest `V`/`N` reply text
pub const MAX_INFO_LENGTH: usize = 16;

/// Longest reply written to the host, terminator included
pub const MAX_EVENT_SIZE: usize = MAX_FRAME_LINE_SIZE + 4 + 1;

/// Capacity of the command line buffer, counting the CR
pub const MAX_LINE_LENGTH: usize = 64;
pub const MAX_LINE_DATA_LENGTH: usize = MAX_LINE_LENGTH - 1;

pub use bitrate::*;
pub use command::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use frame::*;
pub use interface::*;
pub use line::*;
pub use relay::*;
pub use state::*;

pub use embedded_can::{ExtendedId, Id, StandardId};
