//! Simulated Platform
//!
//! This crate provides an in-memory implementation of every `mux-hal`
//! capability for exercising multiplexer drivers without physical
//! hardware:
//!
//! - **SimBoard**: records every hardware interaction in an ordered event
//!   log, holds pin levels and directions, serves scripted analog values,
//!   NAKs scripted bus addresses, and runs a manually advanced clock
//!
//! Tests assert on the event log: switching-order properties like
//! break-before-make are verified by scanning the recorded sequence.
//!
//! # Example
//!
//! ```rust
//! use mux_hal::{DigitalIo, Direction, Level, PinId};
//! use mux_sim::{SimBoard, SimEvent};
//!
//! let mut board = SimBoard::new();
//! board.configure(PinId(2), Direction::Output);
//! board.write(PinId(2), Level::High);
//!
//! assert_eq!(board.pin_level(PinId(2)), Some(Level::High));
//! assert_eq!(board.events().len(), 2);
//! ```

pub mod board;
pub mod event;

pub use board::SimBoard;
pub use event::SimEvent;
