//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the hardware boundary of FoxOS.
//!
//! The kernel core never talks to hardware directly. It sees two traits:
//!
//! - [`BlockDevice`]: sector-addressed storage behind the persistence service
//! - [`ConsoleSink`]: the character console the shell prints to
//!
//! Real drivers (AHCI, VGA text mode) implement these on the target; the
//! in-memory [`RamDisk`] and [`BufferConsole`] stand in for them on the host
//! and in tests.

pub mod block_device;
pub mod console;

pub use block_device::{BlockDevice, BlockError, RamDisk, SECTOR_SIZE};
pub use console::{BufferConsole, ConsoleSink, ConsoleWriter};
