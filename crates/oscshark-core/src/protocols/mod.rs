//! Protocol decoding modules.
//!
//! Each layer follows the same structure:
//! - `layout`: byte offsets, codes and constants (source of truth)
//! - `parser`: decoding of one header strip into a borrowed record
//! - `error`: explicit, actionable structural errors
//!
//! Every parser returns `Ok(None)` when the bytes belong to a protocol it does
//! not handle, and `Err` when the bytes claim to be its protocol but are
//! structurally broken. Parsers are pure and contain no I/O.

pub mod ethernet;
pub mod ipv4;
pub mod osc;
pub mod udp;
