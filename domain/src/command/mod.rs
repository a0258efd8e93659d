//! FLARE command parsing and representation
//!
//! `text -> Command`:
//! raw command text -> [`grammar::parse`] -> validated [`entities::Command`]

pub mod entities;
pub mod grammar;
pub mod operation;

pub use entities::Command;
pub use grammar::{CommandError, ParseError, ValidationError, parse};
pub use operation::OperationKind;
