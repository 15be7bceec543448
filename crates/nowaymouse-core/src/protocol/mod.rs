//! Protocol module containing the overlay renderer's line format.

pub mod overlay;

pub use overlay::{OverlayCommand, ProtocolError, ShowCommand};
