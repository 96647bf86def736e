//! Assembly guidance: the component placement list, the highlight set read
//! by the overlay renderer, and the timed pin sequencer that walks the
//! placements.

mod highlight;
mod placement;
mod sequencer;

pub use highlight::{Color, Highlight, HighlightSet, DEFAULT_HIGHLIGHT_COLOR};
pub use placement::{
    load_placements, scan_duplicate_pins, ComponentPlacement, DuplicatePin, PlacementError,
};
pub use sequencer::{
    PinSequencer, SequencerMode, TickEvent, DEFAULT_ADVANCE_DELAY_MS,
};
