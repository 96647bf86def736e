//! Timed state machine that walks component pins and drives the highlight
//! set.
//!
//! Time is injected by the caller (`now_ms`), never read here, so the whole
//! machine is deterministic under test.

use boardsight_grid::IntersectionGrid;
use log::{debug, info, warn};

use crate::highlight::HighlightSet;
use crate::placement::ComponentPlacement;

pub const DEFAULT_ADVANCE_DELAY_MS: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SequencerMode {
    #[default]
    Inactive,
    Running,
    Paused,
}

/// What a fired tick did; the UI layer renders the label from this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickEvent {
    /// The sequencer wrapped to this component at the start of the tick.
    pub advanced_component: bool,
    pub reference: String,
    /// 1-based pin number within the component.
    pub pin_number: usize,
    pub row: usize,
    pub col: usize,
    /// False when the pin fell outside the current grid and only the
    /// advance happened.
    pub highlighted: bool,
    /// The pin's row sits in the power/ground rail band. Informational.
    pub on_power_rail: bool,
}

impl TickEvent {
    /// Display label, e.g. `R1 pin 2 at (4, 1)`.
    pub fn label(&self) -> String {
        format!(
            "{} pin {} at ({}, {})",
            self.reference, self.pin_number, self.row, self.col
        )
    }
}

/// Walks an immutable ordered placement list, one pin per timer expiry.
#[derive(Clone, Debug)]
pub struct PinSequencer {
    placements: Vec<ComponentPlacement>,
    component_index: usize,
    pin_index: usize,
    last_advance_ms: u64,
    mode: SequencerMode,
    advance_delay_ms: u64,
}

impl PinSequencer {
    pub fn new(placements: Vec<ComponentPlacement>) -> Self {
        Self {
            placements,
            component_index: 0,
            pin_index: 0,
            last_advance_ms: 0,
            mode: SequencerMode::Inactive,
            advance_delay_ms: DEFAULT_ADVANCE_DELAY_MS,
        }
    }

    pub fn with_advance_delay(mut self, delay_ms: u64) -> Self {
        self.advance_delay_ms = delay_ms;
        self
    }

    #[inline]
    pub fn mode(&self) -> SequencerMode {
        self.mode
    }

    #[inline]
    pub fn component_index(&self) -> usize {
        self.component_index
    }

    #[inline]
    pub fn pin_index(&self) -> usize {
        self.pin_index
    }

    #[inline]
    pub fn placements(&self) -> &[ComponentPlacement] {
        &self.placements
    }

    /// `Inactive → Running` with a full reset, or any active state back to
    /// `Inactive`.
    pub fn toggle_active(&mut self, now_ms: u64, highlights: &mut HighlightSet) {
        match self.mode {
            SequencerMode::Inactive => {
                self.component_index = 0;
                self.pin_index = 0;
                highlights.clear();
                self.last_advance_ms = now_ms;
                self.mode = SequencerMode::Running;
                info!("sequencer started ({} components)", self.placements.len());
            }
            SequencerMode::Running | SequencerMode::Paused => {
                self.mode = SequencerMode::Inactive;
                info!("sequencer stopped");
            }
        }
    }

    /// Flip `Running ↔ Paused`; indices are untouched. No-op when inactive.
    pub fn toggle_pause(&mut self) {
        self.mode = match self.mode {
            SequencerMode::Running => SequencerMode::Paused,
            SequencerMode::Paused => SequencerMode::Running,
            SequencerMode::Inactive => SequencerMode::Inactive,
        };
    }

    /// Skip to the next component (modulo the list), first pin. Active
    /// states only.
    pub fn jump_next_component(&mut self, now_ms: u64, highlights: &mut HighlightSet) {
        if self.mode == SequencerMode::Inactive || self.placements.is_empty() {
            return;
        }
        highlights.clear();
        self.component_index = (self.component_index + 1) % self.placements.len();
        self.pin_index = 0;
        self.last_advance_ms = now_ms;
        info!(
            "jumped to component {}",
            self.placements[self.component_index].reference
        );
    }

    /// Per-frame tick. Fires only in `Running` once the advance delay has
    /// elapsed: clears the highlight set, wraps to the next component when
    /// the current one has no pin left, then highlights the current pin
    /// (validated against the frame's grid) and steps past it. The stamp is
    /// refreshed on every fired tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        grid: &IntersectionGrid,
        highlights: &mut HighlightSet,
    ) -> Option<TickEvent> {
        if self.mode != SequencerMode::Running || self.placements.is_empty() {
            return None;
        }
        if now_ms.saturating_sub(self.last_advance_ms) < self.advance_delay_ms {
            return None;
        }

        highlights.clear();
        self.last_advance_ms = now_ms;

        let mut advanced = false;
        let mut hops = 0;
        while self.pin_index >= self.placements[self.component_index].pins.len() {
            self.component_index = (self.component_index + 1) % self.placements.len();
            self.pin_index = 0;
            advanced = true;
            hops += 1;
            if hops > self.placements.len() {
                // Every component has an empty pin list; nothing to show.
                return None;
            }
        }

        let placement = &self.placements[self.component_index];
        let (row, col) = placement.pins[self.pin_index];
        let (row, col) = (row as usize, col as usize);
        let pin_number = self.pin_index + 1;

        if advanced {
            info!("next component: {}", placement.reference);
        }

        let highlighted = highlights.highlight_point(grid, row, col);
        let on_power_rail = grid.is_power_rail_row(row);
        if highlighted {
            info!(
                "{} pin {} at ({}, {})",
                placement.reference, pin_number, row, col
            );
            if on_power_rail {
                debug!("pin row {row} is in the power rail band");
            }
        } else {
            warn!(
                "{} pin {} at ({}, {}) outside current grid, advancing without highlight",
                placement.reference, pin_number, row, col
            );
        }

        let event = TickEvent {
            advanced_component: advanced,
            reference: placement.reference.clone(),
            pin_number,
            row,
            col,
            highlighted,
            on_power_rail,
        };

        self.pin_index += 1;
        Some(event)
    }
}
