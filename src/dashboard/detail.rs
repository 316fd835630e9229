use tracing::debug;

use crate::error::ApiError;
use crate::generation::{Generation, Ticket};
use crate::meals::dto::{MealLogEntry, OverrideRequest};
use crate::meals::overrides::OverrideSession;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Closed,
    Loading { meal_id: i64 },
    Open {
        session: OverrideSession,
        saving: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTicket {
    pub meal_id: i64,
    ticket: Ticket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub meal_id: i64,
    pub body: OverrideRequest,
    ticket: Ticket,
}

/// The meal-detail panel. Opening another meal or closing the panel
/// invalidates whatever load or save is still in flight.
#[derive(Debug, Clone)]
pub struct DetailPanel {
    state: DetailState,
    generation: Generation,
}

impl Default for DetailPanel {
    fn default() -> Self {
        Self {
            state: DetailState::Closed,
            generation: Generation::default(),
        }
    }
}

impl DetailPanel {
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DetailState::Closed)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DetailState::Loading { .. })
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, DetailState::Open { saving: true, .. })
    }

    pub fn meal_id(&self) -> Option<i64> {
        match &self.state {
            DetailState::Closed => None,
            DetailState::Loading { meal_id } => Some(*meal_id),
            DetailState::Open { session, .. } => Some(session.meal_id()),
        }
    }

    pub fn session(&self) -> Option<&OverrideSession> {
        match &self.state {
            DetailState::Open { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut OverrideSession> {
        match &mut self.state {
            DetailState::Open { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn begin_open(&mut self, meal_id: i64) -> OpenTicket {
        self.state = DetailState::Loading { meal_id };
        OpenTicket {
            meal_id,
            ticket: self.generation.advance(),
        }
    }

    /// `Ok(false)` when the panel moved on before the response arrived.
    /// A failed load closes the panel.
    pub fn finish_open(
        &mut self,
        ticket: OpenTicket,
        result: Result<MealLogEntry, ApiError>,
    ) -> Result<bool, ApiError> {
        if !self.generation.is_current(ticket.ticket) {
            debug!(meal_id = ticket.meal_id, "discarding stale meal detail");
            return Ok(false);
        }
        match result {
            Ok(entry) => {
                self.state = DetailState::Open {
                    session: OverrideSession::new(entry),
                    saving: false,
                };
                Ok(true)
            }
            Err(e) => {
                self.state = DetailState::Closed;
                Err(e)
            }
        }
    }

    pub fn close(&mut self) {
        self.generation.invalidate();
        self.state = DetailState::Closed;
    }

    /// `None` unless a meal is open and no save is already running.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        let ticket = self.generation.current();
        match &mut self.state {
            DetailState::Open { session, saving } if !*saving => {
                *saving = true;
                Some(SaveTicket {
                    meal_id: session.meal_id(),
                    body: session.submission(),
                    ticket,
                })
            }
            _ => None,
        }
    }

    /// Applies the saved entry on success. On failure the session is left
    /// exactly as it was, draft included.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<MealLogEntry, ApiError>,
    ) -> Result<bool, ApiError> {
        if !self.generation.is_current(ticket.ticket) {
            debug!(meal_id = ticket.meal_id, "discarding stale override save");
            return Ok(false);
        }
        let DetailState::Open { session, saving } = &mut self.state else {
            return Ok(false);
        };
        *saving = false;
        let updated = result?;
        session.apply_saved(updated);
        Ok(true)
    }
}
