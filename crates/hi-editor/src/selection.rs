//! The single page-wide selection and its "selection made" broadcast.
//!
//! Each transform controller keeps its own notion of what it has selected.
//! Whenever one of them selects something it publishes its origin here; the
//! dispatcher then tells every controller, and the ones that did not publish
//! drop their selection. At most one controller holds a selection at a time.

use crate::input::ElementId;

/// Which controller made a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    LocationView,
    Icon,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    /// The base map `<svg>`.
    LocationView,
    Icon(ElementId),
}

/// Pending "selection made" notifications.
#[derive(Debug, Default)]
pub struct SelectionBus {
    pending: Vec<SelectionOrigin>,
}

impl SelectionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, origin: SelectionOrigin) {
        log::debug!("selection made by {origin:?}");
        self.pending.push(origin);
    }

    /// Take all notifications published since the last drain, in order.
    pub fn drain(&mut self) -> Vec<SelectionOrigin> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
