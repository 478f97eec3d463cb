//=========================================================================
// Close Requests
//=========================================================================
//
// Lets a popup (or any UI callback) ask the manager to close a popup by
// name without holding the manager.
//
// Architecture:
//   PopupBase::request_hide() ─┐
//   Closer::hide(name) ────────┼──> crossbeam ──> PopupManager::update()
//   Closer::remove(name) ──────┘                     └─ hide() / remove()
//
// Requests are applied on the manager's next update, through the same
// hide/remove paths as direct calls, so stack and guard rules hold.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::PopupName;

//=== CloseRequest ========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseKind {
    /// Close and keep cached.
    Hide,

    /// Close, destroy and evict.
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRequest {
    pub name: PopupName,
    pub kind: CloseKind,
}

//=== Closer ==============================================================

/// Cloneable handle for queuing close requests to a manager.
///
/// Obtain one from [`super::PopupManager::closer`]. Popups built on
/// [`super::PopupBase`] receive one automatically when first shown.
#[derive(Debug, Clone)]
pub struct Closer {
    sender: Sender<CloseRequest>,
}

impl Closer {
    pub(crate) fn new(sender: Sender<CloseRequest>) -> Self {
        Self { sender }
    }

    pub fn hide(&self, name: &str) -> bool {
        self.request(name, CloseKind::Hide)
    }

    pub fn remove(&self, name: &str) -> bool {
        self.request(name, CloseKind::Remove)
    }

    /// Queues a request. Returns false if the manager is gone.
    pub fn request(&self, name: &str, kind: CloseKind) -> bool {
        let request = CloseRequest {
            name: name.to_string(),
            kind,
        };

        match self.sender.send(request) {
            Ok(()) => {
                debug!(target: "popup", "Close requested for '{}' ({:?})", name, kind);
                true
            }
            Err(_) => {
                warn!(target: "popup", "Manager gone, dropping close request for '{}'", name);
                false
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn requests_arrive_in_order() {
        let (tx, rx) = unbounded();
        let closer = Closer::new(tx);

        assert!(closer.hide("Shop"));
        assert!(closer.clone().remove("Mail"));

        let received: Vec<CloseRequest> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                CloseRequest { name: "Shop".into(), kind: CloseKind::Hide },
                CloseRequest { name: "Mail".into(), kind: CloseKind::Remove },
            ]
        );
    }

    #[test]
    fn request_fails_once_receiver_is_dropped() {
        let (tx, rx) = unbounded();
        let closer = Closer::new(tx);
        drop(rx);

        assert!(!closer.hide("Shop"));
    }
}
