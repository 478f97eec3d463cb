//=========================================================================
// Stack Arbiter
//=========================================================================
//
// Ordering and presentation policy for open popups.
//
// The stack holds names back to front; the last element is the current
// popup. The arbiter only decides and records order. Driving the popups
// (hiding, animating) is left to the manager, which applies the returned
// Placement after the stack has already been updated.
//
// Decision:
//   priority < top priority  → Background: insert below, stay inactive
//   otherwise, by ShowType:
//     Replace → hide all open, pop previous top, push
//     Push    → hide all open, push
//     Keep    → push, hide nothing
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::{PopupName, ShowType};

//=== Placement ===========================================================

/// Outcome of arbitrating a show request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The popup became the top and should be shown. Every popup in
    /// `hide` was open before and must be hidden first.
    Foreground { hide: Vec<PopupName> },

    /// The popup was slotted below the top at `index` and must stay
    /// inactive until it surfaces.
    Background { index: usize },
}

//=== StackArbiter ========================================================

/// Ordered set of open popup names, topmost last.
#[derive(Debug, Default)]
pub struct StackArbiter {
    stack: Vec<PopupName>,
}

impl StackArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Arbitration ------------------------------------------------------

    /// Places `name` in the stack and reports how the manager must react.
    ///
    /// A name already in the stack is detached first, so no policy can
    /// duplicate it. The priority gate compares against the current top
    /// only; a background slot is the first entry, scanning from the
    /// bottom, whose priority is at least `priority`.
    pub fn decide<F>(
        &mut self,
        name: &str,
        priority: i32,
        show_type: ShowType,
        priority_of: F,
    ) -> Placement
    where
        F: Fn(&str) -> i32,
    {
        let was_top = self.top() == Some(name);
        self.detach(name);

        let top_priority = self.top().map(&priority_of).unwrap_or(0);

        if priority < top_priority {
            let index = self
                .stack
                .iter()
                .position(|open| priority <= priority_of(open.as_str()))
                .unwrap_or(self.stack.len());

            debug!(
                target: "popup::stack",
                "'{}' (priority {}) queued at {} below top (priority {})",
                name, priority, index, top_priority
            );
            self.stack.insert(index, name.to_string());
            return Placement::Background { index };
        }

        let hide = match show_type {
            ShowType::Replace => {
                let hide = self.stack.clone();
                if !was_top {
                    self.stack.pop();
                }
                hide
            }
            ShowType::Push => self.stack.clone(),
            ShowType::Keep => Vec::new(),
        };

        debug!(
            target: "popup::stack",
            "'{}' (priority {}) on top via {:?}, hiding {:?}",
            name, priority, show_type, hide
        );
        self.stack.push(name.to_string());
        Placement::Foreground { hide }
    }

    //--- Removal ----------------------------------------------------------

    /// Removes `name` wherever it occurs. Returns whether it was the top,
    /// or `None` if it was not open.
    pub fn remove(&mut self, name: &str) -> Option<bool> {
        let pos = self.stack.iter().position(|open| open == name)?;
        let was_top = pos + 1 == self.stack.len();
        self.stack.remove(pos);
        debug!(target: "popup::stack", "'{}' closed (was top: {})", name, was_top);
        Some(was_top)
    }

    /// Empties the stack, returning the names back to front.
    pub fn clear(&mut self) -> Vec<PopupName> {
        std::mem::take(&mut self.stack)
    }

    fn detach(&mut self, name: &str) {
        self.stack.retain(|open| open != name);
    }

    //--- Queries ----------------------------------------------------------

    pub fn top(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn names(&self) -> &[PopupName] {
        &self.stack
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Arbiter plus a priority table, updated the way the manager does.
    struct Fixture {
        arbiter: StackArbiter,
        priorities: HashMap<String, i32>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                arbiter: StackArbiter::new(),
                priorities: HashMap::new(),
            }
        }

        fn show(&mut self, name: &str, priority: i32, show_type: ShowType) -> Placement {
            let priorities = &self.priorities;
            let placement = self.arbiter.decide(name, priority, show_type, |n| {
                priorities.get(n).copied().unwrap_or(0)
            });
            self.priorities.insert(name.to_string(), priority);
            placement
        }

        fn stack(&self) -> Vec<&str> {
            self.arbiter.names().iter().map(String::as_str).collect()
        }
    }

    //--- Policy Tests -----------------------------------------------------

    #[test]
    fn replace_swaps_top() {
        let mut f = Fixture::new();
        f.show("A", 1, ShowType::Replace);
        let placement = f.show("B", 1, ShowType::Replace);

        assert_eq!(placement, Placement::Foreground { hide: vec!["A".into()] });
        assert_eq!(f.stack(), vec!["B"]);
    }

    #[test]
    fn push_accumulates_history() {
        let mut f = Fixture::new();
        f.show("A", 0, ShowType::Push);
        f.show("B", 0, ShowType::Push);
        let placement = f.show("C", 0, ShowType::Push);

        assert_eq!(
            placement,
            Placement::Foreground { hide: vec!["A".into(), "B".into()] }
        );
        assert_eq!(f.stack(), vec!["A", "B", "C"]);
    }

    #[test]
    fn push_moves_existing_name_to_top() {
        let mut f = Fixture::new();
        f.show("A", 0, ShowType::Push);
        f.show("B", 0, ShowType::Push);
        f.show("A", 0, ShowType::Push);

        assert_eq!(f.stack(), vec!["B", "A"]);
    }

    #[test]
    fn keep_hides_nothing() {
        let mut f = Fixture::new();
        f.show("A", 0, ShowType::Keep);
        let placement = f.show("B", 0, ShowType::Keep);

        assert_eq!(placement, Placement::Foreground { hide: vec![] });
        assert_eq!(f.stack(), vec!["A", "B"]);
    }

    #[test]
    fn replace_of_current_top_keeps_lower_entries() {
        let mut f = Fixture::new();
        f.show("A", 0, ShowType::Push);
        f.show("B", 0, ShowType::Push);
        f.show("B", 0, ShowType::Replace);

        assert_eq!(f.stack(), vec!["A", "B"]);
    }

    #[test]
    fn replace_of_buried_name_never_duplicates() {
        let mut f = Fixture::new();
        f.show("A", 0, ShowType::Push);
        f.show("B", 0, ShowType::Push);
        f.show("A", 0, ShowType::Replace);

        assert_eq!(f.stack(), vec!["A"]);
    }

    //--- Priority Tests ---------------------------------------------------

    #[test]
    fn lower_priority_slots_below_top() {
        let mut f = Fixture::new();
        f.show("high", 5, ShowType::Replace);
        let placement = f.show("low", 2, ShowType::Replace);

        assert_eq!(placement, Placement::Background { index: 0 });
        assert_eq!(f.stack(), vec!["low", "high"]);
    }

    #[test]
    fn mixed_priorities_keep_highest_on_top() {
        let mut f = Fixture::new();
        for (name, priority) in [("p5", 5), ("p2", 2), ("p8", 8), ("p3", 3)] {
            f.show(name, priority, ShowType::Replace);
        }

        assert_eq!(f.arbiter.top(), Some("p8"));
        assert_eq!(f.stack(), vec!["p2", "p3", "p8"]);

        let placement = f.show("p1", 1, ShowType::Replace);
        assert_eq!(placement, Placement::Background { index: 0 });
        assert_eq!(f.stack(), vec!["p1", "p2", "p3", "p8"]);
    }

    #[test]
    fn equal_priority_ties_go_in_front_of_equals() {
        let mut f = Fixture::new();
        f.show("a", 3, ShowType::Keep);
        f.show("top", 9, ShowType::Keep);
        f.show("b", 3, ShowType::Keep);

        assert_eq!(f.stack(), vec!["b", "a", "top"]);
    }

    //--- Removal Tests ----------------------------------------------------

    #[test]
    fn remove_reports_top() {
        let mut f = Fixture::new();
        f.show("A", 0, ShowType::Keep);
        f.show("B", 0, ShowType::Keep);

        assert_eq!(f.arbiter.remove("A"), Some(false));
        assert_eq!(f.arbiter.remove("B"), Some(true));
        assert_eq!(f.arbiter.remove("B"), None);
        assert!(f.arbiter.is_empty());
    }

    #[test]
    fn clear_returns_back_to_front() {
        let mut f = Fixture::new();
        f.show("A", 0, ShowType::Keep);
        f.show("B", 0, ShowType::Keep);

        assert_eq!(f.arbiter.clear(), vec!["A".to_string(), "B".to_string()]);
        assert!(f.arbiter.top().is_none());
    }
}
