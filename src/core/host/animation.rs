//=========================================================================
// Animation Contract
//=========================================================================
//
// Timed scale/opacity transitions with completion notification.
//
// Architecture:
//   Popup ──animate(node, Tween)──> Animator
//     ↑                                │
//     └──── Completion <── CompletionSignal (fired or dropped)
//
// Completions are backed by a zero-traffic crossbeam channel: the signal
// side owns the only Sender, and every Completion clone holds a Receiver.
// Firing the signal drops the Sender, which every Receiver observes as a
// disconnect. A signal dropped without firing resolves the same way.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

//=== Internal Dependencies ===============================================

use super::NodeId;

//=== Tween ===============================================================

/// Property a tween step drives toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenTarget {
    /// Uniform scale.
    Scale(f32),

    /// Opacity, 0-255.
    Opacity(u8),
}

/// One timed segment of a tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenStep {
    /// Duration in seconds.
    pub duration: f32,
    pub target: TweenTarget,
}

/// Ordered sequence of timed steps, played back to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tween {
    steps: Vec<TweenStep>,
}

impl Tween {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step animating toward `target` over `duration` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is negative.
    pub fn to(mut self, duration: f32, target: TweenTarget) -> Self {
        assert!(duration >= 0.0, "Tween duration must be non-negative, got {}", duration);
        self.steps.push(TweenStep { duration, target });
        self
    }

    pub fn steps(&self) -> &[TweenStep] {
        &self.steps
    }

    /// Total playback time in seconds.
    pub fn duration(&self) -> f32 {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Final value per property, as left by the last step touching it.
    pub fn final_scale(&self) -> Option<f32> {
        self.steps.iter().rev().find_map(|s| match s.target {
            TweenTarget::Scale(v) => Some(v),
            _ => None,
        })
    }

    pub fn final_opacity(&self) -> Option<u8> {
        self.steps.iter().rev().find_map(|s| match s.target {
            TweenTarget::Opacity(v) => Some(v),
            _ => None,
        })
    }
}

//=== Completion ==========================================================

/// Observer side of an asynchronous completion.
///
/// Cheap to clone; all clones resolve together.
#[derive(Debug, Clone)]
pub struct Completion {
    receiver: Receiver<()>,
}

/// Producer side of an asynchronous completion.
///
/// Call [`CompletionSignal::fire`] when the work finishes. Dropping the
/// signal also resolves the completion.
#[derive(Debug)]
pub struct CompletionSignal {
    _sender: Sender<()>,
}

impl Completion {
    /// Creates a linked signal/completion pair.
    pub fn pair() -> (CompletionSignal, Completion) {
        let (tx, rx) = bounded(0);
        (CompletionSignal { _sender: tx }, Completion { receiver: rx })
    }

    /// Creates a completion that is already resolved.
    pub fn ready() -> Self {
        let (signal, completion) = Self::pair();
        signal.fire();
        completion
    }

    /// Returns true once the paired signal has fired or been dropped.
    pub fn is_done(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }
}

impl CompletionSignal {
    /// Resolves every clone of the paired completion.
    pub fn fire(self) {
        drop(self);
    }
}

//=== Animator Trait ======================================================

/// Timed opacity/scale transition capability.
///
/// Implementations start playing `tween` on `node` and return a completion
/// that resolves when the last step finishes.
pub trait Animator {
    fn animate(&mut self, node: NodeId, tween: Tween) -> Completion;
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //--- Tween Tests ------------------------------------------------------

    #[test]
    fn tween_accumulates_steps_and_duration() {
        let tween = Tween::new()
            .to(0.2, TweenTarget::Scale(1.1))
            .to(0.05, TweenTarget::Scale(1.0));

        assert_eq!(tween.steps().len(), 2);
        assert!((tween.duration() - 0.25).abs() < f32::EPSILON);
        assert_eq!(tween.final_scale(), Some(1.0));
        assert_eq!(tween.final_opacity(), None);
    }

    #[test]
    #[should_panic(expected = "Tween duration must be non-negative")]
    fn tween_rejects_negative_duration() {
        let _ = Tween::new().to(-1.0, TweenTarget::Opacity(255));
    }

    //--- Completion Tests -------------------------------------------------

    #[test]
    fn completion_pending_until_fired() {
        let (signal, completion) = Completion::pair();
        assert!(!completion.is_done());

        signal.fire();
        assert!(completion.is_done());
    }

    #[test]
    fn completion_clones_resolve_together() {
        let (signal, completion) = Completion::pair();
        let other = completion.clone();

        signal.fire();
        assert!(completion.is_done());
        assert!(other.is_done());
    }

    #[test]
    fn dropped_signal_resolves_completion() {
        let (signal, completion) = Completion::pair();
        drop(signal);
        assert!(completion.is_done());
    }

    #[test]
    fn ready_completion_is_done() {
        assert!(Completion::ready().is_done());
    }
}
