//! # Gesture Machine
//!
//! Turns one pointer (or single-touch) session into exactly one of:
//!
//! - a **tap**: down then up before the long-press delay, picks a point;
//! - a **long-press drag**: down, hold past the delay, move, up, selects a rectangle.
//!
//! ```text
//!          down                     delay elapsed
//!  Idle ─────────▶ Armed{origin,timer} ──────────────▶ Dragging{start,current}
//!   ▲                 │ up (tap)                          │ move ⟲ (preview)
//!   └─────────────────┴───────────────────────────────────┘ up (select area)
//! ```
//!
//! The machine is a plain value. It never sleeps or does I/O; it returns the
//! [`Effect`]s the caller must carry out, which keeps every transition unit
//! testable without a runtime.

use super::geo::{AreaSelection, LatLng, LatLngBounds};
use std::time::Duration;
use tracing::trace;

pub const LONG_PRESS: Duration = Duration::from_millis(600);

/// Identity of one armed long-press timer. A firing whose id does not match
/// the armed state is stale and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(LatLng),
    Move(LatLng),
    Up(LatLng),
    LongPressElapsed(TimerId),
}

impl PointerInput {
    /// Arms only for a single touch point.
    pub fn touch_start(touches: &[LatLng]) -> Option<Self> {
        match touches {
            [only] => Some(PointerInput::Down(*only)),
            _ => None,
        }
    }

    /// Tracks the first touch point; the rest are ignored.
    pub fn touch_move(touches: &[LatLng]) -> Option<Self> {
        touches.first().copied().map(PointerInput::Move)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartTimer { id: TimerId, after: Duration },
    CancelTimer(TimerId),
    /// Enable or disable the map's own drag-to-pan.
    SetPanning(bool),
    ClearArea,
    PreviewArea(LatLngBounds),
    SelectArea(AreaSelection),
    /// Place the marker here and look the point up.
    PickPoint(LatLng),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Armed { origin: LatLng, timer: TimerId },
    Dragging { start: LatLng, current: LatLng },
}

#[derive(Debug)]
pub struct GestureMachine {
    state: GestureState,
    editing: bool,
    long_press: Duration,
    next_timer: u64,
}

impl GestureMachine {
    pub fn new(editing: bool, long_press: Duration) -> Self {
        Self {
            state: GestureState::Idle,
            editing,
            long_press,
            next_timer: 0,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Switching to read-only abandons any gesture in progress. Panning is
    /// left alone: in read-only mode it belongs to the host.
    pub fn set_editing(&mut self, editing: bool) -> Vec<Effect> {
        self.editing = editing;
        if editing {
            return Vec::new();
        }
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Armed { timer, .. } => vec![Effect::CancelTimer(timer)],
            _ => Vec::new(),
        }
    }

    pub fn handle(&mut self, input: PointerInput) -> Vec<Effect> {
        if !self.editing {
            return Vec::new();
        }

        match (self.state, input) {
            (GestureState::Idle, PointerInput::Down(origin)) => {
                let timer = self.arm_timer();
                self.state = GestureState::Armed { origin, timer };
                vec![
                    Effect::SetPanning(false),
                    Effect::StartTimer { id: timer, after: self.long_press },
                ]
            }
            (GestureState::Armed { origin, timer }, PointerInput::LongPressElapsed(fired)) if fired == timer => {
                self.state = GestureState::Dragging { start: origin, current: origin };
                vec![Effect::ClearArea]
            }
            (GestureState::Armed { origin, timer }, PointerInput::Up(_)) => {
                self.state = GestureState::Idle;
                vec![
                    Effect::CancelTimer(timer),
                    Effect::SetPanning(true),
                    Effect::ClearArea,
                    Effect::PickPoint(origin),
                ]
            }
            (GestureState::Dragging { start, .. }, PointerInput::Move(current)) => {
                self.state = GestureState::Dragging { start, current };
                vec![Effect::PreviewArea(LatLngBounds::from_corners(start, current))]
            }
            (GestureState::Dragging { start, .. }, PointerInput::Up(end)) => {
                self.state = GestureState::Idle;
                vec![
                    Effect::SelectArea(AreaSelection { start, end }),
                    Effect::SetPanning(true),
                ]
            }
            (state, input) => {
                trace!(?state, ?input, "Input ignored");
                Vec::new()
            }
        }
    }

    fn arm_timer(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: LatLng = LatLng::new(23.21, 72.63);
    const B: LatLng = LatLng::new(23.25, 72.70);
    const C: LatLng = LatLng::new(23.19, 72.61);

    fn armed_timer(machine: &GestureMachine) -> TimerId {
        match machine.state() {
            GestureState::Armed { timer, .. } => timer,
            other => panic!("expected Armed, got {other:?}"),
        }
    }

    #[test]
    fn test_tap_picks_down_coordinate() {
        let mut machine = GestureMachine::new(true, LONG_PRESS);
        let down = machine.handle(PointerInput::Down(A));
        let timer = armed_timer(&machine);
        assert_eq!(down, vec![Effect::SetPanning(false), Effect::StartTimer { id: timer, after: LONG_PRESS }]);

        let up = machine.handle(PointerInput::Up(A));
        assert_eq!(
            up,
            vec![Effect::CancelTimer(timer), Effect::SetPanning(true), Effect::ClearArea, Effect::PickPoint(A)]
        );
        assert_eq!(machine.state(), GestureState::Idle);
    }

    #[test]
    fn test_long_press_drag_reports_start_and_release() {
        let mut machine = GestureMachine::new(true, LONG_PRESS);
        machine.handle(PointerInput::Down(A));
        let timer = armed_timer(&machine);

        assert_eq!(machine.handle(PointerInput::LongPressElapsed(timer)), vec![Effect::ClearArea]);
        assert_eq!(
            machine.handle(PointerInput::Move(C)),
            vec![Effect::PreviewArea(LatLngBounds::from_corners(A, C))]
        );
        machine.handle(PointerInput::Move(LatLng::new(0.0, 0.0)));

        let up = machine.handle(PointerInput::Up(B));
        assert_eq!(up, vec![Effect::SelectArea(AreaSelection { start: A, end: B }), Effect::SetPanning(true)]);
        assert_eq!(machine.state(), GestureState::Idle);
    }

    #[test]
    fn test_long_press_without_movement_yields_degenerate_area() {
        let mut machine = GestureMachine::new(true, LONG_PRESS);
        machine.handle(PointerInput::Down(A));
        let timer = armed_timer(&machine);
        machine.handle(PointerInput::LongPressElapsed(timer));

        let up = machine.handle(PointerInput::Up(A));
        assert_eq!(up[0], Effect::SelectArea(AreaSelection { start: A, end: A }));
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut machine = GestureMachine::new(true, LONG_PRESS);
        machine.handle(PointerInput::Down(A));
        let first = armed_timer(&machine);
        machine.handle(PointerInput::Up(A));

        machine.handle(PointerInput::Down(B));
        assert!(machine.handle(PointerInput::LongPressElapsed(first)).is_empty());
        assert!(matches!(machine.state(), GestureState::Armed { origin, .. } if origin == B));
    }

    #[test]
    fn test_moves_outside_a_drag_do_nothing() {
        let mut machine = GestureMachine::new(true, LONG_PRESS);
        assert!(machine.handle(PointerInput::Move(A)).is_empty());
        machine.handle(PointerInput::Down(A));
        assert!(machine.handle(PointerInput::Move(B)).is_empty());
        assert!(machine.handle(PointerInput::Down(B)).is_empty());
    }

    #[test]
    fn test_read_only_is_inert() {
        let mut machine = GestureMachine::new(false, LONG_PRESS);
        assert!(machine.handle(PointerInput::Down(A)).is_empty());
        assert!(machine.handle(PointerInput::Up(A)).is_empty());
        assert_eq!(machine.state(), GestureState::Idle);
    }

    #[test]
    fn test_leaving_edit_mode_cancels_armed_timer() {
        let mut machine = GestureMachine::new(true, LONG_PRESS);
        machine.handle(PointerInput::Down(A));
        let timer = armed_timer(&machine);

        assert_eq!(machine.set_editing(false), vec![Effect::CancelTimer(timer)]);
        assert_eq!(machine.state(), GestureState::Idle);
        assert!(machine.handle(PointerInput::LongPressElapsed(timer)).is_empty());
    }

    #[test]
    fn test_touch_start_needs_exactly_one_point() {
        assert_eq!(PointerInput::touch_start(&[A]), Some(PointerInput::Down(A)));
        assert_eq!(PointerInput::touch_start(&[A, B]), None);
        assert_eq!(PointerInput::touch_start(&[]), None);
        assert_eq!(PointerInput::touch_move(&[B, A]), Some(PointerInput::Move(B)));
    }
}
