//! Region capture state machine
//!
//! A field starts life as a pointer drag over the overlay surface. The drag
//! lifecycle is a single enum so that illegal combinations (drawing while a
//! candidate is waiting for its type, say) cannot be represented.
//!
//! ```text
//! Idle --arm--> SelectionArmed --down--> Drawing --up--> PendingClassification
//!   ^                                       |                 |      |
//!   +------------- degenerate drag ---------+    classify ----+      |
//!   +------------------------------------------------ cancel --------+
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::CaptureError;
use crate::field::{Field, FieldType};
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CaptureState {
    #[default]
    Idle,
    SelectionArmed,
    Drawing {
        start: Point,
        end: Point,
    },
    PendingClassification {
        candidate: Rect,
    },
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::SelectionArmed => "selection_armed",
            CaptureState::Drawing { .. } => "drawing",
            CaptureState::PendingClassification { .. } => "pending_classification",
        }
    }

    /// Drawing or awaiting a field type
    pub fn is_capturing(&self) -> bool {
        matches!(
            self,
            CaptureState::Drawing { .. } | CaptureState::PendingClassification { .. }
        )
    }
}

/// Result of releasing the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "rect", rename_all = "snake_case")]
pub enum PointerUpOutcome {
    /// Candidate is held until a field type is chosen
    Pending(Rect),
    /// Zero-area drag, dropped without a trace
    Discarded,
    /// No drag was in progress
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct RegionCapture {
    state: CaptureState,
    /// Extents at or below this size count as degenerate
    min_size: f64,
}

impl RegionCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_size(min_size: f64) -> Self {
        Self {
            state: CaptureState::Idle,
            min_size: min_size.max(0.0),
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_armed(&self) -> bool {
        !matches!(self.state, CaptureState::Idle)
    }

    /// Request a new selection; the next pointer press starts a drag
    pub fn arm(&mut self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::Idle | CaptureState::SelectionArmed => {
                self.transition(CaptureState::SelectionArmed);
                Ok(())
            }
            _ => Err(CaptureError::CaptureInProgress),
        }
    }

    pub fn pointer_down(&mut self, point: Point) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::SelectionArmed => {
                self.transition(CaptureState::Drawing {
                    start: point,
                    end: point,
                });
                Ok(())
            }
            CaptureState::Idle => Err(CaptureError::NotArmed),
            CaptureState::Drawing { .. } | CaptureState::PendingClassification { .. } => {
                Err(CaptureError::CaptureInProgress)
            }
        }
    }

    /// Track the drag; returns whether the live rectangle changed
    pub fn pointer_move(&mut self, point: Point) -> bool {
        match &mut self.state {
            CaptureState::Drawing { end, .. } => {
                let changed = *end != point;
                *end = point;
                changed
            }
            _ => false,
        }
    }

    pub fn pointer_up(&mut self) -> PointerUpOutcome {
        let CaptureState::Drawing { start, end } = self.state else {
            return PointerUpOutcome::Ignored;
        };

        let candidate = Rect::from_corners(start, end);
        if self.is_too_small(&candidate) {
            debug!(?candidate, "discarding degenerate drag");
            self.transition(CaptureState::Idle);
            return PointerUpOutcome::Discarded;
        }

        self.transition(CaptureState::PendingClassification { candidate });
        PointerUpOutcome::Pending(candidate)
    }

    /// Commit the pending candidate as a field on `page`
    ///
    /// Selection is disarmed afterwards; the next field needs a fresh `arm`.
    pub fn classify(&mut self, field_type: FieldType, page: u32) -> Result<Field, CaptureError> {
        let CaptureState::PendingClassification { candidate } = self.state else {
            return Err(CaptureError::NothingPending);
        };

        self.transition(CaptureState::Idle);
        Ok(Field::new(field_type, page, candidate))
    }

    /// Abandon whatever is in progress and disarm
    pub fn cancel(&mut self) {
        self.transition(CaptureState::Idle);
    }

    /// Drop a drag or pending candidate but keep selection armed
    pub fn discard_in_progress(&mut self) -> bool {
        if self.state.is_capturing() {
            self.transition(CaptureState::SelectionArmed);
            true
        } else {
            false
        }
    }

    /// Signed rectangle of the drag in progress, for live preview
    pub fn live_rect(&self) -> Option<Rect> {
        match self.state {
            CaptureState::Drawing { start, end } => Some(Rect::from_drag(start, end)),
            _ => None,
        }
    }

    pub fn pending_candidate(&self) -> Option<Rect> {
        match self.state {
            CaptureState::PendingClassification { candidate } => Some(candidate),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.transition(CaptureState::Idle);
    }

    fn is_too_small(&self, rect: &Rect) -> bool {
        rect.is_degenerate() || rect.width <= self.min_size || rect.height <= self.min_size
    }

    fn transition(&mut self, next: CaptureState) {
        if self.state.name() != next.name() {
            debug!(from = self.state.name(), to = next.name(), "capture transition");
        }
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(capture: &mut RegionCapture, from: (f64, f64), to: (f64, f64)) -> PointerUpOutcome {
        capture.pointer_down(Point::new(from.0, from.1)).unwrap();
        capture.pointer_move(Point::new(to.0, to.1));
        capture.pointer_up()
    }

    #[test]
    fn test_full_cycle() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();

        let outcome = drag(&mut capture, (10.0, 10.0), (110.0, 60.0));
        assert_eq!(
            outcome,
            PointerUpOutcome::Pending(Rect::new(10.0, 10.0, 100.0, 50.0))
        );

        let field = capture.classify(FieldType::Input, 1).unwrap();
        assert_eq!(field.coordinates, Rect::new(10.0, 10.0, 100.0, 50.0));
        assert_eq!(field.page, 1);
        assert_eq!(capture.state(), &CaptureState::Idle);
        assert!(!capture.is_armed());
    }

    #[test]
    fn test_pointer_down_requires_arming() {
        let mut capture = RegionCapture::new();
        assert_eq!(
            capture.pointer_down(Point::new(1.0, 1.0)),
            Err(CaptureError::NotArmed)
        );
        assert_eq!(capture.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_reverse_drag_is_normalized() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        let outcome = drag(&mut capture, (110.0, 60.0), (10.0, 10.0));
        assert_eq!(
            outcome,
            PointerUpOutcome::Pending(Rect::new(10.0, 10.0, 100.0, 50.0))
        );
    }

    #[test]
    fn test_degenerate_drag_returns_to_idle() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        assert_eq!(
            drag(&mut capture, (0.0, 0.0), (0.0, 40.0)),
            PointerUpOutcome::Discarded
        );
        assert_eq!(capture.state(), &CaptureState::Idle);
        assert_eq!(
            capture.classify(FieldType::Input, 1),
            Err(CaptureError::NothingPending)
        );
    }

    #[test]
    fn test_click_without_move_is_degenerate() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        capture.pointer_down(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(capture.pointer_up(), PointerUpOutcome::Discarded);
    }

    #[test]
    fn test_min_size_threshold() {
        let mut capture = RegionCapture::with_min_size(4.0);
        capture.arm().unwrap();
        assert_eq!(
            drag(&mut capture, (0.0, 0.0), (4.0, 30.0)),
            PointerUpOutcome::Discarded
        );

        capture.arm().unwrap();
        assert!(matches!(
            drag(&mut capture, (0.0, 0.0), (5.0, 30.0)),
            PointerUpOutcome::Pending(_)
        ));
    }

    #[test]
    fn test_no_nested_capture_while_pending() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        drag(&mut capture, (0.0, 0.0), (10.0, 10.0));

        assert_eq!(
            capture.pointer_down(Point::new(50.0, 50.0)),
            Err(CaptureError::CaptureInProgress)
        );
        assert_eq!(capture.arm(), Err(CaptureError::CaptureInProgress));
        assert_eq!(
            capture.pending_candidate(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_no_nested_capture_while_drawing() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        capture.pointer_down(Point::new(0.0, 0.0)).unwrap();
        assert_eq!(
            capture.pointer_down(Point::new(3.0, 3.0)),
            Err(CaptureError::CaptureInProgress)
        );
    }

    #[test]
    fn test_cancel_discards_candidate() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        drag(&mut capture, (0.0, 0.0), (10.0, 10.0));

        capture.cancel();
        assert_eq!(capture.state(), &CaptureState::Idle);
        assert_eq!(capture.pending_candidate(), None);
    }

    #[test]
    fn test_discard_in_progress_keeps_armed() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        capture.pointer_down(Point::new(0.0, 0.0)).unwrap();
        capture.pointer_move(Point::new(8.0, 8.0));

        assert!(capture.discard_in_progress());
        assert_eq!(capture.state(), &CaptureState::SelectionArmed);

        // Nothing to discard once armed or idle
        assert!(!capture.discard_in_progress());
        capture.cancel();
        assert!(!capture.discard_in_progress());
        assert_eq!(capture.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_live_rect_is_signed() {
        let mut capture = RegionCapture::new();
        capture.arm().unwrap();
        assert_eq!(capture.live_rect(), None);

        capture.pointer_down(Point::new(50.0, 50.0)).unwrap();
        assert!(capture.pointer_move(Point::new(20.0, 70.0)));
        assert!(!capture.pointer_move(Point::new(20.0, 70.0)));
        assert_eq!(capture.live_rect(), Some(Rect::new(50.0, 50.0, -30.0, 20.0)));
    }

    #[test]
    fn test_move_outside_drag_is_ignored() {
        let mut capture = RegionCapture::new();
        assert!(!capture.pointer_move(Point::new(1.0, 1.0)));
        assert_eq!(capture.pointer_up(), PointerUpOutcome::Ignored);
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_value(CaptureState::SelectionArmed).unwrap();
        assert_eq!(json["state"], "selection_armed");
    }
}
