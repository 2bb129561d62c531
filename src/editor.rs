//! Freehand envelope drawing.
//!
//! A gesture runs from pointer-down to pointer-up/leave and forms exactly
//! one undo step: the pre-gesture state is snapshotted on pointer-down and
//! every subsequent move edits the working pair in place.
//!
//! Each point is mapped to `(index, amplitude)` through the view. The first
//! point of a gesture (or a repeat of the previous index) is written
//! directly into the array selected by the amplitude's sign. Later points
//! fill the closed index range back to the previous point with a linear
//! ramp, and every ramp value is routed by *its own* sign, so a drag that
//! crosses zero writes into both arrays.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::envelope::{EnvelopePair, Polarity};
use crate::history::HistoryStack;
use crate::view::ViewTransform;

/// Drawing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Idle,
    Drawing,
}

/// The last point drawn in the current gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    index: usize,
    polarity: Polarity,
}

// ── Actions & Key Bindings ──────────────────────────────────

/// Logical editor commands that an input layer can bind to keys or buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Undo,
    Reset,
    PlayModified,
    PlayOriginal,
    Stop,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    PanLeft,
    PanRight,
    ResetPan,
}

/// Explicit key → action table. Keys are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<char, Action>", into = "HashMap<char, Action>")]
pub struct KeyMap {
    bindings: HashMap<char, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = HashMap::from([
            ('u', Action::Undo),
            ('r', Action::Reset),
            ('p', Action::PlayModified),
        ]);
        KeyMap { bindings }
    }
}

impl From<HashMap<char, Action>> for KeyMap {
    fn from(table: HashMap<char, Action>) -> Self {
        let mut keys = KeyMap::empty();
        for (key, action) in table {
            keys.bind(key, action);
        }
        keys
    }
}

impl From<KeyMap> for HashMap<char, Action> {
    fn from(keys: KeyMap) -> Self {
        keys.bindings
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        KeyMap {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: char, action: Action) {
        self.bindings.insert(key.to_ascii_lowercase(), action);
    }

    /// Resolve a key name as delivered by a keyboard event (`"u"`, `"U"`).
    /// Multi-character names (`"Shift"`, `"ArrowLeft"`) never match.
    pub fn lookup(&self, key: &str) -> Option<Action> {
        let mut chars = key.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        self.bindings.get(&ch.to_ascii_lowercase()).copied()
    }
}

// ── Editing Engine ──────────────────────────────────────────

/// Per-session editing state: the working envelope pair, its immutable
/// baseline, undo history, view, and the in-progress gesture.
#[derive(Debug, Clone)]
pub struct EditingEngine {
    envelopes: EnvelopePair,
    baseline: EnvelopePair,
    history: HistoryStack,
    view: ViewTransform,
    state: DrawState,
    previous: Option<Anchor>,
}

impl EditingEngine {
    /// `baseline` must already be reconciled to the view's sample count.
    pub fn new(baseline: EnvelopePair, view: ViewTransform, history: HistoryStack) -> Self {
        EditingEngine {
            envelopes: baseline.clone(),
            baseline,
            history,
            view,
            state: DrawState::Idle,
            previous: None,
        }
    }

    pub fn envelopes(&self) -> &EnvelopePair {
        &self.envelopes
    }

    pub fn baseline(&self) -> &EnvelopePair {
        &self.baseline
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ── Pointer input ───────────────────────────────────────

    /// Start a gesture. Returns true if the envelopes changed.
    ///
    /// Presses outside the surface are ignored. A press while already
    /// drawing continues the current gesture.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        if !self.view.contains(x, y) {
            return false;
        }
        if self.state == DrawState::Idle {
            self.begin_gesture();
        }
        self.draw_at(x, y)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        match self.state {
            DrawState::Drawing => self.draw_at(x, y),
            DrawState::Idle => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_gesture();
    }

    pub fn pointer_leave(&mut self) {
        self.end_gesture();
    }

    fn draw_at(&mut self, x: f64, y: f64) -> bool {
        let Some(index) = self.view.pointer_to_index(x) else {
            return false;
        };
        let amplitude = self.view.pointer_to_amplitude(y);
        self.extend_gesture(index, amplitude);
        true
    }

    // ── Index-space gesture API ─────────────────────────────

    /// Snapshot the current pair and enter `Drawing`.
    pub fn begin_gesture(&mut self) {
        self.history.snapshot(&self.envelopes);
        self.previous = None;
        self.state = DrawState::Drawing;
        log::debug!("gesture start (history depth {})", self.history.len());
    }

    /// Apply one point of the current gesture. Ignored outside a gesture
    /// and for indices outside `[0, N)`.
    pub fn extend_gesture(&mut self, index: usize, amplitude: f64) {
        if self.state != DrawState::Drawing || index >= self.view.num_samples() {
            return;
        }

        match self.previous {
            Some(prev) if prev.index != index => {
                let anchor_value = self.envelopes.at(prev.polarity, prev.index);
                let (start, end, start_val, end_val) = if prev.index > index {
                    (index, prev.index, amplitude, anchor_value)
                } else {
                    (prev.index, index, anchor_value, amplitude)
                };
                interpolate_routed(&mut self.envelopes, start, end, start_val, end_val);
            }
            _ => self.envelopes.write_routed(index, amplitude),
        }

        self.previous = Some(Anchor {
            index,
            polarity: Polarity::of(amplitude),
        });
    }

    pub fn end_gesture(&mut self) {
        if self.state == DrawState::Drawing {
            log::debug!("gesture end");
        }
        self.state = DrawState::Idle;
        self.previous = None;
    }

    // ── Commands ────────────────────────────────────────────

    /// Restore the state before the most recent gesture or reset.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.envelopes);
        if undone {
            log::debug!("undo (history depth {})", self.history.len());
        }
        undone
    }

    /// Replace the working pair with the baseline; undoable.
    pub fn reset(&mut self) {
        self.history.reset(&mut self.envelopes, &self.baseline);
        log::debug!("reset to baseline");
    }

    /// Apply an editing or view action. Returns false for actions that
    /// belong to playback.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Undo => {
                self.undo();
            }
            Action::Reset => self.reset(),
            Action::ZoomIn => self.view.zoom_in(),
            Action::ZoomOut => self.view.zoom_out(),
            Action::ResetZoom => self.view.reset_zoom(),
            Action::PanLeft => self.view.pan_left(),
            Action::PanRight => self.view.pan_right(),
            Action::ResetPan => self.view.reset_pan(),
            Action::PlayModified | Action::PlayOriginal | Action::Stop => return false,
        }
        true
    }
}

/// Linear ramp over `start..=end`, each value written by its own sign.
fn interpolate_routed(env: &mut EnvelopePair, start: usize, end: usize, start_val: f64, end_val: f64) {
    let span = (end - start) as f64;
    for i in start..=end {
        let value = if i == end {
            end_val
        } else if span == 0.0 {
            start_val
        } else {
            let t = (i - start) as f64 / span;
            start_val + t * (end_val - start_val)
        };
        env.write_routed(i, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(n: usize) -> EditingEngine {
        EditingEngine::new(
            EnvelopePair::zeros(n),
            ViewTransform::new(n, n as f64, 200.0),
            HistoryStack::new(),
        )
    }

    #[test]
    fn single_point_routes_by_sign() {
        let mut eng = engine(10);
        eng.begin_gesture();
        eng.extend_gesture(3, 0.4);
        assert_eq!(eng.envelopes().positive[3], 0.4);
        assert_eq!(eng.envelopes().negative[3], 0.0);
        eng.end_gesture();

        eng.begin_gesture();
        eng.extend_gesture(3, -0.6);
        assert_eq!(eng.envelopes().negative[3], -0.6);
        assert_eq!(eng.envelopes().positive[3], 0.4);
    }

    #[test]
    fn ramp_hits_both_endpoints() {
        let mut eng = engine(50);
        eng.begin_gesture();
        eng.extend_gesture(10, 0.1);
        eng.extend_gesture(20, 0.7);
        let pos = &eng.envelopes().positive;
        assert_eq!(pos[10], 0.1);
        assert_eq!(pos[20], 0.7);
        for i in 10..20 {
            assert!(pos[i] <= pos[i + 1], "ramp not monotonic at {i}");
        }
        assert_eq!(pos[9], 0.0);
        assert_eq!(pos[21], 0.0);
    }

    #[test]
    fn backwards_drag_interpolates() {
        let mut eng = engine(50);
        eng.begin_gesture();
        eng.extend_gesture(30, -0.2);
        eng.extend_gesture(26, -0.6);
        let neg = &eng.envelopes().negative;
        assert_eq!(neg[26], -0.6);
        assert_eq!(neg[30], -0.2);
        assert!((neg[28] + 0.4).abs() < 1e-12);
        assert!(eng.envelopes().positive.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_crossing_drag_splits_across_arrays() {
        let mut eng = engine(1000);
        eng.begin_gesture();
        eng.extend_gesture(100, 0.5);
        eng.extend_gesture(110, -0.3);
        eng.end_gesture();

        let env = eng.envelopes();
        for i in 100..=106 {
            let expected = 0.5 - 0.8 * (i - 100) as f64 / 10.0;
            assert!((env.positive[i] - expected).abs() < 1e-12, "positive[{i}]");
            assert_eq!(env.negative[i], 0.0);
        }
        for i in 107..=110 {
            let expected = 0.5 - 0.8 * (i - 100) as f64 / 10.0;
            assert!((env.negative[i] - expected).abs() < 1e-12, "negative[{i}]");
            assert_eq!(env.positive[i], 0.0);
        }
        assert_eq!(env.negative[110], -0.3);
        let touched = |i: usize| (100..=110).contains(&i);
        for i in (0..1000).filter(|&i| !touched(i)) {
            assert_eq!(env.positive[i], 0.0);
            assert_eq!(env.negative[i], 0.0);
        }
    }

    #[test]
    fn gesture_is_one_undo_step() {
        let mut eng = engine(100);
        let before = eng.envelopes().clone();
        eng.begin_gesture();
        for (i, a) in [(5, 0.1), (9, 0.3), (15, -0.2), (40, 0.9)] {
            eng.extend_gesture(i, a);
        }
        eng.end_gesture();
        assert_eq!(eng.history_len(), 1);
        assert!(eng.undo());
        assert_eq!(eng.envelopes(), &before);
    }

    #[test]
    fn n_undos_return_to_baseline() {
        let mut eng = engine(20);
        for k in 0..5 {
            eng.begin_gesture();
            eng.extend_gesture(k * 3, 0.1 * (k as f64 + 1.0));
            eng.extend_gesture(k * 3 + 2, -0.2);
            eng.end_gesture();
        }
        for _ in 0..5 {
            assert!(eng.undo());
        }
        assert_eq!(eng.envelopes(), eng.baseline());
        assert!(!eng.undo());
    }

    #[test]
    fn undo_rolls_back_second_gesture_at_same_index() {
        let mut eng = engine(10);
        eng.begin_gesture();
        eng.extend_gesture(4, 0.2);
        eng.end_gesture();
        eng.begin_gesture();
        eng.extend_gesture(4, -0.1);
        eng.end_gesture();

        eng.undo();
        assert_eq!(eng.envelopes().positive[4], 0.2);
        assert_eq!(eng.envelopes().negative[4], 0.0);
    }

    #[test]
    fn reset_then_undo_restores_edits() {
        let mut eng = engine(10);
        eng.begin_gesture();
        eng.extend_gesture(1, 0.8);
        eng.extend_gesture(6, -0.4);
        eng.end_gesture();
        let edited = eng.envelopes().clone();

        eng.reset();
        assert_eq!(eng.envelopes(), eng.baseline());
        eng.undo();
        assert_eq!(eng.envelopes(), &edited);
    }

    #[test]
    fn pointer_outside_surface_starts_nothing() {
        let mut eng = engine(100);
        assert!(!eng.pointer_down(-1.0, 50.0));
        assert!(!eng.pointer_down(100.0, 50.0));
        assert!(!eng.pointer_down(10.0, 200.0));
        assert_eq!(eng.state(), DrawState::Idle);
        assert!(!eng.can_undo());
        assert!(!eng.pointer_move(10.0, 10.0));
    }

    #[test]
    fn pointer_gesture_maps_through_view() {
        // N = width = 100, height 200: center 100, 80 px per unit.
        let mut eng = engine(100);
        assert!(eng.pointer_down(10.5, 60.0));
        assert_eq!(eng.state(), DrawState::Drawing);
        assert!((eng.envelopes().positive[10] - 0.5).abs() < 1e-12);

        assert!(eng.pointer_move(12.2, 60.0));
        assert!((eng.envelopes().positive[11] - 0.5).abs() < 1e-12);
        assert!((eng.envelopes().positive[12] - 0.5).abs() < 1e-12);

        // Moving off the left edge maps to a negative index: ignored.
        assert!(!eng.pointer_move(-5.0, 60.0));
        eng.pointer_leave();
        assert_eq!(eng.state(), DrawState::Idle);
        assert!(!eng.pointer_move(20.0, 60.0));
        assert_eq!(eng.history_len(), 1);
    }

    #[test]
    fn second_press_continues_gesture() {
        let mut eng = engine(100);
        eng.pointer_down(10.0, 60.0);
        eng.pointer_down(20.0, 60.0);
        eng.pointer_up();
        assert_eq!(eng.history_len(), 1);
        // Continued, so 10..=20 were interpolated rather than two lone points.
        assert!((eng.envelopes().positive[15] - 0.5).abs() < 1e-12);
        assert!(eng.undo());
        assert!(!eng.can_undo());
    }

    #[test]
    fn view_actions_route_to_view() {
        let mut eng = engine(1000);
        assert!(eng.apply(Action::ZoomIn));
        assert!(eng.apply(Action::PanRight));
        assert!((eng.view().zoom() - 1.1).abs() < 1e-12);
        assert_eq!(eng.view().pan(), 100.0);
        assert!(!eng.apply(Action::PlayModified));
    }

    #[test]
    fn extend_without_gesture_is_ignored() {
        let mut eng = engine(10);
        eng.extend_gesture(3, 0.7);
        assert_eq!(eng.envelopes(), &EnvelopePair::zeros(10));
        assert!(!eng.can_undo());

        eng.begin_gesture();
        eng.end_gesture();
        eng.extend_gesture(3, 0.7);
        assert_eq!(eng.envelopes().positive[3], 0.0);
    }

    #[test]
    fn keymap_lookup() {
        let keys = KeyMap::default();
        assert_eq!(keys.lookup("u"), Some(Action::Undo));
        assert_eq!(keys.lookup("R"), Some(Action::Reset));
        assert_eq!(keys.lookup("p"), Some(Action::PlayModified));
        assert_eq!(keys.lookup("x"), None);
        assert_eq!(keys.lookup("Undo"), None);
        assert_eq!(keys.lookup(""), None);

        let json = serde_json::to_string(&keys).unwrap();
        let back: KeyMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, keys);
    }

    #[test]
    fn uppercase_bindings_match() {
        let keys: KeyMap = serde_json::from_str(r#"{"Z": "undo", "x": "stop"}"#).unwrap();
        assert_eq!(keys.lookup("z"), Some(Action::Undo));
        assert_eq!(keys.lookup("Z"), Some(Action::Undo));
        assert_eq!(keys.lookup("X"), Some(Action::Stop));
    }
}
