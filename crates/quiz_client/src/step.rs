//! Per-step interaction state: the selected product, navigation guards and
//! the self-clearing feedback pulses on the advance/retreat controls.
//!
//! One [`StepController`] exists per step instance. Selection changes and
//! navigation are reported to the session orchestrator as [`StepEvent`]s.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::QuizSection;
use crate::types::{Product, Question};

/// How long a pulse stays active after its last trigger.
pub const PULSE_WINDOW: Duration = Duration::from_millis(500);

/// Navigation direction; also names the pulse on that control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Advance,
    Retreat,
}

/// Events sent from a step to the session orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// New selection for this step; `None` after a deselect.
    SelectionChanged(Option<Product>),
    Next,
    Prev,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("product {0} is not among this step's recommendations")]
    UnknownProduct(String),
}

/// Where the step sits in the quiz, as told by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPosition {
    pub is_first: bool,
    pub is_last: bool,
}

impl StepPosition {
    /// Position of step `index` (zero-based) in a quiz of `total` steps.
    pub fn of(index: usize, total: usize) -> Self {
        Self {
            is_first: index == 0,
            is_last: index + 1 >= total,
        }
    }
}

#[derive(Debug, Default)]
struct PulseState {
    active: bool,
    generation: u64,
    resets: usize,
}

/// A flag that turns on when triggered and clears itself `window` after the
/// most recent trigger. Re-triggering restarts the window.
///
/// Clearing runs on a tokio timer task. Triggered outside a runtime, the
/// flag is set but stays on until the next trigger from inside one.
#[derive(Debug)]
pub struct Pulse {
    state: Arc<Mutex<PulseState>>,
    window: Duration,
    timer: Option<JoinHandle<()>>,
}

impl Pulse {
    pub fn new(window: Duration) -> Self {
        Self {
            state: Arc::default(),
            window,
            timer: None,
        }
    }

    pub fn trigger(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let generation = {
            let mut state = lock(&self.state);
            state.active = true;
            state.generation += 1;
            state.generation
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!("pulse triggered outside a tokio runtime, it will not clear");
            return;
        };
        let shared = Arc::clone(&self.state);
        let window = self.window;
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(window).await;
            let mut state = lock(&shared);
            // A later trigger owns the flag now.
            if state.generation == generation {
                state.active = false;
                state.resets += 1;
            }
        }));
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    /// Number of times the pulse has cleared itself. Observers polling
    /// `is_active` can miss a short on/off cycle; this count cannot.
    pub fn resets(&self) -> usize {
        lock(&self.state).resets
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Drop for Pulse {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

fn lock(state: &Mutex<PulseState>) -> std::sync::MutexGuard<'_, PulseState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Interaction state of one quiz step.
#[derive(Debug)]
pub struct StepController {
    question: Question,
    products: Vec<Product>,
    position: StepPosition,
    selected: Option<String>,
    has_selected_once: bool,
    advance: Pulse,
    retreat: Pulse,
    events: mpsc::UnboundedSender<StepEvent>,
}

impl StepController {
    pub fn new(
        question: Question,
        products: Vec<Product>,
        position: StepPosition,
        events: mpsc::UnboundedSender<StepEvent>,
    ) -> Self {
        Self {
            question,
            products,
            position,
            selected: None,
            has_selected_once: false,
            advance: Pulse::new(PULSE_WINDOW),
            retreat: Pulse::new(PULSE_WINDOW),
            events,
        }
    }

    /// Use `window` instead of [`PULSE_WINDOW`] for both pulses.
    pub fn with_pulse_window(mut self, window: Duration) -> Self {
        self.advance = Pulse::new(window);
        self.retreat = Pulse::new(window);
        self
    }

    /// Apply the `quiz` config section (pulse window).
    pub fn with_settings(self, settings: &QuizSection) -> Self {
        self.with_pulse_window(settings.pulse_window())
    }

    /// Restore a selection remembered from an earlier visit to this step.
    /// Counts as this instance's first selection (the advance pulse fires)
    /// but is not reported back to the orchestrator.
    pub fn with_selection(mut self, product_id: &str) -> Result<Self, StepError> {
        let product = self.find(product_id)?;
        self.selected = Some(product.id.clone());
        self.on_first_selection();
        Ok(self)
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn position(&self) -> StepPosition {
        self.position
    }

    /// Lead-in shown next to the recommendations.
    pub fn intro(&self) -> String {
        format!(
            "Here are our top three options for {} products.",
            self.question.category
        )
    }

    pub fn selected(&self) -> Option<&Product> {
        let id = self.selected.as_deref()?;
        self.products.iter().find(|p| p.id == id)
    }

    pub fn has_selected_once(&self) -> bool {
        self.has_selected_once
    }

    pub fn advance_pulse(&self) -> bool {
        self.advance.is_active()
    }

    pub fn retreat_pulse(&self) -> bool {
        self.retreat.is_active()
    }

    pub fn pulse_state(&self, direction: Direction) -> &Pulse {
        match direction {
            Direction::Advance => &self.advance,
            Direction::Retreat => &self.retreat,
        }
    }

    pub fn can_advance(&self) -> bool {
        !self.position.is_last
    }

    pub fn can_retreat(&self) -> bool {
        !self.position.is_first
    }

    /// Toggle `product`: selecting the current selection clears it, selecting
    /// anything else replaces it. Returns the new selection.
    pub fn select_product(&mut self, product: &Product) -> Result<Option<&Product>, StepError> {
        let id = self.find(&product.id)?.id.clone();
        let was_empty = self.selected.is_none();

        if self.selected.as_deref() == Some(id.as_str()) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }

        let current = self.selected().cloned();
        debug!(
            question = %self.question.id,
            selected = ?current.as_ref().map(|p| p.id.as_str()),
            "selection changed"
        );
        if was_empty && current.is_some() {
            self.on_first_selection();
        }
        self.notify(StepEvent::SelectionChanged(current));
        Ok(self.selected())
    }

    /// Flash the control for `direction`.
    pub fn pulse(&mut self, direction: Direction) {
        match direction {
            Direction::Advance => self.advance.trigger(),
            Direction::Retreat => self.retreat.trigger(),
        }
    }

    /// Pointer entered the control for `direction`.
    pub fn hover(&mut self, direction: Direction) {
        self.pulse(direction);
    }

    /// Request the next step. Returns `false` on the last step.
    pub fn next(&self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.notify(StepEvent::Next);
        true
    }

    /// Request the previous step. Returns `false` on the first step.
    pub fn prev(&self) -> bool {
        if !self.can_retreat() {
            return false;
        }
        self.notify(StepEvent::Prev);
        true
    }

    fn on_first_selection(&mut self) {
        if self.has_selected_once {
            return;
        }
        self.has_selected_once = true;
        self.pulse(Direction::Advance);
    }

    fn find(&self, product_id: &str) -> Result<&Product, StepError> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| StepError::UnknownProduct(product_id.to_string()))
    }

    fn notify(&self, event: StepEvent) {
        if self.events.send(event).is_err() {
            debug!(question = %self.question.id, "step event dropped, orchestrator gone");
        }
    }
}
