//! Scene queue / typewriter
//!
//! The chat backend answers every user message with zero or more scenes.
//! They are played back one at a time:
//!   - the current scene's primary text is typed out one character per tick
//!   - a click while typing completes the text at once
//!   - a click once the text is complete shows the next queued scene
//!
//! States: Empty → Revealing → Settled → Revealing | Empty

use std::collections::VecDeque;
use std::rc::Rc;

use novella_common::{RevealConfig, Scene};

use crate::engine::timer::StepTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// No current scene
    Empty,
    /// Typewriter running
    Revealing,
    /// Full text shown, waiting for the user
    Settled,
}

/// Events emitted by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A new scene became current (drives emotion, audio, background)
    CurrentChanged(Rc<Scene>),
    /// The current scene's text is fully shown
    RevealCompleted,
    /// The current scene settled and nothing is queued behind it
    QueueDrained,
    /// Current scene removed (reset or new exchange)
    Cleared,
}

/// `text[0..chars]` counted in characters, never splitting a code point
fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

pub struct SceneOrchestrator {
    queue: VecDeque<Rc<Scene>>,
    current: Option<Rc<Scene>>,
    state: RevealState,
    timer: StepTimer,
    /// Characters of the primary text shown so far
    revealed: usize,
    /// Character count of the primary text
    total: usize,
    displayed: String,
    awaiting_response: bool,
    config: RevealConfig,
    events: Vec<SceneEvent>,
}

impl SceneOrchestrator {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            state: RevealState::Empty,
            timer: StepTimer::idle(),
            revealed: 0,
            total: 0,
            displayed: String::new(),
            awaiting_response: false,
            config,
            events: Vec::new(),
        }
    }

    /// Append a batch in delivery order. Shows the head right away if
    /// nothing is current.
    pub fn enqueue<I>(&mut self, scenes: I)
    where
        I: IntoIterator<Item = Scene>,
    {
        let before = self.queue.len();
        self.queue.extend(scenes.into_iter().map(Rc::new));
        self.awaiting_response = false;
        tracing::debug!(
            "Enqueued {} scene(s), {} pending",
            self.queue.len() - before,
            self.queue.len()
        );
        if self.state == RevealState::Empty {
            self.show_next();
        }
    }

    /// The backend failed: one synthetic SAD scene carrying the retry hint
    pub fn enqueue_failure(&mut self, retry_hint: &str) {
        tracing::warn!("Scene request failed, showing retry hint");
        self.enqueue(std::iter::once(Scene::connection_error(retry_hint)));
    }

    /// User click / key. Returns false when there was nothing to do.
    pub fn request_advance(&mut self) -> bool {
        match self.state {
            RevealState::Empty => false,
            RevealState::Revealing => {
                self.settle();
                true
            }
            RevealState::Settled => self.show_next(),
        }
    }

    /// Wipe queue and current scene
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.queue.clear();
        self.clear_current();
        self.awaiting_response = false;
        tracing::debug!("Scene queue reset");
    }

    /// The user sent a message: drop the current scene and wait for the
    /// reply. Refused while scenes are still queued or a reply is pending.
    pub fn begin_exchange(&mut self) -> bool {
        if self.awaiting_response {
            tracing::debug!("Exchange refused, reply still pending");
            return false;
        }
        if !self.queue.is_empty() {
            tracing::debug!("Exchange refused, {} scene(s) still queued", self.queue.len());
            return false;
        }
        self.clear_current();
        self.awaiting_response = true;
        true
    }

    /// Show `scene` fully revealed without touching the queue (rejoining a room)
    pub fn restore(&mut self, scene: Scene) {
        self.timer.cancel();
        let scene = Rc::new(scene);
        self.total = scene.primary_text().chars().count();
        self.revealed = self.total;
        self.displayed = scene.primary_text().to_string();
        self.current = Some(scene.clone());
        self.state = RevealState::Settled;
        self.events.push(SceneEvent::CurrentChanged(scene));
        self.events.push(SceneEvent::RevealCompleted);
    }

    /// Advance the typewriter (call every frame)
    pub fn update(&mut self, dt_ms: u32) -> Vec<SceneEvent> {
        if self.state == RevealState::Revealing {
            let fired = self.timer.advance(dt_ms) as usize;
            if fired > 0 {
                self.revealed = (self.revealed + fired).min(self.total);
                if self.revealed >= self.total {
                    self.settle();
                } else if let Some(scene) = &self.current {
                    self.displayed = char_prefix(scene.primary_text(), self.revealed).to_string();
                }
            }
        }
        self.take_events()
    }

    /// Events raised by operations since the last call
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    fn show_next(&mut self) -> bool {
        let Some(next) = self.queue.pop_front() else {
            return false;
        };
        self.timer.cancel();

        self.total = next.primary_text().chars().count();
        self.revealed = 0;
        self.displayed.clear();
        self.current = Some(next.clone());
        self.events.push(SceneEvent::CurrentChanged(next.clone()));

        if self.total == 0 {
            self.settle();
        } else {
            let interval = if next.is_event {
                self.config.narration_interval_ms
            } else {
                self.config.dialogue_interval_ms
            };
            self.timer = StepTimer::counted(interval, self.total as u32);
            self.state = RevealState::Revealing;
            tracing::debug!(
                "Revealing {} chars at {}ms ({} queued)",
                self.total,
                interval,
                self.queue.len()
            );
        }
        true
    }

    fn settle(&mut self) {
        self.timer.cancel();
        self.revealed = self.total;
        if let Some(scene) = &self.current {
            self.displayed = scene.primary_text().to_string();
        }
        self.state = RevealState::Settled;
        self.events.push(SceneEvent::RevealCompleted);
        if self.queue.is_empty() {
            self.events.push(SceneEvent::QueueDrained);
        }
    }

    fn clear_current(&mut self) {
        self.timer.cancel();
        let had_scene = self.current.take().is_some();
        self.state = RevealState::Empty;
        self.revealed = 0;
        self.total = 0;
        self.displayed.clear();
        if had_scene {
            self.events.push(SceneEvent::Cleared);
        }
    }

    pub fn current(&self) -> Option<&Rc<Scene>> {
        self.current.as_ref()
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Typed part of the primary text
    pub fn displayed_text(&self) -> &str {
        &self.displayed
    }

    /// Narration shown next to dialogue, untyped
    pub fn annotation(&self) -> Option<&str> {
        self.current.as_ref().and_then(|s| s.annotation())
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Typing indicator: a message was sent and no reply arrived yet
    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novella_common::EmotionTag;

    fn line(text: &str) -> Scene {
        Scene::new(text, "", EmotionTag::Neutral)
    }

    fn orchestrator() -> SceneOrchestrator {
        SceneOrchestrator::new(RevealConfig::default())
    }

    #[test]
    fn scenes_play_in_enqueue_order() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("one"), line("two")]);
        orc.enqueue(vec![line("three")]);

        let mut seen = Vec::new();
        loop {
            seen.push(orc.current().unwrap().dialogue.clone());
            orc.request_advance(); // complete
            if !orc.request_advance() {
                break;
            }
        }
        assert_eq!(seen, vec!["one", "two", "three"]);
        assert_eq!(orc.queue_len(), 0);
    }

    #[test]
    fn advance_while_revealing_completes_without_popping() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("Hello there"), line("next")]);
        orc.update(60);
        assert_eq!(orc.displayed_text(), "He");

        assert!(orc.request_advance());
        assert_eq!(orc.displayed_text(), "Hello there");
        assert_eq!(orc.state(), RevealState::Settled);
        assert_eq!(orc.current().unwrap().dialogue, "Hello there");
        assert_eq!(orc.queue_len(), 1);
    }

    #[test]
    fn advance_when_settled_and_drained_is_noop() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("only")]);
        orc.request_advance();
        orc.take_events();

        assert!(!orc.request_advance());
        assert_eq!(orc.current().unwrap().dialogue, "only");
        assert_eq!(orc.state(), RevealState::Settled);
        assert!(orc.take_events().is_empty());
    }

    #[test]
    fn reveal_is_character_based() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("안녕하세요")]);
        orc.take_events();

        orc.update(60);
        assert_eq!(orc.displayed_text(), "안녕");
        let events = orc.update(90);
        assert_eq!(orc.displayed_text(), "안녕하세요");
        assert_eq!(events, vec![SceneEvent::RevealCompleted, SceneEvent::QueueDrained]);
    }

    #[test]
    fn event_narration_types_slower() {
        let mut orc = orchestrator();
        orc.enqueue(vec![Scene::event("The door creaks.", EmotionTag::Frightened)]);
        orc.update(100);
        assert_eq!(orc.displayed_text(), "Th");
        assert_eq!(orc.annotation(), None);
    }

    #[test]
    fn narration_is_shown_immediately_as_annotation() {
        let mut orc = orchestrator();
        orc.enqueue(vec![Scene::new("Hi!", "(waves)", EmotionTag::Joy)]);
        assert_eq!(orc.displayed_text(), "");
        assert_eq!(orc.annotation(), Some("(waves)"));
        assert_eq!(orc.current().unwrap().emotion, EmotionTag::Joy);
    }

    #[test]
    fn blank_scene_settles_immediately() {
        let mut orc = orchestrator();
        orc.enqueue(vec![Scene::default()]);
        assert_eq!(orc.state(), RevealState::Settled);
        let events = orc.take_events();
        assert!(matches!(events[0], SceneEvent::CurrentChanged(_)));
        assert_eq!(events[1], SceneEvent::RevealCompleted);
    }

    #[test]
    fn scene_change_cancels_previous_reveal() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("abcdef"), line("xyz")]);
        orc.update(60);
        orc.request_advance();
        orc.request_advance();
        assert_eq!(orc.current().unwrap().dialogue, "xyz");
        assert_eq!(orc.displayed_text(), "");

        orc.update(30);
        assert_eq!(orc.displayed_text(), "x");
    }

    #[test]
    fn enqueue_while_settled_waits_for_click() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("a")]);
        orc.update(30);
        orc.enqueue(vec![line("b")]);
        assert_eq!(orc.current().unwrap().dialogue, "a");
        assert_eq!(orc.queue_len(), 1);
    }

    #[test]
    fn exchange_clears_current_and_waits() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("a")]);
        orc.request_advance();
        orc.take_events();

        assert!(orc.begin_exchange());
        assert!(orc.current().is_none());
        assert!(orc.awaiting_response());
        assert_eq!(orc.take_events(), vec![SceneEvent::Cleared]);

        orc.enqueue(vec![line("reply")]);
        assert!(!orc.awaiting_response());
        assert_eq!(orc.state(), RevealState::Revealing);
    }

    #[test]
    fn exchange_refused_while_queued() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("a"), line("b")]);
        assert!(!orc.begin_exchange());
        assert_eq!(orc.current().unwrap().dialogue, "a");
    }

    #[test]
    fn exchange_refused_while_reply_pending() {
        let mut orc = orchestrator();
        assert!(orc.begin_exchange());
        assert!(!orc.begin_exchange());
        assert!(orc.awaiting_response());

        orc.enqueue_failure("Try again.");
        orc.request_advance();
        assert!(orc.begin_exchange());
    }

    #[test]
    fn failure_becomes_single_sad_scene() {
        let mut orc = orchestrator();
        orc.begin_exchange();
        orc.enqueue_failure("Connection lost. Try again.");
        let scene = orc.current().unwrap();
        assert_eq!(scene.emotion, EmotionTag::Sad);
        assert_eq!(orc.annotation(), Some("Connection lost. Try again."));
        assert!(!orc.awaiting_response());
        assert_eq!(orc.queue_len(), 0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut orc = orchestrator();
        orc.enqueue(vec![line("a"), line("b")]);
        orc.take_events();
        orc.reset();
        assert!(orc.current().is_none());
        assert_eq!(orc.queue_len(), 0);
        assert_eq!(orc.state(), RevealState::Empty);
        assert_eq!(orc.take_events(), vec![SceneEvent::Cleared]);
        assert!(orc.update(1000).is_empty());
    }

    #[test]
    fn restore_shows_scene_fully() {
        let mut orc = orchestrator();
        orc.restore(Scene::new("Welcome back.", "", EmotionTag::Relax));
        assert_eq!(orc.state(), RevealState::Settled);
        assert_eq!(orc.displayed_text(), "Welcome back.");
        assert_eq!(orc.queue_len(), 0);
        assert!(!orc.request_advance());
    }
}
