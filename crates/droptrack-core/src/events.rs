//! Lifecycle notifications and audio cues published by the session.
//!
//! The session never depends on a presentation layer: it pushes
//! [`LifecycleEvent`]s to every registered [`EventSink`] and fires
//! [`Cue`]s at an [`AudioCue`] trigger, ignoring any failure.

use std::io::Write;
use std::sync::mpsc::Sender;

use serde::Serialize;
use tracing::trace;

use crate::model::{FightId, InstanceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LifecycleEvent {
    FightStarted { fight_id: FightId },
    FightSummaryApplied { fight_id: FightId },
    FightEnded { fight_id: FightId },
    InstanceStarted { instance_id: InstanceId, name: String },
    InstanceEnded { instance_id: InstanceId },
    PlayerDied { fight_id: FightId },
}

/// Receiver of lifecycle notifications.
pub trait EventSink: Send {
    fn publish(&self, event: &LifecycleEvent);
}

impl EventSink for Sender<LifecycleEvent> {
    fn publish(&self, event: &LifecycleEvent) {
        // A dropped receiver only means nobody is listening anymore
        let _ = self.send(event.clone());
    }
}

/// Adapter turning a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: Fn(&LifecycleEvent) + Send,
{
    fn publish(&self, event: &LifecycleEvent) {
        (self.0)(event)
    }
}

/// Observer list the session publishes to.
#[derive(Default)]
pub struct EventBus {
    sinks: Vec<Box<dyn EventSink>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn publish(&self, event: LifecycleEvent) {
        trace!("Publishing {:?}", event);
        for sink in &self.sinks {
            sink.publish(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Act signal and fight end.
    Act,
    InstanceEnded,
}

/// Fire-and-forget sound trigger.
pub trait AudioCue: Send {
    fn play(&self, cue: Cue);
}

/// Audio trigger that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioCue for Silent {
    fn play(&self, _cue: Cue) {}
}

/// Rings the terminal bell on stderr (twice for an instance end).
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AudioCue for TerminalBell {
    fn play(&self, cue: Cue) {
        let bell: &[u8] = match cue {
            Cue::Act => b"\x07",
            Cue::InstanceEnded => b"\x07\x07",
        };
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(bell).and_then(|_| stderr.flush());
    }
}

/// Outputs borrowed by the trackers while one frame is handled.
pub struct Notifier<'a> {
    events: &'a EventBus,
    audio: &'a dyn AudioCue,
    sound: bool,
}

impl<'a> Notifier<'a> {
    pub fn new(events: &'a EventBus, audio: &'a dyn AudioCue, sound: bool) -> Self {
        Self {
            events,
            audio,
            sound,
        }
    }

    pub fn publish(&self, event: LifecycleEvent) {
        self.events.publish(event);
    }

    /// Play a cue when sound signals are enabled.
    pub fn cue(&self, cue: Cue) {
        if self.sound {
            self.audio.play(cue);
        }
    }
}
