use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, error, trace, warn};

use super::{FrameLog, LoggedFrame};
use crate::config::stream::KEEPALIVE_CHUNK;
use crate::config::{GameConfig, Preferences};
use crate::error::{Error, Result};
use crate::events::{AudioCue, Cue, EventBus, EventSink, Notifier, Silent};
use crate::model::{FightId, Instance, Timestamp};
use crate::prices::{ingest_artifact_prices, ingest_item_prices};
use crate::protocol::{Envelope, FrameReassembler, MessageKind};
use crate::storage::Repository;
use crate::tracker::{FightContext, FightTracker, InstanceTracker};

/// Frame counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameCounters {
    pub frames: u64,
    pub malformed: u64,
    pub unknown: u64,
    pub dispatched: u64,
    pub faults: u64,
}

/// One capture session: the trackers, their collaborators and the byte stream.
pub struct Session<R: Repository> {
    repo: R,
    config: GameConfig,
    preferences: Preferences,
    fights: FightTracker,
    instances: InstanceTracker,
    events: EventBus,
    audio: Box<dyn AudioCue>,
    reassembler: FrameReassembler,
    frame_log: Option<FrameLog>,
    counters: FrameCounters,
}

impl<R: Repository> Session<R> {
    /// Create a session, resuming the fight and instance left open in `repo`.
    pub fn new(repo: R, config: GameConfig, preferences: Preferences) -> Result<Self> {
        let mut instances = InstanceTracker::new(config.boss_rules());
        instances.load_open(&repo)?;
        let mut fights = FightTracker::new();
        fights.load_open(&repo)?;

        Ok(Self {
            repo,
            config,
            preferences,
            fights,
            instances,
            events: EventBus::new(),
            audio: Box::new(Silent),
            reassembler: FrameReassembler::new(),
            frame_log: None,
            counters: FrameCounters::default(),
        })
    }

    pub fn with_audio(mut self, audio: impl AudioCue + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_reassembler(mut self, reassembler: FrameReassembler) -> Self {
        self.reassembler = reassembler;
        self
    }

    pub fn with_frame_log(mut self, frame_log: FrameLog) -> Self {
        self.frame_log = Some(frame_log);
        self
    }

    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.events.subscribe(sink);
    }

    /// Feed one chunk of stream bytes received at `time`.
    ///
    /// Every completed frame is handled before returning. Returns the number
    /// of frames extracted; a buffer overflow is returned as an error after
    /// the frames completed by the same chunk have been handled.
    ///
    /// A chunk that is exactly `99\0` is always a keep-alive, so a real frame
    /// arriving alone with those bytes is never dispatched.
    pub fn feed(&mut self, chunk: &[u8], time: Timestamp) -> Result<usize> {
        if chunk == KEEPALIVE_CHUNK {
            trace!("Keep-alive chunk skipped");
            return Ok(0);
        }

        let drained = self.reassembler.push(chunk);
        for frame in &drained.frames {
            self.handle_frame(frame, time);
        }
        match drained.overflow {
            Some(e) => Err(e),
            None => Ok(drained.frames.len()),
        }
    }

    /// Decode and dispatch one complete frame. Failures are logged, never returned.
    pub fn handle_frame(&mut self, frame: &[u8], time: Timestamp) {
        self.counters.frames += 1;
        let envelope = match Envelope::parse(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.counters.malformed += 1;
                debug!("Dropping frame: {}", e);
                return;
            }
        };

        if let Some(log) = &self.frame_log
            && let Err(e) = log.append(&envelope, time)
        {
            warn!("Failed to write frame log: {}", e);
        }

        if let Err(e) = self.dispatch(&envelope, time) {
            error!("{} (payload {:?})", e, envelope.payload);
        }
    }

    /// Re-process a frame read back from a frame log at its recorded time.
    pub fn replay(&mut self, frame: &LoggedFrame) {
        self.counters.frames += 1;
        if let Err(e) = self.dispatch(&frame.envelope(), frame.time) {
            error!("{} (payload {:?})", e, frame.payload);
        }
    }

    /// Route an envelope to its handler.
    ///
    /// Unknown prefixes are ignored. A handler error or panic is returned as
    /// [`Error::HandlerFault`]; state changed before the fault is kept.
    pub fn dispatch(&mut self, envelope: &Envelope, time: Timestamp) -> Result<()> {
        let Some(kind) = envelope.kind() else {
            self.counters.unknown += 1;
            trace!("Ignoring prefix {}", envelope.prefix);
            return Ok(());
        };
        self.counters.dispatched += 1;
        trace!("Dispatching {:?} at {}", kind, time);

        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.route(kind, &envelope.payload, time)));
        let message = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        self.counters.faults += 1;
        Err(Error::HandlerFault {
            prefix: envelope.prefix.clone(),
            message,
        })
    }

    fn route(&mut self, kind: MessageKind, payload: &str, time: Timestamp) -> Result<()> {
        let notifier = Notifier::new(
            &self.events,
            self.audio.as_ref(),
            self.preferences.sound_signals(),
        );
        let mut ctx = FightContext {
            repo: &mut self.repo,
            instances: &mut self.instances,
            config: &self.config,
            player_name: self.preferences.player_name(),
            notifier: &notifier,
        };

        match kind {
            MessageKind::Instance => {
                ctx.instances
                    .handle_envelope(payload, time, &mut *ctx.repo, &notifier)
            }
            MessageKind::FightStart => self.fights.start(time, &mut ctx).map(|_| ()),
            MessageKind::FightSummary => self.fights.apply_summary(payload, time, &mut ctx),
            MessageKind::FightEnd => {
                notifier.cue(Cue::Act);
                self.fights.end(time, &mut ctx)
            }
            MessageKind::ActSignal => {
                notifier.cue(Cue::Act);
                Ok(())
            }
            MessageKind::ItemPrices => ingest_item_prices(payload, &mut *ctx.repo).map(|_| ()),
            MessageKind::ArtifactPrices => {
                ingest_artifact_prices(payload, &mut *ctx.repo).map(|_| ())
            }
        }
    }

    /// Drop any partially received frame, e.g. after a reconnect.
    pub fn reset_stream(&mut self) {
        if !self.reassembler.pending().is_empty() {
            debug!("Discarding {} buffered bytes", self.reassembler.pending().len());
        }
        self.reassembler.clear();
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn current_fight(&self) -> Option<FightId> {
        self.fights.current()
    }

    pub fn current_instance(&self) -> Option<&Instance> {
        self.instances.current()
    }

    pub fn counters(&self) -> FrameCounters {
        self.counters
    }

    pub fn into_repo(self) -> R {
        self.repo
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
