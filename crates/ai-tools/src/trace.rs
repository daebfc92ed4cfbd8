#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

/// A small, allocation-friendly trace event.
///
/// This is "dumb data" so it can be recorded during simulation and later rendered by tooling
/// (HUD overlays, replay inspectors). `a`/`b` are tag-specific payloads; see [`tags`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub agent: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, agent: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            agent,
            tag: tag.into(),
            a: 0,
            b: 0,
        }
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] agent={} {} a={} b={}",
            self.tick, self.agent, self.tag, self.a, self.b
        )
    }
}

/// Tags emitted by the decision engine.
pub mod tags {
    /// `a` = index of the behavior in its list, `b` = 1 when preemptive.
    pub const BEHAVIOR_SELECT: &str = "behavior.select";
    pub const BEHAVIOR_CANCEL: &str = "behavior.cancel";
    /// `a` = task index.
    pub const TASK_SUCCESS: &str = "task.success";
    /// `a` = task index, `b` = task index after the failure policy.
    pub const TASK_FAILURE: &str = "task.failure";
    pub const LOCOMOTOR_SET: &str = "locomotor.set";
    pub const LOCOMOTOR_FINISH: &str = "locomotor.finish";
    /// `a` = units spawned.
    pub const SQUAD_SPAWN: &str = "squad.spawn";
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// In-memory log keeping at most `capacity` most recent events (unbounded when zero).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: VecDeque<TraceEvent>,
    pub capacity: usize,
}

impl TraceLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: TraceEvent) {
        if self.capacity > 0 && self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn last(&self) -> Option<&TraceEvent> {
        self.events.back()
    }

    pub fn iter_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for TraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Optional log plus optional streaming sink, owned by whatever emits events.
#[derive(Default)]
pub struct Tracer {
    pub log: Option<TraceLog>,
    pub sink: Option<Box<dyn TraceSink>>,
}

impl Tracer {
    pub fn with_log(capacity: usize) -> Self {
        Self {
            log: Some(TraceLog::with_capacity(capacity)),
            sink: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.log.is_some() || self.sink.is_some()
    }

    pub fn emit(&mut self, event: TraceEvent) {
        match (&mut self.log, &mut self.sink) {
            (Some(log), Some(sink)) => {
                log.push(event.clone());
                sink.emit(event);
            }
            (Some(log), None) => log.push(event),
            (None, Some(sink)) => sink.emit(event),
            (None, None) => {}
        }
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("log", &self.log)
            .field("sink", &self.sink.as_ref().map(|_| "dyn TraceSink"))
            .finish()
    }
}
