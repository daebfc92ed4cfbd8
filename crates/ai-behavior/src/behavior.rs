use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Perception, Senses, Task};

/// What happens to a behavior when one of its tasks fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TaskFailurePolicy {
    /// Start over from the first task.
    RestartBehavior,
    /// Drop the behavior; selection picks a new one next tick.
    #[default]
    CancelBehavior,
    /// Run the same task again.
    RetryTask,
    /// Carry on with the next task.
    Ignore,
}

/// An ordered list of tasks plus the conditions under which it may start.
///
/// Behaviors are authored once and shared (`Arc`) by every actor that uses them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Behavior {
    pub name: String,
    pub tasks: Vec<Task>,
    /// All of these must be sensed.
    pub requisite_senses: Senses,
    /// None of these may be sensed.
    pub requisite_not_senses: Senses,
    /// Probability that a qualifying preemptive behavior is actually picked.
    pub queue_chance: f32,
    pub on_task_failure: TaskFailurePolicy,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            name: String::new(),
            tasks: Vec::new(),
            requisite_senses: Senses::empty(),
            requisite_not_senses: Senses::empty(),
            queue_chance: 1.0,
            on_task_failure: TaskFailurePolicy::default(),
        }
    }
}

impl Behavior {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            name: name.into(),
            tasks,
            ..Self::default()
        }
    }

    pub fn requires(mut self, senses: Senses) -> Self {
        self.requisite_senses |= senses;
        self
    }

    pub fn forbids(mut self, senses: Senses) -> Self {
        self.requisite_not_senses |= senses;
        self
    }

    pub fn with_queue_chance(mut self, chance: f32) -> Self {
        self.queue_chance = chance;
        self
    }

    pub fn on_task_failure(mut self, policy: TaskFailurePolicy) -> Self {
        self.on_task_failure = policy;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The senses that must be evaluated to decide [`Behavior::qualifies`].
    pub fn sense_mask(&self) -> Senses {
        self.requisite_senses | self.requisite_not_senses
    }

    pub fn qualifies(&self, senses: Senses) -> bool {
        senses.contains(self.requisite_senses) && !senses.intersects(self.requisite_not_senses)
    }
}

/// Shared AI definition of an actor class.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiProfile {
    pub name: String,
    /// Sampled on a timer; may interrupt whatever is running.
    pub preemptive: Vec<Arc<Behavior>>,
    /// Considered when idle; the last qualifying entry wins.
    pub defaults: Vec<Arc<Behavior>>,
    pub perception: Perception,
    #[cfg_attr(feature = "serde", serde(with = "ai_core::time::serde_secs"))]
    pub preempt_interval: Duration,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            preemptive: Vec::new(),
            defaults: Vec::new(),
            perception: Perception::default(),
            preempt_interval: DEFAULT_PREEMPT_INTERVAL,
        }
    }
}

pub const DEFAULT_PREEMPT_INTERVAL: Duration = Duration::from_millis(200);

impl AiProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_preemptive(mut self, behavior: Arc<Behavior>) -> Self {
        self.preemptive.push(behavior);
        self
    }

    pub fn with_default(mut self, behavior: Arc<Behavior>) -> Self {
        self.defaults.push(behavior);
        self
    }

    pub fn with_perception(mut self, perception: Perception) -> Self {
        self.perception = perception;
        self
    }
}
