//! The per-actor AI state machine.

use std::sync::Arc;
use std::time::Duration;

use ai_core::rng::{streams, DeterministicRng};
use ai_core::{AgentId, Deadline, TickContext};
use ai_tools::{tags, TraceEvent, TraceLog, TraceSink, Tracer};

use crate::cursor::{CursorStep, TaskCursor};
use crate::senses::{self, SenseMemory, SenseProbe};
use crate::{
    AgentWorld, AiProfile, Behavior, Locomotor, LocomotorScratch, LocomotorStatus, Senses, Task,
    TaskScratch, TaskStatus,
};

/// Drives one actor: behavior selection, task sequencing and locomotion.
///
/// The controller holds only handles into the world. Hosts call [`AiController::think`] once
/// per tick, with the controller taken out of their storage for the duration of the call.
#[derive(Debug)]
pub struct AiController<A> {
    agent: A,
    profile: Arc<AiProfile>,
    behavior: Option<Arc<Behavior>>,
    cursor: TaskCursor,
    scratch: TaskScratch,
    target: Option<A>,
    locomotor: Option<Locomotor>,
    locomotor_scratch: LocomotorScratch,
    known_senses: Senses,
    sense_memory: SenseMemory<A>,
    next_preempt: Deadline,
    tick: u64,
    tracer: Tracer,
}

impl<A: AgentId> AiController<A> {
    pub fn new(agent: A, profile: Arc<AiProfile>) -> Self {
        Self {
            agent,
            profile,
            behavior: None,
            cursor: TaskCursor::default(),
            scratch: TaskScratch::default(),
            target: None,
            locomotor: None,
            locomotor_scratch: LocomotorScratch::default(),
            known_senses: Senses::empty(),
            sense_memory: SenseMemory::default(),
            next_preempt: Deadline::default(),
            tick: 0,
            tracer: Tracer::default(),
        }
    }

    /// Records trace events into a bounded in-memory log.
    pub fn with_trace_log(mut self, capacity: usize) -> Self {
        self.tracer = Tracer::with_log(capacity);
        self
    }

    /// Streams trace events to `sink` in addition to any log.
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.tracer.sink = Some(sink);
        self
    }

    /// A fresh controller for a copy of this actor: same profile, no running state.
    pub fn fork(&self, agent: A) -> Self {
        let mut forked = Self::new(agent, Arc::clone(&self.profile));
        if let Some(log) = &self.tracer.log {
            forked.tracer = Tracer::with_log(log.capacity);
        }
        forked
    }

    pub fn agent(&self) -> A {
        self.agent
    }

    pub fn profile(&self) -> &Arc<AiProfile> {
        &self.profile
    }

    pub fn target(&self) -> Option<A> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<A>) {
        self.target = target;
    }

    pub fn behavior(&self) -> Option<&Arc<Behavior>> {
        self.behavior.as_ref()
    }

    pub fn current_behavior_name(&self) -> Option<&str> {
        self.behavior.as_deref().map(|b| b.name.as_str())
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.behavior
            .as_deref()
            .and_then(|b| b.tasks.get(self.cursor.index))
    }

    pub fn task_index(&self) -> usize {
        self.cursor.index
    }

    /// The senses computed by the most recent evaluation.
    pub fn known_senses(&self) -> Senses {
        self.known_senses
    }

    pub fn locomotor(&self) -> Option<&Locomotor> {
        self.locomotor.as_ref()
    }

    /// Replaces the active locomotor outright.
    pub fn set_locomotor(&mut self, locomotor: Locomotor) {
        tracing::trace!(
            agent = self.agent.stable_id(),
            locomotor = locomotor.name(),
            "locomotor set"
        );
        self.locomotor = Some(locomotor);
        self.locomotor_scratch = LocomotorScratch::default();
        self.emit(tags::LOCOMOTOR_SET, 0);
    }

    pub fn interrupt_locomotion(&mut self) {
        self.locomotor = None;
        self.locomotor_scratch = LocomotorScratch::default();
    }

    /// Starts `behavior` from its first task, or clears the current one for `None`.
    pub fn set_behavior(&mut self, ctx: &TickContext, behavior: Option<Arc<Behavior>>) {
        let Some(behavior) = behavior else {
            self.cancel_behavior(ctx);
            return;
        };
        self.tick = ctx.tick;
        tracing::debug!(
            agent = self.agent.stable_id(),
            behavior = %behavior.name,
            "behavior selected"
        );
        self.emit(tags::BEHAVIOR_SELECT, behavior.tasks.len() as u64);
        self.behavior = Some(behavior);
        self.reset_task(ctx.elapsed);
    }

    /// Drops the current behavior. Does nothing when idle.
    pub fn cancel_behavior(&mut self, ctx: &TickContext) {
        self.tick = ctx.tick;
        let Some(behavior) = self.behavior.take() else {
            return;
        };
        tracing::debug!(
            agent = self.agent.stable_id(),
            behavior = %behavior.name,
            "behavior cancelled"
        );
        self.emit(tags::BEHAVIOR_CANCEL, self.cursor.index as u64);
        self.reset_task(ctx.elapsed);
    }

    pub fn trace(&self) -> Option<&TraceLog> {
        self.tracer.log.as_ref()
    }

    /// One-line status for debug overlays.
    pub fn hud_line(&self) -> String {
        let behavior = self.current_behavior_name().unwrap_or("-");
        let task = self.current_task().map_or("-", Task::name);
        let locomotor = self.locomotor.as_ref().map_or("-", Locomotor::name);
        let target = self
            .target
            .map_or_else(|| "-".to_owned(), |t| t.stable_id().to_string());
        format!(
            "agent={} behavior={} task={}#{} locomotor={} target={} senses={:#x}",
            self.agent.stable_id(),
            behavior,
            task,
            self.cursor.index,
            locomotor,
            target,
            self.known_senses.bits()
        )
    }

    /// Advances the actor by one tick.
    pub fn think<W: AgentWorld<Agent = A>>(&mut self, ctx: &TickContext, world: &mut W) {
        if !ctx.simulation_enabled || !world.exists(self.agent) {
            return;
        }
        self.tick = ctx.tick;
        if self.target.is_some() && world.resolve(self.target).is_none() {
            self.target = None;
        }

        if self.next_preempt.is_reached(ctx.elapsed) {
            self.next_preempt = Deadline::after(ctx.elapsed, self.profile.preempt_interval);
            self.try_preempt(ctx, world);
        }
        if self.behavior.is_none() {
            self.select_default(ctx, world);
        }

        self.run_task(ctx, world);
        self.step_locomotor(ctx, world);
    }

    fn sense<W: AgentWorld<Agent = A>>(&mut self, requested: Senses, world: &W) -> Senses {
        let probe = SenseProbe {
            agent: self.agent,
            target: self.target,
            has_locomotor: self.locomotor.is_some(),
            perception: self.profile.perception,
        };
        let senses = senses::evaluate(requested, &probe, &mut self.sense_memory, world);
        self.known_senses = senses;
        senses
    }

    fn try_preempt<W: AgentWorld<Agent = A>>(&mut self, ctx: &TickContext, world: &W) {
        let candidates = &self.profile.preemptive;
        if candidates.is_empty() {
            return;
        }
        let mut rng = ctx.rng_for_agent(self.agent, streams::PREEMPT);
        let candidate = Arc::clone(&candidates[rng.next_index(candidates.len())]);
        if self.behavior.as_ref().is_some_and(|b| Arc::ptr_eq(b, &candidate)) {
            return;
        }

        let senses = self.sense(candidate.sense_mask(), world);
        if candidate.qualifies(senses) && rng.chance(candidate.queue_chance) {
            self.set_behavior(ctx, Some(candidate));
        }
    }

    fn select_default<W: AgentWorld<Agent = A>>(&mut self, ctx: &TickContext, world: &W) {
        let profile = Arc::clone(&self.profile);
        if profile.defaults.is_empty() {
            return;
        }
        let mask = profile
            .defaults
            .iter()
            .fold(Senses::empty(), |mask, b| mask | b.sense_mask());
        let senses = self.sense(mask, world);
        let chosen = profile.defaults.iter().rev().find(|b| b.qualifies(senses));
        if let Some(behavior) = chosen {
            self.set_behavior(ctx, Some(Arc::clone(behavior)));
        }
    }

    fn run_task<W: AgentWorld<Agent = A>>(&mut self, ctx: &TickContext, world: &mut W) {
        let Some(behavior) = self.behavior.clone() else {
            return;
        };
        if self.cursor.is_finished(behavior.tasks.len()) {
            self.finish_behavior(ctx);
            return;
        }

        let task = &behavior.tasks[self.cursor.index];
        let status = task.think(ctx, self, world);

        // The task may have replaced or cleared our behavior.
        if !self
            .behavior
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &behavior))
        {
            return;
        }

        match status {
            TaskStatus::Continue => return,
            TaskStatus::Success => {
                tracing::trace!(
                    agent = self.agent.stable_id(),
                    task = task.name(),
                    "task succeeded"
                );
                self.emit(tags::TASK_SUCCESS, self.cursor.index as u64);
            }
            TaskStatus::Failure => {
                tracing::trace!(
                    agent = self.agent.stable_id(),
                    task = task.name(),
                    "task failed"
                );
                self.emit(tags::TASK_FAILURE, self.cursor.index as u64);
            }
        }

        self.scratch = TaskScratch::default();
        match self
            .cursor
            .apply(status, behavior.on_task_failure, ctx.elapsed)
        {
            CursorStep::Cancel => self.cancel_behavior(ctx),
            CursorStep::Moved if self.cursor.is_finished(behavior.tasks.len()) => {
                self.finish_behavior(ctx)
            }
            CursorStep::Moved | CursorStep::Stay => {}
        }
    }

    fn finish_behavior(&mut self, ctx: &TickContext) {
        if let Some(behavior) = self.behavior.take() {
            tracing::debug!(
                agent = self.agent.stable_id(),
                behavior = %behavior.name,
                "behavior completed"
            );
        }
        self.reset_task(ctx.elapsed);
    }

    fn step_locomotor<W: AgentWorld<Agent = A>>(&mut self, ctx: &TickContext, world: &mut W) {
        let Some(locomotor) = &self.locomotor else {
            return;
        };
        let status = locomotor.step(
            ctx,
            self.agent,
            self.target,
            &mut self.locomotor_scratch,
            world,
        );
        if status == LocomotorStatus::Finished {
            tracing::trace!(
                agent = self.agent.stable_id(),
                locomotor = locomotor.name(),
                "locomotor finished"
            );
            self.interrupt_locomotion();
            self.emit(tags::LOCOMOTOR_FINISH, 0);
        }
    }

    fn reset_task(&mut self, now: Duration) {
        self.cursor = TaskCursor::new(now);
        self.scratch = TaskScratch::default();
    }

    fn emit(&mut self, tag: &'static str, a: u64) {
        if self.tracer.is_enabled() {
            let event = TraceEvent::new(self.tick, self.agent.stable_id(), tag).with_a(a);
            self.tracer.emit(event);
        }
    }

    pub(crate) fn task_started_at(&self) -> Duration {
        self.cursor.started_at
    }

    pub(crate) fn task_state(&self) -> i32 {
        self.cursor.state
    }

    pub(crate) fn set_task_state(&mut self, state: i32) {
        self.cursor.state = state;
    }

    pub(crate) fn scratch_mut(&mut self) -> &mut TaskScratch {
        &mut self.scratch
    }
}
