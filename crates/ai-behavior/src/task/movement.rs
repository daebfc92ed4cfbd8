use ai_core::AgentId;

use super::TaskStatus;
use crate::{AiController, Locomotor};

pub(super) fn set_locomotor<A: AgentId>(
    ai: &mut AiController<A>,
    locomotor: &Locomotor,
) -> TaskStatus {
    ai.set_locomotor(locomotor.clone());
    TaskStatus::Success
}

pub(super) fn wait_for_locomotor<A: AgentId>(ai: &mut AiController<A>) -> TaskStatus {
    if ai.locomotor().is_none() {
        TaskStatus::Success
    } else {
        TaskStatus::Continue
    }
}

pub(super) fn stop_locomotor<A: AgentId>(ai: &mut AiController<A>) -> TaskStatus {
    ai.interrupt_locomotion();
    TaskStatus::Success
}
