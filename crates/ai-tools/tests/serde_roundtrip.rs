#![cfg(feature = "serde")]

use ai_tools::{tags, TraceEvent, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let mut log = TraceLog::with_capacity(8);
    log.push(TraceEvent::new(1, 7, tags::BEHAVIOR_SELECT).with_a(2).with_b(1));
    log.push(TraceEvent::new(2, 7, tags::TASK_SUCCESS).with_a(0));
    log.push(TraceEvent::new(3, 9, tags::SQUAD_SPAWN).with_a(4));

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
