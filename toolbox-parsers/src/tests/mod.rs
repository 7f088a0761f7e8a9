//! Shared helpers for the parser test suites.

use std::collections::{BTreeMap, HashMap};

use toolbox_types::{EventKind, EventMode, ParserEvent, ToolUse};


pub fn assert_text_create(event: &ParserEvent) -> String {
    assert_eq!(event.kind, EventKind::Text);
    assert_eq!(event.mode, EventMode::Create);
    assert!(!event.is_tool_call);
    event.id.clone()
}

pub fn assert_text_append(event: &ParserEvent, id: &str, content: &str) {
    assert_eq!(event.kind, EventKind::Text);
    assert_eq!(event.mode, EventMode::Append);
    assert_eq!(event.id, id);
    assert_eq!(event.content.as_deref(), Some(content));
}

pub fn assert_text_close(event: &ParserEvent, id: &str) {
    assert_eq!(event.kind, EventKind::Text);
    assert_eq!(event.mode, EventMode::Close);
    assert_eq!(event.id, id);
}

pub fn assert_tool_create(event: &ParserEvent, name: &str) -> String {
    assert_eq!(event.kind, EventKind::Tool);
    assert_eq!(event.mode, EventMode::Create);
    assert!(event.is_tool_call);
    assert_eq!(event.content.as_deref(), Some(name));
    event.id.clone()
}

pub fn assert_tool_append(event: &ParserEvent, id: &str, arg: &str, content: &str) {
    assert_eq!(event.kind, EventKind::Tool);
    assert_eq!(event.mode, EventMode::Append);
    assert_eq!(event.id, id);
    assert_eq!(event.arg.as_deref(), Some(arg));
    assert_eq!(event.content.as_deref(), Some(content));
}

pub fn assert_tool_content(event: &ParserEvent, id: &str, content: &str) {
    assert_eq!(event.kind, EventKind::Tool);
    assert_eq!(event.mode, EventMode::Append);
    assert_eq!(event.id, id);
    assert_eq!(event.arg, None, "whole-tag content carries no argument name");
    assert_eq!(event.content.as_deref(), Some(content));
}

pub fn assert_tool_close(event: &ParserEvent, id: &str) -> Option<ToolUse> {
    assert_eq!(event.kind, EventKind::Tool);
    assert_eq!(event.mode, EventMode::Close);
    assert_eq!(event.id, id);
    event.tool.clone()
}

/// Every id must see exactly one create, then appends, then exactly one
/// close, in that order.
pub fn assert_block_pairing(events: &[ParserEvent]) {
    #[derive(PartialEq)]
    enum Phase {
        Open,
        Closed,
    }
    let mut blocks: HashMap<String, Phase> = HashMap::new();
    for event in events {
        match event.mode {
            EventMode::Create => {
                let prev = blocks.insert(event.id.clone(), Phase::Open);
                assert!(prev.is_none(), "duplicate create for id {}", event.id);
            }
            EventMode::Append => {
                assert!(
                    matches!(blocks.get(&event.id), Some(Phase::Open)),
                    "append outside create/close for id {}",
                    event.id
                );
            }
            EventMode::Close => {
                let prev = blocks.insert(event.id.clone(), Phase::Closed);
                assert!(
                    matches!(prev, Some(Phase::Open)),
                    "close without open block for id {}",
                    event.id
                );
            }
        }
    }
    for (id, phase) in &blocks {
        assert!(*phase == Phase::Closed, "block {} never closed", id);
    }
}

/// Concatenated content of all text appends, in order.
pub fn text_content(events: &[ParserEvent]) -> String {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Text && e.mode == EventMode::Append)
        .filter_map(|e| e.content.as_deref())
        .collect()
}

/// The `ToolUse` carried by each tool close, in order.
pub fn tool_uses(events: &[ParserEvent]) -> Vec<ToolUse> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Tool && e.mode == EventMode::Close)
        .filter_map(|e| e.tool.clone())
        .collect()
}

pub fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
