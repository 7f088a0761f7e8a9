//! Flat single-tag variant: a closed set of non-nested tags, whole-tag
//! content only.

use toolbox_types::{ParserEvent, ToolUse};
use uuid::Uuid;

/// Recognizes a fixed set of tags (e.g. `<think>...</think>`) in a
/// complete buffer. Content between a recognized open tag and its close
/// tag (or end of input if unclosed) is captured in one shot with no
/// argument sub-parsing; unrecognized tags pass through as literal text.
pub struct FlatXmlParser {
    tags: Vec<String>,
}

impl FlatXmlParser {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the whole input, producing create/append/close triples. Tag
    /// blocks carry the tag name as `ToolUse::name` with an empty args
    /// map.
    pub fn parse(&self, text: &str) -> Vec<ParserEvent> {
        let mut events = Vec::new();
        let mut i = 0;

        while i < text.len() {
            // Earliest recognized open tag wins, wherever it sits in the
            // remaining buffer.
            let mut next: Option<(usize, &str)> = None;
            for tag in &self.tags {
                let open = format!("<{tag}>");
                if let Some(rel) = text[i..].find(&open) {
                    let pos = i + rel;
                    if next.map_or(true, |(best, _)| pos < best) {
                        next = Some((pos, tag));
                    }
                }
            }

            let Some((start, tag)) = next else {
                self.emit_text(&text[i..], &mut events);
                break;
            };

            if start > i {
                self.emit_text(&text[i..start], &mut events);
            }

            let content_start = start + tag.len() + 2;
            let close = format!("</{tag}>");
            match text[content_start..].find(&close) {
                Some(rel) => {
                    self.emit_tag(tag, &text[content_start..content_start + rel], &mut events);
                    i = content_start + rel + close.len();
                }
                None => {
                    // Unclosed tag: the rest of the input is its content.
                    self.emit_tag(tag, &text[content_start..], &mut events);
                    i = text.len();
                }
            }
        }

        events
    }

    fn emit_text(&self, content: &str, events: &mut Vec<ParserEvent>) {
        if content.is_empty() {
            return;
        }
        let id = Uuid::new_v4().to_string();
        events.push(ParserEvent::text_create(&id));
        events.push(ParserEvent::text_append(&id, content));
        events.push(ParserEvent::text_close(&id));
    }

    fn emit_tag(&self, tag: &str, content: &str, events: &mut Vec<ParserEvent>) {
        let id = Uuid::new_v4().to_string();
        events.push(ParserEvent::tool_create(&id, tag));
        if !content.is_empty() {
            events.push(ParserEvent::tool_content(&id, content));
        }
        events.push(ParserEvent::tool_close(
            &id,
            Some(ToolUse {
                name: tag.to_string(),
                args: Default::default(),
            }),
        ));
    }
}
