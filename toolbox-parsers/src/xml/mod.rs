//! Incremental parser for `<use_tool>`-style blocks embedded in a text
//! stream.

mod args;
pub mod flat;
mod tool_block;

use toolbox_types::{ParserError, ParserEvent};
use uuid::Uuid;

use crate::prefix::longest_prefix_at_end;
use tool_block::ToolBlockParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Outside,
    InsideTool,
}

/// Behavior toggles for [`XmlParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParserConfig {
    /// Emit whitespace-only trailing text at `flush` instead of
    /// suppressing it.
    pub keep_trailing_whitespace: bool,
}

/// Streaming parser over the full input stream.
///
/// Feed arbitrarily sized chunks with [`parse_chunk`](Self::parse_chunk)
/// and finish with [`flush`](Self::flush); each call returns the events
/// produced so far. One instance per logical stream; calls never block and
/// awaiting more data is represented by returning with internal buffers
/// preserved.
pub struct XmlParser {
    state: ParserState,
    open_tag: String,
    close_tag: String,
    config: XmlParserConfig,
    current_text_id: Option<String>,
    outside_buffer: String,
    block: Option<ToolBlockParser>,
}

impl XmlParser {
    /// `tag` is the delimiter tag name, e.g. `"use_tool"`.
    pub fn new(tag: &str) -> Self {
        Self::with_config(tag, XmlParserConfig::default())
    }

    pub fn with_config(tag: &str, config: XmlParserConfig) -> Self {
        Self {
            state: ParserState::Outside,
            open_tag: format!("<{tag}>"),
            close_tag: format!("</{tag}>"),
            config,
            current_text_id: None,
            outside_buffer: String::new(),
            block: None,
        }
    }

    /// Convenience for non-streaming input: one chunk, then flush.
    pub fn parse(&mut self, text: &str) -> Result<Vec<ParserEvent>, ParserError> {
        let mut events = self.parse_chunk(text)?;
        events.extend(self.flush()?);
        Ok(events)
    }

    /// Feed one chunk, returning the events it resolved.
    pub fn parse_chunk(&mut self, chunk: &str) -> Result<Vec<ParserEvent>, ParserError> {
        tracing::trace!(len = chunk.len(), state = ?self.state, "parse chunk");
        let mut events = Vec::new();
        match self.state {
            ParserState::Outside => self.handle_outside(chunk, &mut events)?,
            ParserState::InsideTool => self.handle_inside(chunk, &mut events)?,
        }
        Ok(events)
    }

    /// End-of-stream finalization: emits any buffered outside text, forces
    /// an in-flight tool block to completion, and closes every open block.
    /// Calling `parse_chunk` afterward is unsupported.
    pub fn flush(&mut self) -> Result<Vec<ParserEvent>, ParserError> {
        let mut events = Vec::new();

        let trailing = std::mem::take(&mut self.outside_buffer);
        if self.should_emit_trailing(&trailing) {
            self.stream_text(&trailing, &mut events);
        }
        self.close_text_block(&mut events);

        while let Some(mut block) = self.block.take() {
            self.state = ParserState::Outside;
            let result = block.parse("")?;
            events.extend(result.events);
            let leftover = if result.done {
                result.leftover
            } else {
                block.force_close(&mut events);
                String::new()
            };
            if self.should_emit_trailing(&leftover) {
                self.handle_outside(&leftover, &mut events)?;
            }
            self.close_text_block(&mut events);
        }

        // A partial opening delimiter re-buffered above is trailing text
        // now that the stream is over.
        let trailing = std::mem::take(&mut self.outside_buffer);
        if self.should_emit_trailing(&trailing) {
            self.stream_text(&trailing, &mut events);
        }
        self.close_text_block(&mut events);

        Ok(events)
    }

    fn handle_outside(
        &mut self,
        chunk: &str,
        events: &mut Vec<ParserEvent>,
    ) -> Result<(), ParserError> {
        let mut combined = std::mem::take(&mut self.outside_buffer);
        combined.push_str(chunk);

        loop {
            match combined.find(&self.open_tag) {
                None => {
                    // Hold back a possible partial opening delimiter; the
                    // rest is outside text.
                    let hold = longest_prefix_at_end(&combined, &self.open_tag);
                    let emit_to = combined.len() - hold;
                    self.stream_text(&combined[..emit_to], events);
                    combined.drain(..emit_to);
                    self.outside_buffer = combined;
                    return Ok(());
                }
                Some(idx) => {
                    self.stream_text(&combined[..idx], events);
                    self.close_text_block(events);
                    combined.drain(..idx + self.open_tag.len());

                    let mut block = ToolBlockParser::new(&self.close_tag);
                    let result = block.parse(&combined)?;
                    events.extend(result.events);

                    if result.done {
                        // Back-to-back blocks in one chunk: loop the
                        // leftover straight back into the outside search.
                        combined = result.leftover;
                    } else {
                        self.state = ParserState::InsideTool;
                        self.block = Some(block);
                        self.outside_buffer = result.leftover;
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_inside(
        &mut self,
        chunk: &str,
        events: &mut Vec<ParserEvent>,
    ) -> Result<(), ParserError> {
        let Some(block) = self.block.as_mut() else {
            return Ok(());
        };
        let result = block.parse(chunk)?;
        events.extend(result.events);

        if result.done {
            self.block = None;
            self.state = ParserState::Outside;
            // Re-process the tail immediately so a second block starting in
            // this same chunk is recognized without waiting.
            self.handle_outside(&result.leftover, events)?;
        }
        Ok(())
    }

    fn stream_text(&mut self, text: &str, events: &mut Vec<ParserEvent>) {
        if text.is_empty() {
            return;
        }
        let id = match &self.current_text_id {
            Some(id) => id.clone(),
            None => {
                // Text blocks open lazily on first content.
                let id = Uuid::new_v4().to_string();
                events.push(ParserEvent::text_create(&id));
                self.current_text_id = Some(id.clone());
                id
            }
        };
        events.push(ParserEvent::text_append(&id, text));
    }

    fn close_text_block(&mut self, events: &mut Vec<ParserEvent>) {
        if let Some(id) = self.current_text_id.take() {
            events.push(ParserEvent::text_close(&id));
        }
    }

    fn should_emit_trailing(&self, text: &str) -> bool {
        if self.config.keep_trailing_whitespace {
            !text.is_empty()
        } else {
            !text.trim().is_empty()
        }
    }
}
