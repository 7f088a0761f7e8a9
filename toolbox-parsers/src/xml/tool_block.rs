//! State machine for a single tool block.

use std::sync::LazyLock;

use regex::Regex;
use toolbox_types::{ParserError, ParserEvent, ToolUse};
use uuid::Uuid;

use super::args::ArgScanner;
use crate::prefix::longest_prefix_at_end;

static NAME_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<name>(.*?)</name>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    WaitingForName,
    HasName,
    Done,
}

/// Result of feeding one chunk to a [`ToolBlockParser`].
pub(crate) struct BlockParseResult {
    pub events: Vec<ParserEvent>,
    pub done: bool,
    /// Text after the block's closing delimiter. Belongs to the outer
    /// parser, not this block.
    pub leftover: String,
}

/// Parses the inside of one `<use_tool>...</use_tool>` span:
/// grabs `<name>...</name>`, delegates the rest to the argument scanner,
/// and stops at the closing delimiter, handing back whatever follows it.
pub(crate) struct ToolBlockParser {
    state: BlockState,
    buffer: String,
    close_tag: String,
    tool_id: Option<String>,
    tool_name: Option<String>,
    scanner: Option<ArgScanner>,
}

impl ToolBlockParser {
    pub(crate) fn new(close_tag: &str) -> Self {
        Self {
            state: BlockState::WaitingForName,
            buffer: String::new(),
            close_tag: close_tag.to_string(),
            tool_id: None,
            tool_name: None,
            scanner: None,
        }
    }

    /// Append `chunk` and drain as much of the buffer as is unambiguously
    /// resolvable. Each state handler either consumes buffer content or
    /// leaves it untouched; the loop stops at the first call that makes no
    /// progress.
    pub(crate) fn parse(&mut self, chunk: &str) -> Result<BlockParseResult, ParserError> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        loop {
            let before = self.buffer.len();
            match self.state {
                BlockState::WaitingForName => self.wait_for_name(&mut events)?,
                BlockState::HasName => self.scan_for_close(&mut events),
                BlockState::Done => break,
            }
            if self.buffer.len() == before {
                break;
            }
        }

        let done = self.state == BlockState::Done;
        let leftover = if done {
            std::mem::take(&mut self.buffer)
        } else {
            String::new()
        };
        Ok(BlockParseResult {
            events,
            done,
            leftover,
        })
    }

    /// Forced finalization at end-of-stream: close any open argument and
    /// emit the close event from whatever state accumulated. A block whose
    /// name never resolved emitted no create, so it emits no close either.
    pub(crate) fn force_close(&mut self, events: &mut Vec<ParserEvent>) {
        if self.state == BlockState::Done {
            return;
        }
        if let Some(scanner) = self.scanner.as_mut() {
            // No more data is coming: a tag fragment retained for replay
            // is literal argument text now. A partial closing delimiter
            // stays elided.
            let hold = longest_prefix_at_end(&self.buffer, &self.close_tag);
            let end = self.buffer.len() - hold;
            scanner.scan(&self.buffer[..end], true, events);
            self.buffer.clear();
        }
        self.finalize_block(events);
    }

    fn wait_for_name(&mut self, events: &mut Vec<ParserEvent>) -> Result<(), ParserError> {
        let (name, end) = match NAME_BLOCK.captures(&self.buffer) {
            Some(caps) => (
                caps[1].trim().to_string(),
                caps.get(0).map(|m| m.end()).unwrap_or_default(),
            ),
            None => return Ok(()), // partial data, no full name block yet
        };
        if name.is_empty() {
            return Err(ParserError::EmptyToolName);
        }

        self.buffer.drain(..end);

        let id = Uuid::new_v4().to_string();
        tracing::debug!(tool_name = %name, tool_id = %id, "tool block opened");
        events.push(ParserEvent::tool_create(&id, &name));
        self.scanner = Some(ArgScanner::new(id.clone()));
        self.tool_id = Some(id);
        self.tool_name = Some(name);
        self.state = BlockState::HasName;
        Ok(())
    }

    fn scan_for_close(&mut self, events: &mut Vec<ParserEvent>) {
        let Some(scanner) = self.scanner.as_mut() else {
            return;
        };
        match self.buffer.find(&self.close_tag) {
            Some(close_pos) => {
                // The span before the delimiter is complete: scan all of it.
                scanner.scan(&self.buffer[..close_pos], true, events);
                self.buffer.drain(..close_pos + self.close_tag.len());
                self.finalize_block(events);
            }
            None => {
                // Hold back anything that might be the start of the closing
                // delimiter; scan the rest, retaining an incomplete
                // argument tag verbatim for replay.
                let hold = longest_prefix_at_end(&self.buffer, &self.close_tag);
                let scan_end = self.buffer.len() - hold;
                let consumed = scanner.scan(&self.buffer[..scan_end], false, events);
                self.buffer.drain(..consumed);
            }
        }
    }

    fn finalize_block(&mut self, events: &mut Vec<ParserEvent>) {
        self.state = BlockState::Done;
        let (Some(id), Some(name)) = (self.tool_id.take(), self.tool_name.take()) else {
            return;
        };
        let args = match self.scanner.take() {
            Some(mut scanner) => {
                scanner.close_open_arg();
                scanner.into_args()
            }
            None => Default::default(),
        };
        events.push(ParserEvent::tool_close(&id, Some(ToolUse { name, args })));
    }
}
