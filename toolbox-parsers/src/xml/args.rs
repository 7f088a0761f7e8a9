//! Argument sub-scanner for spans inside a tool block.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use toolbox_types::ParserEvent;

static ARG_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<(\w+)>").unwrap());
static ARG_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^</(\w+)>").unwrap());
// A tag that has started but whose '>' has not arrived yet.
static PARTIAL_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^</?\w*$").unwrap());

/// Scans text known to lie between a tool's `<name>` and its closing
/// delimiter, attributing untagged text to the currently open argument.
///
/// This is deliberately not markup parsing: only literal `<argName>` /
/// `</argName>` tokens are recognized. An open tag closes any previously
/// open argument; a close tag closes whatever is open regardless of its
/// name; untagged text with no open argument is discarded.
pub(crate) struct ArgScanner {
    tool_id: String,
    open_arg: Option<String>,
    args: BTreeMap<String, String>,
}

impl ArgScanner {
    pub(crate) fn new(tool_id: String) -> Self {
        Self {
            tool_id,
            open_arg: None,
            args: BTreeMap::new(),
        }
    }

    /// Scan `text`, pushing tool `append` events for attributed content.
    /// Returns the number of bytes consumed.
    ///
    /// With `final_span` false an incomplete trailing tag is left
    /// unconsumed so the caller can retain it verbatim and replay it once
    /// more data arrives. With `final_span` true the span is known
    /// complete and an incomplete tag is ordinary literal text.
    pub(crate) fn scan(
        &mut self,
        text: &str,
        final_span: bool,
        events: &mut Vec<ParserEvent>,
    ) -> usize {
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            let Some(lt) = rest.find('<') else {
                self.append(rest, events);
                pos = text.len();
                break;
            };
            if lt > 0 {
                self.append(&rest[..lt], events);
                pos += lt;
                continue;
            }
            if let Some(m) = ARG_CLOSE.find(rest) {
                // Lenient recovery: any close tag closes the open argument,
                // matching or not.
                self.close_open_arg();
                pos += m.len();
                continue;
            }
            if let Some(caps) = ARG_OPEN.captures(rest) {
                self.start_arg(caps[1].to_string());
                pos += caps[0].len();
                continue;
            }
            if !final_span && PARTIAL_TAG.is_match(rest) {
                // The tag may complete in the next chunk; stop at the last
                // complete token.
                break;
            }
            // A '<' that can never form an argument tag is literal text.
            self.append("<", events);
            pos += 1;
        }
        pos
    }

    pub(crate) fn close_open_arg(&mut self) {
        self.open_arg = None;
    }

    pub(crate) fn into_args(self) -> BTreeMap<String, String> {
        self.args
    }

    fn start_arg(&mut self, name: String) {
        // Opening a new argument implicitly closes the previous one.
        self.open_arg = Some(name);
    }

    fn append(&mut self, text: &str, events: &mut Vec<ParserEvent>) {
        if text.is_empty() {
            return;
        }
        let Some(arg) = &self.open_arg else {
            return;
        };
        // Repeated argument names concatenate in arrival order.
        self.args.entry(arg.clone()).or_default().push_str(text);
        events.push(ParserEvent::tool_append(&self.tool_id, arg, text));
    }
}
