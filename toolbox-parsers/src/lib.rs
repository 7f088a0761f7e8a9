//! Streaming parsers that turn raw LLM output into ordered
//! create/append/close block events.
//!
//! The XML convention looks like:
//!
//! ```xml
//! I'll search for that.
//! <use_tool>
//!   <name>search</name>
//!   <query>example search</query>
//! </use_tool>
//! ```
//!
//! Text outside a tool block streams as `text` events; each tool block
//! streams as `tool` events and finishes with a close event carrying the
//! resolved [`ToolUse`](toolbox_types::ToolUse). Chunks may split any
//! delimiter at any byte; parsers hold back ambiguous tails and replay
//! them once more data arrives.

pub mod prefix;
pub mod xml;

pub use prefix::longest_prefix_at_end;
pub use xml::flat::FlatXmlParser;
pub use xml::{XmlParser, XmlParserConfig};

#[cfg(test)]
mod tests;
