//! Tool registry and prompt formatting around the parser event stream.
//!
//! The parsers in `toolbox-parsers` turn LLM output into
//! [`ParserEvent`](toolbox_types::ParserEvent)s; a [`Toolbox`] consumes the
//! completed tool events, validates and coerces arguments against each
//! tool's declared schema, and dispatches to the registered handler. The
//! formatters render the matching usage instructions for the upstream
//! prompt.

mod format;
mod logging;
mod registry;

pub use format::{FlatXmlPromptFormatter, PromptFormatter, XmlPromptFormatter};
pub use logging::init_logging;
pub use registry::Toolbox;
