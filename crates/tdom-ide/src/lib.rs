//! Editor-facing adapters over the tdom analysis stack: completion inside
//! template bodies, reference spans for navigation, and injection segments
//! for embedding a markup language into string literals.

mod completion;
mod inject;
mod references;

pub use completion::complete;
pub use completion::completion_context;
pub use completion::CompletionContext;
pub use completion::CompletionItem;
pub use completion::CompletionKind;
pub use inject::injection_segments;
pub use inject::InjectionSegment;
pub use references::references;
pub use references::Reference;
