// Blog generation: rewrite the article, illustrate it, and support
// conversational edits afterwards.
// All model calls go through the `GenerationBackend` seam.

pub mod backend;
pub mod editor;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod tone;
