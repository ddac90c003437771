// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Rewrite system prompt template.
/// Replace `{tone}`, `{keywords}`, `{firm}`, `{location}` and `{format}` before sending.
pub const REWRITE_SYSTEM_TEMPLATE: &str = "\
You are a legal blog post rewriter. Rewrite the article with:
- At least 30% changes from original
- {tone} tone
- Include these keywords: {keywords}
- Mention {firm} in {location}
- {format}

{no_commentary}";

/// System prompt that turns blog text into a content-filter-safe image prompt.
pub const IMAGE_PROMPT_SYSTEM: &str = "\
You are a prompt engineer for legal blog images. Create a safe, professional image prompt that:
- Uses only abstract legal concepts
- Avoids any faces, people, or sensitive content
- Focuses on documents, scales of justice, legal symbols
- Maintains a professional, corporate style
- Will pass Azure content filters
- Is based on this blog content:";

/// System prompt for conversational editing.
pub const EDITOR_SYSTEM: &str = "\
You are a legal blog post editor. When the user requests changes:
1. Make ONLY the requested changes
2. Return the complete updated blog in markdown format
3. Don't include any commentary or explanations
4. Preserve all formatting and structure";

pub const REWRITE_TEMPERATURE: f32 = 0.7;
pub const IMAGE_PROMPT_TEMPERATURE: f32 = 0.7;
pub const EDIT_TEMPERATURE: f32 = 0.5;

/// Only the opening of the blog is sent when deriving an image prompt.
pub const IMAGE_PROMPT_SOURCE_CHARS: usize = 1000;
