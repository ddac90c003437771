// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Markdown conventions every blog-producing prompt asks for, so the review
/// page can render the result consistently.
pub const MARKDOWN_FORMAT_INSTRUCTION: &str = "\
Use proper markdown formatting:
  # Heading
  ## Subheading
  **bold** for important terms
  - Bullet points";

/// Appended to prompts whose output is shown to the user verbatim.
pub const NO_COMMENTARY_INSTRUCTION: &str =
    "Return only the blog post. Do not include any commentary or explanations.";
