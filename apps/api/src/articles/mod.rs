// Article loader: enumerate source DOCX articles and extract their text.

pub mod docx;
pub mod handlers;
pub mod loader;
