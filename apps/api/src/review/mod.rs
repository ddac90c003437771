// Result presenter: the review page, its manual and conversational edits,
// and saving the edited post on the way to export.

pub mod handlers;
