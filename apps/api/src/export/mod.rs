// Export handler: write the edited post to a downloadable text file and
// expose generated images.

pub mod handlers;
pub mod store;
