// Auth gate: configured credentials, cookie sessions, and the middleware that
// keeps every post-login route behind them.

pub mod credentials;
pub mod handlers;
pub mod middleware;
pub mod session;
