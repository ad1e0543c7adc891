pub mod session;
pub mod state;

pub use session::{CurrentAccount, LoginRedirect, LOGIN_PATH, SESSION_COOKIE};
pub use state::AppState;
