pub mod oauth;
pub mod session;
pub mod token;
pub mod validation;

pub use self::session::{BootstrapOutcome, Session, SessionManager};
pub use self::token::AccessToken;
