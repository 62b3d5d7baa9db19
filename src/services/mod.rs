//! Session lifecycle: backend auth calls, the process-wide session store,
//! and role-based route guards.

pub mod auth;
pub mod guard;
pub mod principal;
pub mod session;

pub use auth::{AuthService, LoginReceipt};
pub use guard::{GuardDecision, RouteGuard, post_login_destination};
pub use principal::{Principal, Role};
pub use session::{SessionState, SessionStore, SessionView};
