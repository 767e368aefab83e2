//! Client-side identity and session model.
//! Keep the public surface thin and split implementation across sub-modules.

mod user;
mod session;
mod credentials;

pub use user::Identity;
pub use session::{Session, SessionKind};
pub use credentials::{
    LoginForm, LoginRequest, SignupForm, SignupRequest, MIN_PASSWORD_LEN,
    MSG_LOGIN_REQUIRED, MSG_SIGNUP_REQUIRED, MSG_PASSWORD_TOO_SHORT, MSG_PASSWORD_MISMATCH,
};
