//! Client routes, the authorization gate and the navigator that applies it.

mod gate;
mod navigator;
mod route;

pub use gate::{decide, decide_path, RouteRequest, RoutingDecision, View};
pub use navigator::{Navigation, Navigator};
pub use route::{normalize, Route, HOME_PATH, LOGIN_PATH, NOTIFICATIONS_PATH, SIGNUP_PATH};
