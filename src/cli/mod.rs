//! Interactive client commands.
//!
//! [`parse_command`] turns a REPL line into a [`Command`]; [`dispatch`] runs
//! it against an [`App`] and returns the lines to print. After every command
//! the current frame and any pending toasts are appended.

pub mod outputformatter;

use crate::app::App;
use crate::auth::MutationOutcome;
use crate::feed::FeedState;
use crate::identity::{LoginForm, SignupForm};
use crate::router::View;

use outputformatter::{render_feed, render_navigation, render_session, render_toast};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open { path: String },
    /// `password` is prompted for when the line did not carry one.
    Login { username: String, password: Option<String> },
    Signup { email: String, username: String, full_name: String },
    Logout,
    Refresh,
    Status,
    Posts,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  open <path>                              navigate to /, /login, /signup, /notifications or /profile/<user>
  login <username>                         log in (prompts for the password)
  signup <email> <username> <full name...> create an account (prompts for password twice)
  logout                                   log out
  refresh                                  re-check the session
  status                                   show session and location
  posts                                    fetch and list all posts
  help                                     show this help
  quit | exit                              leave";

/// Parses one REPL line. `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else { return Ok(None); };
    let rest: Vec<&str> = parts.collect();
    let cmd = match head.to_ascii_lowercase().as_str() {
        "open" | "go" => match rest.as_slice() {
            [path] => Command::Open { path: path.to_string() },
            _ => return Err("usage: open <path>".into()),
        },
        "login" => match rest.as_slice() {
            [u, p] => Command::Login { username: u.to_string(), password: Some(p.to_string()) },
            [u] => Command::Login { username: u.to_string(), password: None },
            // an empty username still goes through client validation
            [] => Command::Login { username: String::new(), password: None },
            _ => return Err("usage: login <username>".into()),
        },
        "signup" => match rest.as_slice() {
            [email, username, name @ ..] => Command::Signup {
                email: email.to_string(),
                username: username.to_string(),
                full_name: name.join(" "),
            },
            _ => return Err("usage: signup <email> <username> <full name...>".into()),
        },
        "logout" => Command::Logout,
        "refresh" => Command::Refresh,
        "status" => Command::Status,
        "posts" => Command::Posts,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}'; type 'help'", other)),
    };
    Ok(Some(cmd))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

fn describe(outcome: &MutationOutcome) -> Option<String> {
    match outcome {
        MutationOutcome::Busy => Some("another request is still pending".to_string()),
        // success and failure are reported through toasts
        _ => None,
    }
}

fn shows_posts(view: Option<&View>) -> bool { matches!(view, Some(View::Landing | View::Feed)) }

/// Runs `cmd`. `prompt` supplies secrets the command line does not carry
/// (login and signup passwords); returning `None` aborts the command.
pub async fn dispatch(app: &App, cmd: Command, prompt: &mut dyn FnMut(&str) -> Option<String>) -> Reply {
    let mut out = Vec::new();
    let nav = match cmd {
        Command::Quit => return Reply::Quit,
        Command::Help => {
            out.push(HELP.to_string());
            return Reply::Lines(out);
        }
        Command::Status => {
            out.push(render_session(&app.session()));
            out.push(format!("location: {}", app.location()));
            out.push(format!("session checks issued: {}", app.resolver().refresh_count()));
            if app.auth().is_pending() {
                out.push("a mutation is pending".to_string());
            }
            return Reply::Lines(out);
        }
        Command::Open { path } => {
            app.settle().await;
            app.navigate(&path)
        }
        Command::Refresh => {
            app.resolver().refresh();
            app.settle().await
        }
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => match prompt("password: ") {
                    Some(p) => p,
                    None => return Reply::Lines(vec!["aborted".into()]),
                },
            };
            let form = LoginForm::new(username, password);
            out.extend(describe(&app.login(&form).await));
            app.settle().await
        }
        Command::Signup { email, username, full_name } => {
            let Some(password) = prompt("password: ") else { return Reply::Lines(vec!["aborted".into()]) };
            let Some(confirm_password) = prompt("confirm password: ") else {
                return Reply::Lines(vec!["aborted".into()]);
            };
            let mut form = SignupForm { email, username, full_name, password, confirm_password };
            out.extend(describe(&app.signup(&mut form).await));
            app.settle().await
        }
        Command::Logout => {
            out.extend(describe(&app.logout().await));
            app.settle().await
        }
        Command::Posts => {
            let state = app.load_posts().await;
            out.extend(render_feed(&state));
            out.extend(app.notifier().drain().iter().map(render_toast));
            return Reply::Lines(out);
        }
    };

    out.extend(render_navigation(&nav));
    if shows_posts(nav.frame.view()) {
        let state = match app.feed().state() {
            FeedState::Idle => app.load_posts().await,
            s => s,
        };
        out.extend(render_feed(&state));
    }
    out.extend(app.notifier().drain().iter().map(render_toast));
    Reply::Lines(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("open /login"), Ok(Some(Command::Open { path: "/login".into() })));
        assert_eq!(
            parse_command("LOGIN alice pw"),
            Ok(Some(Command::Login { username: "alice".into(), password: Some("pw".into()) }))
        );
        assert_eq!(
            parse_command("signup a@b.co alice Alice Liddell"),
            Ok(Some(Command::Signup { email: "a@b.co".into(), username: "alice".into(), full_name: "Alice Liddell".into() }))
        );
        assert_eq!(parse_command("exit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(parse_command("open").is_err());
        assert!(parse_command("login a b c").is_err());
        assert!(parse_command("signup a@b.co").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn login_without_password_prompts_later() {
        assert_eq!(parse_command("login alice"), Ok(Some(Command::Login { username: "alice".into(), password: None })));
        assert_eq!(parse_command("login"), Ok(Some(Command::Login { username: String::new(), password: None })));
    }

    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::api::{Backend, Post};
    use crate::error::{AppError, AppResult};
    use crate::identity::{Identity, LoginRequest, SignupRequest};

    #[derive(Default)]
    struct RecordingBackend {
        logins: Mutex<Vec<(String, String)>>,
        signups: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Backend for RecordingBackend {
        async fn current_user(&self) -> AppResult<Identity> { Err(AppError::rejected(401, None)) }

        async fn login(&self, req: &LoginRequest) -> AppResult<Identity> {
            self.logins.lock().push((req.username.clone(), req.password.clone()));
            Err(AppError::rejected(400, Some("Invalid username or password".into())))
        }

        async fn signup(&self, req: &SignupRequest) -> AppResult<Identity> {
            self.signups.lock().push(req.password.clone());
            Err(AppError::rejected(400, Some("Username is already taken".into())))
        }

        async fn logout(&self) -> AppResult<()> { Ok(()) }

        async fn all_posts(&self) -> AppResult<Vec<Post>> { Ok(Vec::new()) }
    }

    fn app_with(backend: &Arc<RecordingBackend>) -> App {
        let app = App::with_backend(backend.clone(), true);
        app.start();
        app
    }

    #[tokio::test]
    async fn login_prompts_for_missing_password() {
        let backend = Arc::new(RecordingBackend::default());
        let app = app_with(&backend);
        let mut asked = Vec::new();
        let mut prompt = |label: &str| {
            asked.push(label.to_string());
            Some("hunter22".to_string())
        };
        let cmd = parse_command("login alice").unwrap().unwrap();
        let Reply::Lines(lines) = dispatch(&app, cmd, &mut prompt).await else { panic!("expected output") };
        assert_eq!(asked, vec!["password: ".to_string()]);
        assert_eq!(*backend.logins.lock(), vec![("alice".to_string(), "hunter22".to_string())]);
        assert!(lines.iter().any(|l| l.contains("Invalid username or password")), "{lines:?}");
    }

    #[tokio::test]
    async fn aborted_prompt_sends_nothing() {
        let backend = Arc::new(RecordingBackend::default());
        let app = app_with(&backend);
        let mut prompt = |_: &str| -> Option<String> { None };

        let cmd = parse_command("login alice").unwrap().unwrap();
        assert_eq!(dispatch(&app, cmd, &mut prompt).await, Reply::Lines(vec!["aborted".into()]));

        let cmd = parse_command("signup a@b.co alice Alice Liddell").unwrap().unwrap();
        assert_eq!(dispatch(&app, cmd, &mut prompt).await, Reply::Lines(vec!["aborted".into()]));

        assert!(backend.logins.lock().is_empty());
        assert!(backend.signups.lock().is_empty());
    }

    #[tokio::test]
    async fn signup_prompts_twice() {
        let backend = Arc::new(RecordingBackend::default());
        let app = app_with(&backend);
        let mut answers = vec!["secret1".to_string(), "secret1".to_string()].into_iter();
        let mut prompt = |_: &str| answers.next();
        let cmd = parse_command("signup a@b.co alice Alice Liddell").unwrap().unwrap();
        dispatch(&app, cmd, &mut prompt).await;
        assert_eq!(*backend.signups.lock(), vec!["secret1".to_string()]);
    }
}
