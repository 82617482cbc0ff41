use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use parley_core::{FormOutcome, LoginForm, Route, SessionStore};
use rustyline::error::ReadlineError;

use super::{LineEditor, ViewExit};
use crate::render;

pub struct LoginView {
    session: Arc<SessionStore>,
    form: LoginForm,
}

impl LoginView {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            form: LoginForm::new(),
        }
    }

    pub async fn run(&mut self, editor: &mut LineEditor) -> Result<ViewExit> {
        if self.session.is_authenticated() {
            return Ok(ViewExit::Navigate(Route::Chat));
        }

        println!("{}", "Sign in (/signup to create an account, /quit to exit)".bright_white().bold());

        loop {
            let mode = if self.form.is_signup { "signup" } else { "login" };
            let username = match editor.readline(&format!("{} username: ", mode)) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(ViewExit::Quit),
                Err(e) => return Err(e.into()),
            };

            match username.trim() {
                "/quit" => return Ok(ViewExit::Quit),
                "/signup" => {
                    self.form.toggle_signup();
                    let label = if self.form.is_signup { "Sign-up mode" } else { "Login mode" };
                    render::notice(label);
                    continue;
                }
                _ => {}
            }
            self.form.username = username;

            if self.form.is_signup {
                self.form.email = match editor.readline("email: ") {
                    Ok(line) => line,
                    Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(ViewExit::Quit),
                    Err(e) => return Err(e.into()),
                };
            }
            self.form.password = rpassword::prompt_password("password: ")?;

            match self.form.submit(&self.session).await {
                FormOutcome::LoggedIn(user) => {
                    render::notice(&format!("Signed in as {}", user));
                    self.form = LoginForm::new();
                    return Ok(ViewExit::Navigate(Route::Chat));
                }
                FormOutcome::Registered => render::notice(&self.form.error),
                FormOutcome::Invalid | FormOutcome::Failed => render::error(&self.form.error),
            }
        }
    }
}
