use crate::passchange::{
    change::{ChangeRequest, PasswordChanger, SUCCESS_MESSAGE},
    templates,
};
use axum::{
    extract::{Extension, Form, rejection::FormRejection},
    response::Html,
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Submitted form fields. Missing fields are read as empty strings.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChangePasswordForm {
    username: String,
    password: String,
    new_password: String,
}

impl From<ChangePasswordForm> for ChangeRequest {
    fn from(form: ChangePasswordForm) -> Self {
        Self {
            username: form.username,
            current_password: SecretString::from(form.password),
            new_password: SecretString::from(form.new_password),
        }
    }
}

// axum handler for POST /change
pub async fn change(
    changer: Extension<Arc<PasswordChanger>>,
    form: Result<Form<ChangePasswordForm>, FormRejection>,
) -> Html<String> {
    let request = match form {
        Ok(Form(form)) => ChangeRequest::from(form),
        Err(rejection) => {
            debug!("unreadable password change form: {}", rejection);
            return Html(templates::message(&rejection.body_text(), true));
        }
    };

    debug!("password change requested for {}", request.username);

    match changer.change(&request).await {
        Ok(()) => Html(templates::message(SUCCESS_MESSAGE, false)),
        Err(err) => Html(templates::message(&err.to_string(), true)),
    }
}
