use crate::passchange::{Settings, change::PasswordChanger, templates};
use axum::{
    extract::Extension,
    response::{Html, Redirect},
};
use std::sync::Arc;

// axum handler for the change password form
pub async fn form(
    settings: Extension<Arc<Settings>>,
    changer: Extension<Arc<PasswordChanger>>,
) -> Html<String> {
    Html(templates::form(
        &settings.app_env,
        changer.policy().description(),
    ))
}

/// Send anything that is not a form view or a submission back to the form.
pub async fn redirect_home() -> Redirect {
    Redirect::to("/")
}
