//! Sign-up, login and logout.

use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite, time::Duration},
    web,
};
use serde::Deserialize;

use yatube_core::domain::User;
use yatube_core::error::RepoError;
use yatube_core::forms::{FormError, FormErrors, LoginFormData, SignupFormData, USERNAME_TAKEN};

use super::context::{AccountFormContext, FormView, LOGIN_TEMPLATE, SIGNUP_TEMPLATE};
use super::{found, render};
use crate::middleware::auth::AUTH_COOKIE;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Issue a session for `user` and redirect to `location`.
fn sign_in(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let cookie = session_cookie(token, state.tokens.expiration_seconds());

    Ok(found(location).cookie(cookie).finish())
}

/// GET /auth/signup/
pub async fn signup_form() -> HttpResponse {
    render(
        SIGNUP_TEMPLATE,
        AccountFormContext {
            form: FormView::unbound(SignupFormData::default()),
        },
    )
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let data: SignupFormData = form.into_inner().into_iter().collect();

    let valid = match data.validate(state.users.as_ref()).await {
        Ok(valid) => valid,
        Err(FormError::Invalid(errors)) => {
            return Ok(render(
                SIGNUP_TEMPLATE,
                AccountFormContext {
                    form: FormView::invalid(data, errors),
                },
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let password_hash = state.passwords.hash(&valid.password)?;
    let user = match state
        .users
        .create(User::new(valid.username, password_hash))
        .await
    {
        Ok(user) => user,
        // Taken between validation and insert.
        Err(RepoError::Constraint(detail)) => {
            tracing::warn!(%detail, "Sign-up rejected: username already exists");
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return Ok(render(
                SIGNUP_TEMPLATE,
                AccountFormContext {
                    form: FormView::invalid(data, errors),
                },
            ));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    sign_in(&state, &user, "/")
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    let data = LoginFormData {
        next: query.into_inner().next,
        ..LoginFormData::default()
    };

    render(
        LOGIN_TEMPLATE,
        AccountFormContext {
            form: FormView::unbound(data),
        },
    )
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let data: LoginFormData = form.into_inner().into_iter().collect();

    let user = match data
        .authenticate(state.users.as_ref(), state.passwords.as_ref())
        .await
    {
        Ok(user) => user,
        Err(FormError::Invalid(errors)) => {
            tracing::warn!(username = ?data.username, "Failed login attempt");
            return Ok(render(
                LOGIN_TEMPLATE,
                AccountFormContext {
                    form: FormView::invalid(data, errors),
                },
            ));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
    sign_in(&state, &user, data.safe_next().unwrap_or("/"))
}

/// GET|POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(AUTH_COOKIE, "").path("/").finish();
    cookie.make_removal();

    found("/").cookie(cookie).finish()
}
