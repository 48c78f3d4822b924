use serde::{Deserialize, Serialize};

use super::{FormError, FormErrors, REQUIRED, cleaned};
use crate::domain::User;
use crate::ports::{PasswordService, UserRepository};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
const USERNAME_INVALID: &str = "Enter a valid username. This value may contain only letters, \
     numbers, and @/./+/-/_ characters.";
const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";

/// Raw sign-up submission. The password is never echoed back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupFormData {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub username: String,
    pub password: String,
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl SignupFormData {
    pub async fn validate(&self, users: &dyn UserRepository) -> Result<ValidSignup, FormError> {
        let mut errors = FormErrors::new();

        let username = cleaned(self.username.as_deref());
        match username {
            None => errors.add("username", REQUIRED),
            Some(name) if name.chars().count() > USERNAME_MAX_LENGTH => errors.add(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX_LENGTH} characters."),
            ),
            Some(name) if !name.chars().all(is_username_char) => {
                errors.add("username", USERNAME_INVALID)
            }
            Some(name) => {
                if users.find_by_username(name).await?.is_some() {
                    errors.add("username", USERNAME_TAKEN);
                }
            }
        }

        let password = self.password.as_deref().unwrap_or_default();
        if password.is_empty() {
            errors.add("password", REQUIRED);
        } else if password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."),
            );
        }

        errors.into_result(|| ValidSignup {
            username: username.unwrap_or_default().to_string(),
            password: password.to_string(),
        })
    }
}

/// Build from urlencoded pairs; a repeated field keeps its last value.
impl FromIterator<(String, String)> for SignupFormData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut data = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "username" => data.username = Some(value),
                "password" => data.password = Some(value),
                _ => {}
            }
        }
        data
    }
}

/// Raw login submission, carrying the path to return to afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginFormData {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub next: Option<String>,
}

impl LoginFormData {
    /// Resolve the credentials to a user.
    pub async fn authenticate(
        &self,
        users: &dyn UserRepository,
        passwords: &dyn PasswordService,
    ) -> Result<User, FormError> {
        let mut errors = FormErrors::new();
        let username = cleaned(self.username.as_deref());
        let password = self.password.as_deref().filter(|p| !p.is_empty());
        if username.is_none() {
            errors.add("username", REQUIRED);
        }
        if password.is_none() {
            errors.add("password", REQUIRED);
        }
        let (Some(username), Some(password)) = (username, password) else {
            return Err(FormError::Invalid(errors));
        };

        let Some(user) = users.find_by_username(username).await? else {
            return Err(FormError::Invalid(FormErrors::non_field(BAD_CREDENTIALS)));
        };

        match passwords.verify(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(FormError::Invalid(FormErrors::non_field(BAD_CREDENTIALS))),
            Err(e) => Err(FormError::Auth(e)),
        }
    }

    /// The requested return path, if it stays on this site.
    pub fn safe_next(&self) -> Option<&str> {
        safe_redirect_path(self.next.as_deref()?)
    }
}

impl FromIterator<(String, String)> for LoginFormData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut data = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "username" => data.username = Some(value),
                "password" => data.password = Some(value),
                "next" => data.next = Some(value),
                _ => {}
            }
        }
        data
    }
}

/// Accept only local absolute paths as redirect targets.
pub fn safe_redirect_path(path: &str) -> Option<&str> {
    let local = path.starts_with('/') && !path.starts_with("//") && !path.contains('\\');
    local.then_some(path)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::error::RepoError;
    use crate::ports::{AuthError, BaseRepository};
    use crate::forms::NON_FIELD_ERRORS;

    struct Users(Vec<User>);

    #[async_trait]
    impl BaseRepository<User, Uuid> for Users {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.id == id).cloned())
        }
    }

    #[async_trait]
    impl UserRepository for Users {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.username == username).cloned())
        }

        async fn create(&self, user: User) -> Result<User, RepoError> {
            Ok(user)
        }
    }

    /// Treats the hash as the plain password.
    struct PlainPasswords;

    impl PasswordService for PlainPasswords {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(password.to_string())
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(password == hash)
        }
    }

    fn users() -> Users {
        Users(vec![User::new("leo".to_string(), "password123".to_string())])
    }

    fn signup(username: &str, password: &str) -> SignupFormData {
        SignupFormData {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn login(username: &str, password: &str) -> LoginFormData {
        LoginFormData {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            next: None,
        }
    }

    fn invalid<T: std::fmt::Debug>(result: Result<T, FormError>) -> FormErrors {
        match result {
            Err(FormError::Invalid(errors)) => errors,
            other => panic!("expected invalid form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_accepts_new_username() {
        let valid = signup(" anna.k ", "longenough").validate(&users()).await.unwrap();
        assert_eq!(valid.username, "anna.k");
        assert_eq!(valid.password, "longenough");
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_username() {
        let errors = invalid(signup("leo", "longenough").validate(&users()).await);
        assert_eq!(errors.get("username"), &[USERNAME_TAKEN.to_string()]);
    }

    #[tokio::test]
    async fn test_signup_rejects_bad_username_and_short_password() {
        let errors = invalid(signup("no spaces", "short").validate(&users()).await);
        assert!(errors.has("username"));
        assert!(errors.has("password"));

        let long = "a".repeat(USERNAME_MAX_LENGTH + 1);
        let errors = invalid(signup(&long, "longenough").validate(&users()).await);
        assert!(errors.has("username"));
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_forms_from_pairs_keep_last_value() {
        let signup: SignupFormData =
            pairs(&[("username", "a"), ("username", "b"), ("password", "p")])
                .into_iter()
                .collect();
        assert_eq!(signup.username.as_deref(), Some("b"));
        assert_eq!(signup.password.as_deref(), Some("p"));

        let login: LoginFormData = pairs(&[("next", "/x/"), ("username", "leo"), ("next", "/y/")])
            .into_iter()
            .collect();
        assert_eq!(login.username.as_deref(), Some("leo"));
        assert_eq!(login.password, None);
        assert_eq!(login.next.as_deref(), Some("/y/"));
    }

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let user = login("leo", "password123")
            .authenticate(&users(), &PlainPasswords)
            .await
            .unwrap();
        assert_eq!(user.username, "leo");
    }

    #[tokio::test]
    async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
        let wrong_password = invalid(login("leo", "nope").authenticate(&users(), &PlainPasswords).await);
        let unknown_user = invalid(login("ghost", "x").authenticate(&users(), &PlainPasswords).await);
        assert_eq!(wrong_password, unknown_user);
        assert!(wrong_password.has(NON_FIELD_ERRORS));
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let errors = invalid(LoginFormData::default().authenticate(&users(), &PlainPasswords).await);
        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_safe_redirect_path() {
        assert_eq!(safe_redirect_path("/create/"), Some("/create/"));
        assert_eq!(safe_redirect_path("//evil.example"), None);
        assert_eq!(safe_redirect_path("https://evil.example"), None);
        assert_eq!(safe_redirect_path("/\\evil"), None);
    }
}
