use serde::{Deserialize, Serialize};

use super::{FormError, FormErrors, INVALID_CHOICE, REQUIRED, cleaned};
use crate::domain::{Post, PostChanges};
use crate::ports::GroupRepository;

/// Raw post form submission. Only `text` and `group` are read; anything
/// else in the body (an `author` field, for instance) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFormData {
    pub text: Option<String>,
    pub group: Option<String>,
}

/// A post submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPost {
    pub text: String,
    pub group_id: Option<i32>,
}

impl PostFormData {
    /// Initial form values for editing an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: Some(post.text.clone()),
            group: post.group_id.map(|id| id.to_string()),
        }
    }

    /// Check the submission. `group` must be blank or the id of an existing
    /// group.
    pub async fn validate(&self, groups: &dyn GroupRepository) -> Result<ValidPost, FormError> {
        let mut errors = FormErrors::new();

        let text = cleaned(self.text.as_deref());
        if text.is_none() {
            errors.add("text", REQUIRED);
        }

        let group_id = match cleaned(self.group.as_deref()) {
            None => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(id) if groups.find_by_id(id).await?.is_some() => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        errors.into_result(|| ValidPost {
            text: text.unwrap_or_default().to_string(),
            group_id,
        })
    }
}

/// Build from urlencoded pairs; a repeated field keeps its last value.
impl FromIterator<(String, String)> for PostFormData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut data = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "text" => data.text = Some(value),
                "group" => data.group = Some(value),
                _ => {}
            }
        }
        data
    }
}

impl From<ValidPost> for PostChanges {
    fn from(valid: ValidPost) -> Self {
        Self {
            text: valid.text,
            group_id: valid.group_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Group, NewGroup};
    use crate::error::RepoError;
    use crate::ports::BaseRepository;

    struct OneGroup;

    #[async_trait]
    impl BaseRepository<Group, i32> for OneGroup {
        async fn find_by_id(&self, id: i32) -> Result<Option<Group>, RepoError> {
            Ok((id == 7).then(|| Group {
                id: 7,
                slug: "cats".to_string(),
                title: "Cats".to_string(),
                description: None,
            }))
        }
    }

    #[async_trait]
    impl GroupRepository for OneGroup {
        async fn find_by_slug(&self, _slug: &str) -> Result<Option<Group>, RepoError> {
            Ok(None)
        }

        async fn list(&self) -> Result<Vec<Group>, RepoError> {
            Ok(vec![])
        }

        async fn create(&self, _group: NewGroup) -> Result<Group, RepoError> {
            Err(RepoError::Query("read only".to_string()))
        }
    }

    fn form(text: Option<&str>, group: Option<&str>) -> PostFormData {
        PostFormData {
            text: text.map(String::from),
            group: group.map(String::from),
        }
    }

    fn invalid(result: Result<ValidPost, FormError>) -> FormErrors {
        match result {
            Err(FormError::Invalid(errors)) => errors,
            other => panic!("expected invalid form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_with_group() {
        let valid = form(Some("  Hello  "), Some("7"))
            .validate(&OneGroup)
            .await
            .unwrap();
        assert_eq!(valid.text, "Hello");
        assert_eq!(valid.group_id, Some(7));
    }

    #[tokio::test]
    async fn test_group_is_optional() {
        let valid = form(Some("Hello"), Some("")).validate(&OneGroup).await.unwrap();
        assert_eq!(valid.group_id, None);

        let valid = form(Some("Hello"), None).validate(&OneGroup).await.unwrap();
        assert_eq!(valid.group_id, None);
    }

    #[tokio::test]
    async fn test_blank_text_is_required() {
        let errors = invalid(form(Some("   "), None).validate(&OneGroup).await);
        assert_eq!(errors.get("text"), &[REQUIRED.to_string()]);

        let errors = invalid(form(None, None).validate(&OneGroup).await);
        assert!(errors.has("text"));
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_group_is_rejected() {
        let errors = invalid(form(Some("Hello"), Some("8")).validate(&OneGroup).await);
        assert_eq!(errors.get("group"), &[INVALID_CHOICE.to_string()]);

        let errors = invalid(form(Some("Hello"), Some("cats")).validate(&OneGroup).await);
        assert!(errors.has("group"));
        assert!(!errors.has("text"));
    }

    #[test]
    fn test_pairs_keep_last_value_and_skip_unknown_fields() {
        let data: PostFormData = [
            ("text", "first"),
            ("author", "someone-else"),
            ("text", "second"),
            ("group", "7"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(data, form(Some("second"), Some("7")));
    }

    #[test]
    fn test_from_post_prefills_values() {
        let post = Post {
            id: 1,
            text: "Body".to_string(),
            author_id: uuid::Uuid::new_v4(),
            group_id: Some(7),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(PostFormData::from_post(&post), form(Some("Body"), Some("7")));
    }
}
