use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use axum::extract::Multipart;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::errors::AppError;
use crate::media::{image_extension, IMAGE_EXTENSIONS};
use crate::models::{PostSummary, TAG_NAME_MAX_LENGTH, TITLE_MAX_LENGTH};
use crate::tagging::{edit_string, parse_tags};

/// Maximum length of a username
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Minimum length of a password chosen at registration
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Key under which errors not tied to one field are stored
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";

fn too_long(max: usize, actual: usize) -> ValidationError {
    ValidationError::new("max_length").with_message(Cow::Owned(format!(
        "Ensure this value has at most {max} characters (it has {actual})."
    )))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Rejects values that are blank once trimmed
fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    Ok(())
}

fn title_field(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let len = value.trim().chars().count();
    if len > TITLE_MAX_LENGTH {
        return Err(too_long(TITLE_MAX_LENGTH, len));
    }
    Ok(())
}

/// Reports the first tag whose name is over the limit
fn tag_lengths(value: &str) -> Result<(), ValidationError> {
    match parse_tags(value)
        .iter()
        .map(|name| name.chars().count())
        .find(|len| *len > TAG_NAME_MAX_LENGTH)
    {
        Some(len) => Err(too_long(TAG_NAME_MAX_LENGTH, len)),
        None => Ok(()),
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn username_field(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let username = value.trim();
    let len = username.chars().count();
    if len > USERNAME_MAX_LENGTH {
        return Err(too_long(USERNAME_MAX_LENGTH, len));
    }
    if !username.chars().all(is_username_char) {
        return Err(invalid(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Blank is allowed, anything else must be a valid address
fn optional_email(value: &str) -> Result<(), ValidationError> {
    let email = value.trim();
    if email.is_empty() || email.to_string().validate_email() {
        return Ok(());
    }
    Err(invalid("email", "Enter a valid email address."))
}

fn password_length(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(ValidationError::new("password_too_short").with_message(Cow::Owned(format!(
            "This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."
        ))));
    }
    Ok(())
}

/// Lower ranks hide higher ones on the same field, so a blank field only
/// reports that it is required
fn rank(error: &ValidationError) -> u8 {
    match &*error.code {
        "required" => 0,
        "must_match" => 1,
        _ => 2,
    }
}

/// Validation messages keyed by form field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field, empty if it is valid
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            let Some(top) = field_errors.iter().map(rank).min() else {
                continue;
            };
            for error in field_errors.iter().filter(|e| rank(e) == top) {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                };
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

fn collect_errors(result: Result<(), ValidationErrors>) -> FormErrors {
    match result {
        Ok(()) => FormErrors::default(),
        Err(errors) => errors.into(),
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// A file received through a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// The create/edit form shared by public and private posts
///
/// Submitted as `multipart/form-data` with the fields `title`, `content`,
/// `tags`, `image` and the `image-clear` checkbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct PostForm {
    #[validate(custom(function = "title_field"))]
    pub title: String,
    #[validate(custom(function = "required"))]
    pub content: String,
    #[validate(custom(function = "tag_lengths"))]
    pub tags: String,
    pub image: Option<UploadedFile>,
    pub clear_image: bool,
}

impl PostForm {
    /// Prefills the form from an existing post
    pub fn from_post(summary: &PostSummary) -> Self {
        let names: Vec<String> = summary.tags.iter().map(|t| t.get_name()).collect();
        Self {
            title: summary.post.get_title(),
            content: summary.post.get_content(),
            tags: edit_string(&names),
            image: None,
            clear_image: false,
        }
    }

    /// Reads the submitted form; unknown fields are ignored
    ///
    /// A file input left empty arrives with no file name and counts as no
    /// upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = PostForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !filename.is_empty() {
                        form.image = Some(UploadedFile { filename, data: data.to_vec() });
                    }
                }
                "title" | "content" | "tags" | "image-clear" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    match name.as_str() {
                        "title" => form.title = value,
                        "content" => form.content = value,
                        "tags" => form.tags = value,
                        _ => form.clear_image = !value.is_empty(),
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn clean_title(&self) -> String {
        self.title.trim().to_string()
    }

    pub fn clean_content(&self) -> String {
        self.content.trim().to_string()
    }

    pub fn tag_names(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    /// Field checks plus the image upload rules, which depend on two fields
    pub fn validate(&self) -> FormErrors {
        let mut errors = collect_errors(Validate::validate(self));

        if let Some(upload) = &self.image {
            if self.clear_image {
                errors.add(
                    "image",
                    "Please either submit a file or check the clear checkbox, not both.",
                );
            } else if upload.data.is_empty() {
                errors.add("image", "The submitted file is empty.");
            } else if image_extension(&upload.filename).is_none() {
                errors.add(
                    "image",
                    format!(
                        "Upload a valid image. Allowed extensions are: {}.",
                        IMAGE_EXTENSIONS.join(", ")
                    ),
                );
            }
        }

        errors
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "required"))]
    pub username: String,
    #[validate(length(min = 1, code = "required", message = "This field is required."))]
    pub password: String,
    pub next: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> FormErrors {
        collect_errors(Validate::validate(self))
    }
}

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Message shown when a login does not match any account
pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Passwords are never trimmed
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(custom(function = "username_field"))]
    pub username: String,
    #[validate(custom(function = "optional_email"))]
    pub email: String,
    #[validate(length(min = 1, code = "required", message = "This field is required."))]
    pub password1: String,
    #[validate(
        length(min = 1, code = "required", message = "This field is required."),
        must_match(other = "password1", message = "The two password fields didn't match."),
        custom(function = "password_length")
    )]
    pub password2: String,
}

impl RegisterForm {
    /// Checks the fields on their own; whether the name is taken is left
    /// to the caller
    pub fn validate(&self) -> FormErrors {
        collect_errors(Validate::validate(self))
    }
}

/// The urlencoded search form
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct SearchForm {
    #[validate(custom(function = "required"))]
    pub search_term: String,
}

impl SearchForm {
    pub fn validate(&self) -> FormErrors {
        collect_errors(Validate::validate(self))
    }
}

/// Query string of a search results page
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SearchQuery {
    pub search_term: Option<String>,
    pub page: Option<String>,
}

/// Query string of a paginated listing
///
/// `page` stays a string so that `last` and malformed values reach the
/// paginator rather than failing extraction.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}
