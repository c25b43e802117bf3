// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access policy.
//!
//! Every read, mutation and registration decision goes through this module
//! so handlers never compare owner ids themselves.
//!
//! ## Visibility
//!
//! A post starts unpublished and can move to published exactly once.
//! Published posts are world-readable; unpublished posts are readable only
//! by their owner, and everyone else gets the same `NotFound` a missing
//! post would produce.
//!
//! ## Mutation
//!
//! Only the owner may update or delete a post. There is no administrative
//! override.

use crate::error::AppError;
use crate::models::{AccountId, Post, PostChanges};

/// Maximum email length (per RFC 5321)
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum local-part length (per RFC 5321)
const EMAIL_LOCAL_MAX_LENGTH: usize = 64;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in characters.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Caller-correctable input problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("email address is not valid")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize, actual: usize },

    #[error("password must be at most {max} characters")]
    PasswordTooLong { max: usize, actual: usize },

    #[error("title must not be blank")]
    BlankTitle,

    #[error("body must not be blank")]
    BlankBody,

    #[error("a published post cannot be unpublished")]
    CannotUnpublish,
}

/// Trait for resources that have an owner.
pub trait OwnedResource {
    fn owner(&self) -> AccountId;
}

impl OwnedResource for Post {
    fn owner(&self) -> AccountId {
        self.owner_id
    }
}

/// Whether `requester` may see `post`.
pub fn can_read(post: &Post, requester: Option<AccountId>) -> bool {
    post.published || requester == Some(post.owner_id)
}

/// Whether `requester` may update or delete `resource`.
pub fn can_mutate<R: OwnedResource>(resource: &R, requester: AccountId) -> bool {
    resource.owner() == requester
}

/// Registration precheck. Email uniqueness is enforced later by the
/// repository.
pub fn can_register(email: &str, secret_length: usize) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password_length(secret_length)
}

/// Return the post if the requester may read it, otherwise `NotFound`.
pub fn authorize_read(post: Post, requester: Option<AccountId>) -> Result<Post, AppError> {
    if can_read(&post, requester) {
        Ok(post)
    } else {
        Err(AppError::NotFound("post"))
    }
}

/// `Forbidden` unless the requester owns the resource.
pub fn authorize_mutation<R: OwnedResource>(
    resource: &R,
    requester: AccountId,
) -> Result<(), AppError> {
    if can_mutate(resource, requester) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Basic email shape check. The address is not normalised.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.len() > EMAIL_MAX_LENGTH {
        return Err(ValidationError::InvalidEmail);
    }

    // Must contain exactly one @
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }

    if local.is_empty()
        || local.len() > EMAIL_LOCAL_MAX_LENGTH
        || local.chars().any(char::is_whitespace)
    {
        return Err(ValidationError::InvalidEmail);
    }

    // Dotted domain, every label non-empty and not hyphen-bounded
    let domain_ok = domain.contains('.')
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if !domain_ok {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

pub fn validate_password_length(length: usize) -> Result<(), ValidationError> {
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: length,
        });
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong {
            max: MAX_PASSWORD_LENGTH,
            actual: length,
        });
    }
    Ok(())
}

fn has_content(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Content rules for a new post.
pub fn validate_new_post(title: &str, body: &str) -> Result<(), ValidationError> {
    if !has_content(title) {
        return Err(ValidationError::BlankTitle);
    }
    if !has_content(body) {
        return Err(ValidationError::BlankBody);
    }
    Ok(())
}

/// Content and visibility rules for a partial update of `post`.
pub fn validate_post_update(post: &Post, changes: &PostChanges) -> Result<(), ValidationError> {
    if changes.title.as_deref().is_some_and(|t| !has_content(t)) {
        return Err(ValidationError::BlankTitle);
    }
    if changes.body.as_deref().is_some_and(|b| !has_content(b)) {
        return Err(ValidationError::BlankBody);
    }
    if post.published && changes.published == Some(false) {
        return Err(ValidationError::CannotUnpublish);
    }
    Ok(())
}
