//! Tests for the account service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    HostedImage, MockImageHost, MockPasswordHasher, MockTokenService, MockUserRepository,
};
use crate::domain::UserCredentials;
use crate::domain::service_test_support::{
    fixture_clock, fixture_timestamp, principal, sample_user,
};

#[derive(Default)]
struct Mocks {
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenService,
    images: MockImageHost,
}

impl Mocks {
    fn build(self) -> UserAccountService<MockUserRepository> {
        UserAccountService::new(
            Arc::new(self.users),
            Arc::new(self.hasher),
            Arc::new(self.tokens),
            Arc::new(self.images),
            fixture_clock(),
        )
    }
}

fn sign_up_request(password: &str) -> SignUpRequest {
    SignUpRequest {
        username: "ann".to_owned(),
        email: " Ann@Example.com ".to_owned(),
        password: password.to_owned(),
        bio: None,
    }
}

#[tokio::test]
async fn sign_up_hashes_password_and_normalises_email() {
    let mut mocks = Mocks::default();
    mocks
        .hasher
        .expect_hash()
        .withf(|password| password == "123456")
        .times(1)
        .return_once(|_| Ok("$argon2id$fixture".to_owned()));
    mocks
        .users
        .expect_create()
        .withf(|user, now| {
            user.email.as_ref() == "ann@example.com"
                && user.password_hash == "$argon2id$fixture"
                && *now == fixture_timestamp()
        })
        .times(1)
        .return_once(|_, _| Ok(sample_user("ann")));

    let user = mocks
        .build()
        .sign_up(sign_up_request("123456"))
        .await
        .expect("sign up succeeds");
    assert_eq!(user.username.as_ref(), "ann");
}

#[tokio::test]
async fn sign_up_rejects_short_password_before_hashing() {
    let error = Mocks::default()
        .build()
        .sign_up(sign_up_request("12345"))
        .await
        .expect_err("short password");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("field details");
    assert_eq!(details["field"], "password");
    assert_eq!(details["code"], "too_short");
}

#[tokio::test]
async fn sign_up_reports_duplicates_as_conflicts() {
    let mut mocks = Mocks::default();
    mocks
        .hasher
        .expect_hash()
        .return_once(|_| Ok("hash".to_owned()));
    mocks
        .users
        .expect_create()
        .return_once(|_, _| Err(UserPersistenceError::duplicate("email")));

    let error = mocks
        .build()
        .sign_up(sign_up_request("123456"))
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "email already taken");
}

#[tokio::test]
async fn login_rejects_unknown_identifier() {
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_find_credentials()
        .return_once(|_| Ok(None));

    let credentials = LoginCredentials::try_from_parts("ghost", "123456").expect("shape");
    let error = mocks.build().login(credentials).await.expect_err("unknown");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "Invalid credentials");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let user = sample_user("ann");
    let mut mocks = Mocks::default();
    mocks.users.expect_find_credentials().return_once(move |_| {
        Ok(Some(UserCredentials {
            user,
            password_hash: "hash".to_owned(),
        }))
    });
    mocks.hasher.expect_verify().return_once(|_, _| Ok(false));

    let credentials = LoginCredentials::try_from_parts("ann", "wrong!").expect("shape");
    let error = mocks.build().login(credentials).await.expect_err("mismatch");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn login_issues_token_for_matching_password() {
    let user = sample_user("ann");
    let user_id = user.id;
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_find_credentials()
        .withf(|identifier| identifier == "ann@example.com")
        .return_once(move |_| {
            Ok(Some(UserCredentials {
                user,
                password_hash: "hash".to_owned(),
            }))
        });
    mocks
        .hasher
        .expect_verify()
        .withf(|password, hash| password == "123456" && hash == "hash")
        .return_once(|_, _| Ok(true));
    mocks
        .tokens
        .expect_issue()
        .withf(move |principal| principal.user_id == user_id)
        .return_once(|_| Ok("signed.jwt.token".to_owned()));

    let credentials =
        LoginCredentials::try_from_parts("ann@example.com", "123456").expect("shape");
    let outcome = mocks.build().login(credentials).await.expect("login");
    assert_eq!(outcome.token, "signed.jwt.token");
    assert_eq!(outcome.user.id, user_id);
}

#[tokio::test]
async fn update_of_another_account_is_forbidden() {
    let error = Mocks::default()
        .build()
        .update_user(
            &principal(UserId::random()),
            UserId::random(),
            UpdateAccountRequest::default(),
        )
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_hashes_new_password() {
    let user = sample_user("ann");
    let id = user.id;
    let mut mocks = Mocks::default();
    mocks
        .hasher
        .expect_hash()
        .return_once(|_| Ok("new-hash".to_owned()));
    mocks
        .users
        .expect_update()
        .withf(|_, changes, _| {
            changes.password_hash.as_deref() == Some("new-hash") && changes.username.is_none()
        })
        .times(1)
        .return_once(move |_, _, _| Ok(Some(user)));

    let request = UpdateAccountRequest {
        password: Some("better-secret".to_owned()),
        ..UpdateAccountRequest::default()
    };
    let updated = mocks
        .build()
        .update_user(&principal(id), id, request)
        .await
        .expect("update");
    assert_eq!(updated.id, id);
}

#[tokio::test]
async fn delete_discards_hosted_picture_even_when_destroy_fails() {
    let mut user = sample_user("ann");
    user.profile_picture = Some("https://img.test/upload/v1/profile_pictures/ann.png".to_owned());
    let id = user.id;
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_delete()
        .times(1)
        .return_once(move |_| Ok(Some(user)));
    mocks
        .images
        .expect_public_id_from_url()
        .return_const(Some("profile_pictures/ann".to_owned()));
    mocks
        .images
        .expect_destroy()
        .withf(|public_id| public_id == "profile_pictures/ann")
        .times(1)
        .return_once(|_| Err(ImageHostError::transport("timeout")));

    mocks
        .build()
        .delete_user(&principal(id), id)
        .await
        .expect("delete succeeds");
}

#[tokio::test]
async fn delete_of_missing_account_is_not_found() {
    let id = UserId::random();
    let mut mocks = Mocks::default();
    mocks.users.expect_delete().return_once(|_| Ok(None));

    let error = mocks
        .build()
        .delete_user(&principal(id), id)
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Vec::new(), "image/png")]
#[case(vec![1, 2, 3], "text/plain")]
#[tokio::test]
async fn upload_rejects_empty_or_non_image_bodies(
    #[case] bytes: Vec<u8>,
    #[case] content_type: &str,
) {
    let id = UserId::random();
    let upload = ProfilePictureUpload {
        bytes,
        content_type: content_type.to_owned(),
    };
    let error = Mocks::default()
        .build()
        .upload_profile_picture(&principal(id), id, upload)
        .await
        .expect_err("rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn upload_replaces_and_discards_previous_picture() {
    let mut user = sample_user("ann");
    user.profile_picture = Some("https://img.test/upload/v1/profile_pictures/old.png".to_owned());
    let id = user.id;
    let stored = user.clone();
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    mocks
        .images
        .expect_upload()
        .withf(|image| image.folder == PROFILE_PICTURE_FOLDER && image.bytes == [9, 9])
        .times(1)
        .return_once(|_| {
            Ok(HostedImage {
                url: "https://img.test/upload/v2/profile_pictures/new.png".to_owned(),
                public_id: "profile_pictures/new".to_owned(),
            })
        });
    mocks
        .users
        .expect_set_profile_picture()
        .withf(|_, url, _| {
            url.as_deref() == Some("https://img.test/upload/v2/profile_pictures/new.png")
        })
        .times(1)
        .return_once(move |_, _, _| Ok(Some(user)));
    mocks
        .images
        .expect_public_id_from_url()
        .withf(|url| url.ends_with("old.png"))
        .return_const(Some("profile_pictures/old".to_owned()));
    mocks
        .images
        .expect_destroy()
        .withf(|public_id| public_id == "profile_pictures/old")
        .times(1)
        .return_once(|_| Ok(()));

    let upload = ProfilePictureUpload {
        bytes: vec![9, 9],
        content_type: "image/png".to_owned(),
    };
    let url = mocks
        .build()
        .upload_profile_picture(&principal(id), id, upload)
        .await
        .expect("upload");
    assert!(url.ends_with("new.png"));
}

#[tokio::test]
async fn upload_without_configured_host_is_unavailable() {
    let user = sample_user("ann");
    let id = user.id;
    let mut mocks = Mocks::default();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    mocks
        .images
        .expect_upload()
        .return_once(|_| Err(ImageHostError::not_configured()));

    let upload = ProfilePictureUpload {
        bytes: vec![1],
        content_type: "image/jpeg".to_owned(),
    };
    let error = mocks
        .build()
        .upload_profile_picture(&principal(id), id, upload)
        .await
        .expect_err("not configured");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("boom"), ErrorCode::InternalError)]
#[case(UserPersistenceError::duplicate("username"), ErrorCode::Conflict)]
fn repository_errors_map_to_domain_codes(
    #[case] error: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    assert_eq!(map_user_error(error).code(), expected);
}
