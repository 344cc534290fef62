//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint of the inbound layer, the
//! domain payloads they exchange and the bearer token security scheme. The
//! document backs Swagger UI in debug builds and is exported by the
//! `openapi-dump` binary for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, User};
use crate::inbound::http::schemas::{DeletedBody, MessageBody, PointBody};

/// Adds the `BearerToken` JWT scheme referenced by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Token returned by POST /api/v1/users/login."))
            .build();
        components.add_security_scheme("BearerToken", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "SnapTrack API",
        description = "Location-guessing journeys: accounts, friends, groups, journeys, steps, ratings and scores."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::sign_up,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::upload_profile_picture,
        crate::inbound::http::users::remove_profile_picture,
        crate::inbound::http::friends::list_friendships,
        crate::inbound::http::friends::send_request,
        crate::inbound::http::friends::accept_request,
        crate::inbound::http::friends::refuse_request,
        crate::inbound::http::friends::pending_requests,
        crate::inbound::http::friends::sent_requests,
        crate::inbound::http::friends::unfriends,
        crate::inbound::http::friends::friend_list,
        crate::inbound::http::friends::delete_friend,
        crate::inbound::http::groups::list_groups,
        crate::inbound::http::groups::create_group,
        crate::inbound::http::groups::groups_of_user,
        crate::inbound::http::groups::get_group,
        crate::inbound::http::groups::update_group,
        crate::inbound::http::groups::delete_group,
        crate::inbound::http::groups::group_members,
        crate::inbound::http::groups::remove_member,
        crate::inbound::http::memberships::list_memberships,
        crate::inbound::http::memberships::create_membership,
        crate::inbound::http::memberships::members_of_group,
        crate::inbound::http::memberships::pending_invites,
        crate::inbound::http::memberships::get_membership,
        crate::inbound::http::memberships::update_membership,
        crate::inbound::http::memberships::delete_membership,
        crate::inbound::http::memberships::accept_invite,
        crate::inbound::http::memberships::decline_invite,
        crate::inbound::http::journeys::list_journeys,
        crate::inbound::http::journeys::create_journey,
        crate::inbound::http::journeys::get_journey,
        crate::inbound::http::journeys::update_journey,
        crate::inbound::http::journeys::delete_journey,
        crate::inbound::http::steps::list_steps,
        crate::inbound::http::steps::steps_of_journey,
        crate::inbound::http::steps::create_step,
        crate::inbound::http::steps::get_step,
        crate::inbound::http::steps::update_step,
        crate::inbound::http::steps::delete_step,
        crate::inbound::http::steps::guess_step,
        crate::inbound::http::participations::list_participations,
        crate::inbound::http::participations::create_participation,
        crate::inbound::http::participations::get_participation,
        crate::inbound::http::participations::update_participation,
        crate::inbound::http::participations::delete_participation,
        crate::inbound::http::user_journeys::list_user_journeys,
        crate::inbound::http::user_journeys::save_journey,
        crate::inbound::http::user_journeys::move_journey,
        crate::inbound::http::user_journeys::delete_saved_journey,
        crate::inbound::http::ratings::rate_journey,
        crate::inbound::http::ratings::list_ratings,
        crate::inbound::http::ratings::average_rating,
        crate::inbound::http::scores::list_scores,
        crate::inbound::http::scores::submit_score,
        crate::inbound::http::scores::score_summary,
        crate::inbound::http::scores::score_totals,
        crate::inbound::http::scores::global_leaderboard,
        crate::inbound::http::scores::journey_scores,
        crate::inbound::http::scores::user_scores,
        crate::inbound::http::scores::get_score,
        crate::inbound::http::scores::update_score,
        crate::inbound::http::scores::delete_score,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::routes::index,
    ),
    components(schemas(Error, ErrorCode, User, MessageBody, DeletedBody, PointBody)),
    tags(
        (name = "index", description = "API banner"),
        (name = "users", description = "Accounts, login and profile pictures"),
        (name = "friends", description = "Friend requests and friend lists"),
        (name = "groups", description = "Groups and their rosters"),
        (name = "memberships", description = "Group memberships and invitations"),
        (name = "journeys", description = "Journeys and their targets"),
        (name = "steps", description = "Journey steps and location guesses"),
        (name = "participations", description = "Journey invitations and participation status"),
        (name = "user-journeys", description = "Journeys saved by users"),
        (name = "ratings", description = "Journey ratings"),
        (name = "scores", description = "Scores, summaries and leaderboards"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("User", "id")]
    #[case("User", "username")]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/users/login")]
    #[case("/api/v1/scores/leaderboard/global")]
    #[case("/api/v1/steps/{id}/guess")]
    #[case("/health/ready")]
    fn documents_key_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn registers_bearer_security_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
