//! Route table for the `/api/v1` scope.
//!
//! Literal segments are registered before `{id}` captures sharing the same
//! prefix so that, for example, `/scores/summary` never parses as a score id.

use actix_web::{get, web};

use crate::inbound::http::schemas::MessageBody;
use crate::inbound::http::{
    friends, groups, journeys, memberships, participations, ratings, scores, steps,
    user_journeys, users,
};

/// API banner.
#[utoipa::path(
    get,
    path = "/api/v1",
    responses((status = 200, description = "API is up", body = MessageBody)),
    tags = ["index"],
    operation_id = "index",
    security([])
)]
#[get("")]
pub async fn index() -> web::Json<MessageBody> {
    web::Json(MessageBody::new("Ignition!"))
}

/// Register every REST handler on `cfg`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(users::login)
        .service(users::list_users)
        .service(users::sign_up)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::upload_profile_picture)
        .service(users::remove_profile_picture)
        .service(friends::list_friendships)
        .service(friends::send_request)
        .service(friends::accept_request)
        .service(friends::refuse_request)
        .service(friends::pending_requests)
        .service(friends::sent_requests)
        .service(friends::unfriends)
        .service(friends::friend_list)
        .service(friends::delete_friend)
        .service(groups::list_groups)
        .service(groups::create_group)
        .service(groups::groups_of_user)
        .service(groups::get_group)
        .service(groups::update_group)
        .service(groups::delete_group)
        .service(groups::group_members)
        .service(groups::remove_member)
        .service(memberships::list_memberships)
        .service(memberships::create_membership)
        .service(memberships::members_of_group)
        .service(memberships::pending_invites)
        .service(memberships::get_membership)
        .service(memberships::update_membership)
        .service(memberships::delete_membership)
        .service(memberships::accept_invite)
        .service(memberships::decline_invite)
        .service(journeys::list_journeys)
        .service(journeys::create_journey)
        .service(journeys::get_journey)
        .service(journeys::update_journey)
        .service(journeys::delete_journey)
        .service(steps::list_steps)
        .service(steps::create_step)
        .service(steps::steps_of_journey)
        .service(steps::get_step)
        .service(steps::update_step)
        .service(steps::delete_step)
        .service(steps::guess_step)
        .service(participations::list_participations)
        .service(participations::create_participation)
        .service(participations::get_participation)
        .service(participations::update_participation)
        .service(participations::delete_participation)
        .service(user_journeys::list_user_journeys)
        .service(user_journeys::save_journey)
        .service(user_journeys::move_journey)
        .service(user_journeys::delete_saved_journey)
        .service(ratings::rate_journey)
        .service(ratings::list_ratings)
        .service(ratings::average_rating)
        .service(scores::list_scores)
        .service(scores::submit_score)
        .service(scores::score_summary)
        .service(scores::score_totals)
        .service(scores::global_leaderboard)
        .service(scores::journey_scores)
        .service(scores::user_scores)
        .service(scores::get_score)
        .service(scores::update_score)
        .service(scores::delete_score);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::json;

    use crate::inbound::http::test_utils::{TestPorts, send};

    #[actix_web::test]
    async fn index_answers_with_banner() {
        let (status, body) =
            send(TestPorts::default(), actix_test::TestRequest::get().uri("/api/v1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Ignition!"}));
    }

    #[actix_web::test]
    async fn unknown_routes_are_not_found() {
        let (status, _) = send(
            TestPorts::default(),
            actix_test::TestRequest::get().uri("/api/v1/nowhere/at/all"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
