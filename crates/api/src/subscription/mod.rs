mod cancel_subscription;
mod create_subscription;
mod delete_subscription;
mod get_user_subscriptions;
mod update_subscription;

use actix_web::web;
use cancel_subscription::cancel_subscription_controller;
use create_subscription::create_subscription_controller;
use delete_subscription::delete_subscription_controller;
use get_user_subscriptions::get_user_subscriptions_controller;
use update_subscription::update_subscription_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/user/{user_id}/subscriptions",
        web::post().to(create_subscription_controller),
    );
    cfg.route(
        "/user/{user_id}/subscriptions",
        web::get().to(get_user_subscriptions_controller),
    );
    cfg.route(
        "/subscriptions/{subscription_id}",
        web::put().to(update_subscription_controller),
    );
    cfg.route(
        "/subscriptions/{subscription_id}",
        web::delete().to(delete_subscription_controller),
    );
    cfg.route(
        "/subscriptions/{subscription_id}/cancel",
        web::put().to(cancel_subscription_controller),
    );
}
