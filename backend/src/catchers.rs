use rocket::{Request, catch, serde::json::Json};
use crate::reply::Reply;

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<Reply> {
    Json(Reply::in_channel("Invalid request parameters."))
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<Reply> {
    Json(Reply::in_channel(format!("Nothing is served at {}. Send commands to /command.", req.uri().path())))
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<Reply> {
    Json(Reply::in_channel("A command needs both `text` and `user_name` form fields."))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<Reply> {
    Json(Reply::in_channel("An internal server error occurred."))
}
