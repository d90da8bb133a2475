use std::sync::Arc;
use rocket::{Build, Rocket, State, get, post, routes, catchers, form::Form, serde::json::Json, FromForm};
use tracing::{debug, info, instrument};
use pollbot_shared::{Command, Committed};
use crate::{
    catchers::{bad_request, internal_error, not_found, unprocessable},
    registry::PollRegistry,
    reply::{self, Reply},
};

pub struct AppState {
    pub registry: Arc<PollRegistry>,
}

impl AppState {
    pub fn new(registry: PollRegistry) -> Self {
        Self { registry: Arc::new(registry) }
    }
}

/// Slash-command webhook payload.
#[derive(Debug, FromForm)]
pub struct CommandForm {
    pub text: String,
    pub user_name: String,
}

fn note<T>(committed: Committed<T>) -> T {
    if let Some(warning) = &committed.warning {
        debug!("Reply sent despite persistence warning: {}", warning);
    }
    committed.into_inner()
}

/// Parses `text`, runs it against the registry and renders the answer.
pub async fn dispatch(registry: &PollRegistry, user: &str, text: &str) -> Reply {
    let command = match Command::parse(text) {
        Ok(command) => command,
        Err(e) => return Reply::in_channel(reply::command_error(&e)),
    };

    let text = match command {
        Command::Create { question, options } => registry
            .create_poll(&question, options.as_slice(), user)
            .await
            .map(|c| reply::created(&note(c))),
        Command::Vote { poll_id, option } => registry
            .cast_vote(&poll_id, user, option)
            .await
            .map(|c| reply::voted(&note(c))),
        Command::Results { poll_id } => registry.results(&poll_id).map(|t| reply::results(&t)),
        Command::Close { poll_id } => registry
            .close_poll(&poll_id, user)
            .await
            .map(|c| reply::closed(&note(c))),
    };

    Reply::in_channel(text.unwrap_or_else(|e| {
        debug!("Command rejected: {}", e);
        reply::poll_error(&e)
    }))
}

#[instrument(skip(state, form), fields(user = %form.user_name))]
#[post("/command", data = "<form>")]
pub async fn command(state: &State<AppState>, form: Form<CommandForm>) -> Json<Reply> {
    info!("Command from {}: {}", form.user_name, form.text);
    Json(dispatch(&state.registry, &form.user_name, &form.text).await)
}

#[get("/health")]
pub async fn health() -> &'static str {
    "ok"
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![command, health])
        .register("/", catchers![bad_request, not_found, unprocessable, internal_error])
}
