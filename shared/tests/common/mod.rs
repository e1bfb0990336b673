#![allow(dead_code)]

use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use shared::capabilities::{BackendOperation, BackendResult, TimerOperation};
use shared::{App, Effect, Event, Model, Recipe, RecipeId, UserId};

pub type Tester = AppTester<App, Effect>;

pub fn recipe(id: &str, owner: &str, title: &str, category: Option<&str>) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        user_id: UserId::new(owner),
        title: title.into(),
        ingredients: "salt\nwater".into(),
        instructions: "Boil water\nCook pasta 10 minutes\nServe".into(),
        image_url: None,
        category: category.map(str::to_string),
        average_rating: 0.0,
        rating_count: 0,
        created_at: None,
        username: Some(format!("cook-{owner}")),
        time_minutes: 15,
        is_favorite: false,
    }
}

pub fn backend_requests(effects: Vec<Effect>) -> Vec<Request<BackendOperation>> {
    effects
        .into_iter()
        .filter_map(|e| match e {
            Effect::Backend(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn timer_requests(effects: Vec<Effect>) -> Vec<Request<TimerOperation>> {
    effects
        .into_iter()
        .filter_map(|e| match e {
            Effect::Timer(request) => Some(request),
            _ => None,
        })
        .collect()
}

/// Pull the single backend request matching `pred` out of `effects`.
pub fn take_backend(
    effects: Vec<Effect>,
    pred: impl Fn(&BackendOperation) -> bool,
) -> Request<BackendOperation> {
    let mut matching: Vec<_> = backend_requests(effects)
        .into_iter()
        .filter(|r| pred(&r.operation))
        .collect();
    assert_eq!(matching.len(), 1, "expected exactly one matching backend request");
    matching.remove(0)
}

/// Feed every event an update produced back into the app and collect the
/// resulting effects.
pub fn run_events(app: &Tester, model: &mut Model, update: Update<Effect, Event>) -> Vec<Effect> {
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

pub fn resolve_backend(
    app: &Tester,
    model: &mut Model,
    mut request: Request<BackendOperation>,
    result: BackendResult,
) -> Vec<Effect> {
    let update = app
        .resolve(&mut request, result)
        .expect("backend request should resolve");
    run_events(app, model, update)
}

pub fn sign_in(app: &Tester, model: &mut Model, user: &str) {
    app.update(
        Event::SignedIn {
            user_id: UserId::new(user),
            username: Some(user.to_string()),
        },
        model,
    );
}

/// Reload the feed and answer it with `recipes` and, when signed in,
/// `followed`.
pub fn load_feed(app: &Tester, model: &mut Model, recipes: Vec<Recipe>, followed: &[&str]) {
    use shared::capabilities::BackendOutput;

    let effects = app.update(Event::ReloadFeed, model).effects;
    let mut requests = backend_requests(effects);
    for request in requests.drain(..) {
        let output = match request.operation {
            BackendOperation::FetchAllRecipes => BackendOutput::Recipes(recipes.clone()),
            BackendOperation::FetchFollowedUserIds { .. } => {
                BackendOutput::UserIds(followed.iter().map(|u| UserId::new(*u)).collect())
            }
            ref other => panic!("unexpected request during reload: {other:?}"),
        };
        resolve_backend(app, model, request, Ok(output));
    }
}

pub fn visible_ids(model: &Model) -> Vec<String> {
    model
        .feed
        .visible()
        .iter()
        .map(|r| r.id.to_string())
        .collect()
}
