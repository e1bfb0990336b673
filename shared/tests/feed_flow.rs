mod common;

use common::*;
use shared::capabilities::{BackendError, BackendOperation, BackendOutput};
use shared::{Event, FeedScope, Model, RecipeId, Settings, ToastKind, UserId};

fn loaded(app: &Tester) -> Model {
    let mut model = Model::default();
    sign_in(app, &mut model, "me");
    load_feed(
        app,
        &mut model,
        vec![
            recipe("r1", "u1", "Pancakes", Some("Breakfast")),
            recipe("r2", "u2", "Brownies", Some("Dessert")),
            recipe("r3", "u2", "Omelette", Some("breakfast")),
        ],
        &["u2"],
    );
    model
}

#[test]
fn favorite_is_optimistic_and_rolls_back_on_failure() {
    let app = Tester::default();
    let mut model = loaded(&app);

    let effects = app
        .update(
            Event::ToggleFavorite {
                recipe_id: RecipeId::new("r1"),
            },
            &mut model,
        )
        .effects;
    assert!(model.feed.recipe(&RecipeId::new("r1")).unwrap().is_favorite);

    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::SetFavorite { favorite: true, .. })
    });

    // A second tap while the first is in flight is ignored.
    let again = app.update(
        Event::ToggleFavorite {
            recipe_id: RecipeId::new("r1"),
        },
        &mut model,
    );
    assert!(backend_requests(again.effects).is_empty());
    assert!(model.feed.recipe(&RecipeId::new("r1")).unwrap().is_favorite);

    resolve_backend(&app, &mut model, request, Err(BackendError::Network));
    assert!(!model.feed.recipe(&RecipeId::new("r1")).unwrap().is_favorite);
    assert!(!model.feed.is_favorite_pending(&RecipeId::new("r1")));
    assert_eq!(model.active_toast.as_ref().map(|t| t.kind), Some(ToastKind::Warning));
}

#[test]
fn confirmed_favorite_shows_in_favorites() {
    let app = Tester::default();
    let mut model = loaded(&app);

    let effects = app
        .update(
            Event::ToggleFavorite {
                recipe_id: RecipeId::new("r2"),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| matches!(op, BackendOperation::SetFavorite { .. }));
    resolve_backend(&app, &mut model, request, Ok(BackendOutput::Done));

    let view = app.view(&model);
    let favorites: Vec<_> = view.favorites.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(favorites, vec!["r2"]);
    assert!(!view.favorites[0].is_favorite_pending);
}

#[test]
fn guests_cannot_favorite_or_filter_by_following() {
    let app = Tester::default();
    let mut model = Model::default();
    load_feed(&app, &mut model, vec![recipe("r1", "u1", "Soup", None)], &[]);

    let update = app.update(
        Event::ToggleFavorite {
            recipe_id: RecipeId::new("r1"),
        },
        &mut model,
    );
    assert!(backend_requests(update.effects).is_empty());
    assert!(!model.feed.recipe(&RecipeId::new("r1")).unwrap().is_favorite);

    app.update(
        Event::SelectScope {
            scope: FeedScope::FollowingOnly,
        },
        &mut model,
    );
    assert_eq!(model.feed.scope(), FeedScope::All);
    assert_eq!(model.active_toast.as_ref().map(|t| t.kind), Some(ToastKind::Warning));
}

#[test]
fn scope_and_category_filters_keep_cached_order() {
    let app = Tester::default();
    let mut model = loaded(&app);

    app.update(
        Event::SelectScope {
            scope: FeedScope::FollowingOnly,
        },
        &mut model,
    );
    assert_eq!(visible_ids(&model), vec!["r2", "r3"]);

    app.update(
        Event::SelectCategory {
            category: "Breakfast".into(),
        },
        &mut model,
    );
    assert_eq!(visible_ids(&model), vec!["r3"]);

    // Same category again clears it.
    let update = app.update(
        Event::SelectCategory {
            category: "Breakfast".into(),
        },
        &mut model,
    );
    assert!(backend_requests(update.effects).is_empty());
    assert_eq!(visible_ids(&model), vec!["r2", "r3"]);
}

#[test]
fn unfollow_under_following_scope_updates_visible_list() {
    let app = Tester::default();
    let mut model = loaded(&app);
    app.update(
        Event::SelectScope {
            scope: FeedScope::FollowingOnly,
        },
        &mut model,
    );

    let effects = app
        .update(
            Event::ToggleFollow {
                user_id: UserId::new("u2"),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::SetFollow { follow: false, .. })
    });
    resolve_backend(&app, &mut model, request, Ok(BackendOutput::Following(false)));

    assert!(visible_ids(&model).is_empty());
    assert!(!model.feed.is_following(&UserId::new("u2")));
}

#[test]
fn failed_unfollow_keeps_followed_set() {
    let app = Tester::default();
    let mut model = loaded(&app);
    app.update(
        Event::SelectScope {
            scope: FeedScope::FollowingOnly,
        },
        &mut model,
    );

    let effects = app
        .update(
            Event::ToggleFollow {
                user_id: UserId::new("u2"),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::SetFollow { follow: false, .. })
    });
    resolve_backend(&app, &mut model, request, Err(BackendError::Network));

    assert_eq!(visible_ids(&model), vec!["r2", "r3"]);
    assert!(model.feed.is_following(&UserId::new("u2")));
    assert_eq!(model.active_toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
    assert!(app.view(&model).error.is_none());
}

#[test]
fn expired_session_raises_global_error_until_dismissed() {
    let app = Tester::default();
    let mut model = loaded(&app);

    let effects = app
        .update(
            Event::ToggleFollow {
                user_id: UserId::new("u1"),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::SetFollow { follow: true, .. })
    });
    resolve_backend(&app, &mut model, request, Err(BackendError::Unauthorized));

    let error = app.view(&model).error.expect("global error is shown");
    assert_eq!(error.error_code, "AUTH_ERROR");
    assert_eq!(error.message, "Please sign in to continue.");
    assert!(!error.is_retryable);
    assert!(model.active_toast.is_none());
    assert!(!model.feed.is_following(&UserId::new("u1")));

    app.update(Event::DismissError, &mut model);
    assert!(app.view(&model).error.is_none());
}

#[test]
fn switching_to_guest_mode_resets_following_scope() {
    let app = Tester::default();
    let mut model = loaded(&app);
    app.update(
        Event::SelectScope {
            scope: FeedScope::FollowingOnly,
        },
        &mut model,
    );
    assert_eq!(visible_ids(&model), vec!["r2", "r3"]);

    app.update(
        Event::SettingsChanged(Settings {
            guest_mode: true,
            ..Settings::default()
        }),
        &mut model,
    );

    assert_eq!(model.feed.scope(), FeedScope::All);
    assert_eq!(visible_ids(&model), vec!["r1", "r2", "r3"]);
    assert!(!app.view(&model).is_authenticated);
}

#[test]
fn signing_out_forgets_followed_cooks() {
    let app = Tester::default();
    let mut model = loaded(&app);
    app.update(
        Event::SelectScope {
            scope: FeedScope::FollowingOnly,
        },
        &mut model,
    );

    app.update(Event::SignedOut, &mut model);

    assert!(!model.feed.is_following(&UserId::new("u2")));
    assert_eq!(model.feed.scope(), FeedScope::All);
    assert_eq!(visible_ids(&model), vec!["r1", "r2", "r3"]);
    assert!(!app.view(&model).feed.recipes[1].is_following_author);
}

#[test]
fn failed_reload_keeps_previous_list() {
    let app = Tester::default();
    let mut model = loaded(&app);

    let effects = app.update(Event::ReloadFeed, &mut model).effects;
    let request = take_backend(effects, |op| matches!(op, BackendOperation::FetchAllRecipes));

    // Coalesced while in flight.
    let again = app.update(Event::ReloadFeed, &mut model);
    assert!(backend_requests(again.effects)
        .iter()
        .all(|r| !matches!(r.operation, BackendOperation::FetchAllRecipes)));

    resolve_backend(&app, &mut model, request, Err(BackendError::Network));

    assert_eq!(visible_ids(&model), vec!["r1", "r2", "r3"]);
    assert!(model.feed.error.is_some());
    assert!(!model.feed.is_loading);
    assert_eq!(model.active_toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
}

#[test]
fn view_renders_cards_and_category_chips() {
    let app = Tester::default();
    let mut model = loaded(&app);
    app.update(
        Event::SelectCategory {
            category: "dessert".into(),
        },
        &mut model,
    );

    let view = app.view(&model);
    assert_eq!(view.feed.recipes.len(), 1);
    let card = &view.feed.recipes[0];
    assert_eq!(card.title, "Brownies");
    assert_eq!(card.author, "cook-u2");
    assert_eq!(card.rating_label, "New");
    assert_eq!(card.cook_time_label.as_deref(), Some("15 min"));
    assert!(card.is_following_author);
    assert!(!card.is_mine);

    let selected: Vec<_> = view
        .feed
        .categories
        .iter()
        .filter(|c| c.selected)
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(selected, vec!["Dessert"]);
}
