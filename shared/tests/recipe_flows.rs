mod common;

use common::*;
use shared::capabilities::{BackendError, BackendOperation, BackendOutput};
use shared::editor::DraftField;
use shared::model::{Comment, CommentId, ShoppingItem, ShoppingItemId, UserProfile};
use shared::{Event, Model, RecipeId, ToastKind, UserId};

fn signed_in_with_feed(app: &Tester) -> Model {
    let mut model = Model::default();
    sign_in(app, &mut model, "me");
    let mut soup = recipe("r1", "u1", "Tomato Soup", Some("Lunch"));
    soup.ingredients = "tomato\nbasil".into();
    let mut salad = recipe("r2", "me", "Walnut Salad", Some("Lunch"));
    salad.ingredients = "lettuce\nwalnut\ntomato".into();
    load_feed(app, &mut model, vec![soup, salad], &[]);
    model
}

#[test]
fn search_drops_stale_responses_and_falls_back_to_cache() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);

    let update = app.update(Event::SearchQueryChanged { query: "t".into() }, &mut model);
    assert!(backend_requests(update.effects).is_empty());
    assert_eq!(
        app.view(&model).search.hint.as_deref(),
        Some("Type at least 2 characters to search.")
    );

    let stale = take_backend(
        app.update(Event::SearchQueryChanged { query: "tom".into() }, &mut model)
            .effects,
        |op| matches!(op, BackendOperation::SearchRecipes { .. }),
    );
    let current = take_backend(
        app.update(
            Event::SearchQueryChanged {
                query: "tomato".into(),
            },
            &mut model,
        )
        .effects,
        |op| matches!(op, BackendOperation::SearchRecipes { query } if query == "tomato"),
    );

    resolve_backend(
        &app,
        &mut model,
        stale,
        Ok(BackendOutput::Recipes(vec![recipe("x", "u9", "Tomb", None)])),
    );
    assert!(model.search.results().is_empty());

    resolve_backend(&app, &mut model, current, Err(BackendError::Network));
    let view = app.view(&model);
    assert!(view.search.is_offline_results);
    assert!(view.search.error.is_some());
    let ids: Vec<_> = view.search.results.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);

    app.update(
        Event::AddExcludedIngredient {
            ingredient: "Walnut".into(),
        },
        &mut model,
    );
    let ids: Vec<_> = app
        .view(&model)
        .search
        .results
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(ids, vec!["r1"]);
}

#[test]
fn detail_loads_comments_rating_and_follow_state() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);

    let effects = app
        .update(
            Event::OpenRecipe {
                recipe_id: RecipeId::new("r1"),
            },
            &mut model,
        )
        .effects;
    let mut requests = backend_requests(effects);
    assert_eq!(requests.len(), 3);
    assert_eq!(
        app.view(&model).detail.unwrap().recipe.unwrap().title,
        "Tomato Soup",
        "cached recipe shown while loading"
    );

    let mut follow_requests = Vec::new();
    for request in requests.drain(..) {
        let output = match &request.operation {
            BackendOperation::FetchRecipeById { .. } => {
                BackendOutput::Recipe(recipe("r1", "u1", "Tomato Soup v2", Some("Lunch")))
            }
            BackendOperation::FetchComments { recipe_id } => BackendOutput::Comments(vec![Comment {
                id: CommentId::new("c1"),
                user_id: UserId::new("u3"),
                recipe_id: recipe_id.clone(),
                content: "Lovely".into(),
                rating: 5,
                created_at: None,
                username: None,
                like_count: 1,
                is_liked_by_me: false,
                reply_count: 0,
            }]),
            BackendOperation::FetchUserRating { .. } => BackendOutput::Rating(Some(4)),
            other => panic!("unexpected request: {other:?}"),
        };
        follow_requests.extend(backend_requests(resolve_backend(
            &app,
            &mut model,
            request,
            Ok(output),
        )));
    }

    let follow = follow_requests
        .into_iter()
        .find(|r| matches!(r.operation, BackendOperation::FetchIsFollowing { .. }))
        .expect("follow state requested for someone else's recipe");
    resolve_backend(&app, &mut model, follow, Ok(BackendOutput::Following(true)));

    let view = app.view(&model).detail.unwrap();
    assert_eq!(view.recipe.unwrap().title, "Tomato Soup v2");
    assert_eq!(view.user_rating, Some(4));
    assert_eq!(view.comments.len(), 1);
    assert_eq!(view.comments[0].author, "Anonymous");
    assert!(view.can_follow);
    assert!(!view.can_edit);
    assert!(model.feed.is_following(&UserId::new("u1")));
}

#[test]
fn invalid_rating_and_blank_comment_are_rejected_locally() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);
    app.update(
        Event::OpenRecipe {
            recipe_id: RecipeId::new("r1"),
        },
        &mut model,
    );

    let update = app.update(Event::RateRecipe { rating: 6 }, &mut model);
    assert!(backend_requests(update.effects).is_empty());
    assert_eq!(model.active_toast.as_ref().map(|t| t.kind), Some(ToastKind::Warning));

    let update = app.update(
        Event::AddComment {
            content: "   ".into(),
            rating: 5,
        },
        &mut model,
    );
    assert!(backend_requests(update.effects).is_empty());

    let effects = app
        .update(
            Event::AddComment {
                content: " Great! ".into(),
                rating: 5,
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::AddComment { content, .. } if content == "Great!")
    });
    let effects = resolve_backend(&app, &mut model, request, Ok(BackendOutput::Done));
    assert_eq!(
        model.active_toast.as_ref().map(|t| t.message.as_str()),
        Some("Thank you for your review!")
    );
    take_backend(effects, |op| matches!(op, BackendOperation::FetchComments { .. }));
}

#[test]
fn owner_can_delete_recipe() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);
    app.update(
        Event::OpenRecipe {
            recipe_id: RecipeId::new("r2"),
        },
        &mut model,
    );

    let effects = app.update(Event::DeleteRecipe, &mut model).effects;
    let request = take_backend(effects, |op| matches!(op, BackendOperation::DeleteRecipe { .. }));
    resolve_backend(&app, &mut model, request, Ok(BackendOutput::Done));

    assert!(model.feed.recipe(&RecipeId::new("r2")).is_none());
    assert!(app.view(&model).detail.unwrap().is_deleted);
}

fn fill_toast_draft(app: &Tester, model: &mut Model) {
    for (field, value) in [
        (DraftField::Title, "Toast"),
        (DraftField::Ingredients, "bread"),
        (DraftField::Instructions, "Toast it 3 min"),
        (DraftField::Category, "breakfast"),
    ] {
        app.update(
            Event::DraftFieldChanged {
                field,
                value: value.into(),
            },
            model,
        );
    }
}

#[test]
fn create_stamps_timestamp_and_reloads_feed() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);

    app.update(Event::NewRecipe, &mut model);
    let update = app.update(Event::SaveRecipe, &mut model);
    assert!(backend_requests(update.effects).is_empty());
    assert_eq!(
        app.view(&model).editor.unwrap().error.as_deref(),
        Some("Please fill all required fields.")
    );

    fill_toast_draft(&app, &mut model);
    let effects = app.update(Event::SaveRecipe, &mut model).effects;
    let request = take_backend(effects, |op| match op {
        BackendOperation::CreateRecipe { recipe } => {
            recipe.created_at.is_some()
                && recipe.user_id == UserId::new("me")
                && recipe.category.as_deref() == Some("Breakfast")
        }
        _ => false,
    });
    let effects = resolve_backend(&app, &mut model, request, Ok(BackendOutput::Done));

    assert!(app.view(&model).editor.unwrap().is_saved);
    assert!(model.feed.all_recipes().iter().any(|r| r.title == "Toast"));
    take_backend(effects, |op| matches!(op, BackendOperation::FetchAllRecipes));
}

#[test]
fn recipe_saved_during_reload_queues_another_reload() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);
    let before_save = model.feed.all_recipes().to_vec();

    let in_flight = take_backend(
        app.update(Event::ReloadFeed, &mut model).effects,
        |op| matches!(op, BackendOperation::FetchAllRecipes),
    );

    app.update(Event::NewRecipe, &mut model);
    fill_toast_draft(&app, &mut model);
    let request = take_backend(
        app.update(Event::SaveRecipe, &mut model).effects,
        |op| matches!(op, BackendOperation::CreateRecipe { .. }),
    );
    let effects = resolve_backend(&app, &mut model, request, Ok(BackendOutput::Done));

    // Visible right away, and the running reload is not duplicated.
    assert!(backend_requests(effects).is_empty());
    assert!(app.view(&model).feed.recipes.iter().any(|c| c.title == "Toast"));

    // The older reload lands without the new recipe; a fresh one follows.
    let effects = resolve_backend(
        &app,
        &mut model,
        in_flight,
        Ok(BackendOutput::Recipes(before_save)),
    );
    take_backend(effects, |op| matches!(op, BackendOperation::FetchAllRecipes));
    assert!(model.feed.is_loading);
    assert!(!model.feed.reload_queued);
}

#[test]
fn edit_keeps_original_timestamp() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model, "me");
    let mut mine = recipe("r5", "me", "Stew", None);
    mine.created_at = Some(shared::UnixTimeMs(1_700_000_000_000));
    load_feed(&app, &mut model, vec![mine], &[]);

    app.update(
        Event::EditRecipe {
            recipe_id: RecipeId::new("r5"),
        },
        &mut model,
    );
    app.update(
        Event::DraftFieldChanged {
            field: DraftField::Title,
            value: "Beef Stew".into(),
        },
        &mut model,
    );
    let effects = app.update(Event::SaveRecipe, &mut model).effects;
    take_backend(effects, |op| match op {
        BackendOperation::UpdateRecipe { recipe } => {
            recipe.id == RecipeId::new("r5")
                && recipe.title == "Beef Stew"
                && recipe.created_at == Some(shared::UnixTimeMs(1_700_000_000_000))
        }
        _ => false,
    });
}

#[test]
fn shopping_list_round_trip() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);

    let effects = app.update(Event::LoadShoppingList, &mut model).effects;
    let request = take_backend(effects, |op| matches!(op, BackendOperation::FetchShoppingItems));
    resolve_backend(
        &app,
        &mut model,
        request,
        Ok(BackendOutput::ShoppingItems(vec![ShoppingItem {
            id: ShoppingItemId::new("s1"),
            user_id: UserId::new("me"),
            item_name: "milk".into(),
            is_checked: false,
        }])),
    );

    let update = app.update(
        Event::AddShoppingItem {
            item_name: "  ".into(),
        },
        &mut model,
    );
    assert!(backend_requests(update.effects).is_empty());

    let effects = app
        .update(
            Event::AddIngredientToShoppingList {
                ingredient: " basil ".into(),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::AddShoppingItem { item_name } if item_name == "basil")
    });
    resolve_backend(
        &app,
        &mut model,
        request,
        Ok(BackendOutput::ShoppingItem(ShoppingItem {
            id: ShoppingItemId::new("s2"),
            user_id: UserId::new("me"),
            item_name: "basil".into(),
            is_checked: false,
        })),
    );

    let effects = app
        .update(
            Event::ToggleShoppingItem {
                item_id: ShoppingItemId::new("s1"),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::SetShoppingItemChecked { checked: true, .. })
    });
    resolve_backend(&app, &mut model, request, Err(BackendError::Network));
    assert_eq!(app.view(&model).shopping.remaining, 2, "failed toggle leaves list unchanged");

    let effects = app
        .update(
            Event::DeleteShoppingItem {
                item_id: ShoppingItemId::new("s1"),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| matches!(op, BackendOperation::DeleteShoppingItem { .. }));
    resolve_backend(&app, &mut model, request, Ok(BackendOutput::Done));

    let view = app.view(&model).shopping;
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].name, "basil");
}

fn profile(id: &str, username: &str, is_me: bool) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        username: Some(username.into()),
        avatar_url: None,
        follower_count: 4,
        following_count: 2,
        is_following: false,
        is_me,
    }
}

#[test]
fn profile_lists_recipes_and_follow_moves_follower_count() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);

    let effects = app
        .update(
            Event::OpenProfile {
                user_id: Some(UserId::new("u1")),
            },
            &mut model,
        )
        .effects;
    let request = take_backend(effects, |op| {
        matches!(op, BackendOperation::FetchProfile { user_id } if user_id == &UserId::new("u1"))
    });
    resolve_backend(
        &app,
        &mut model,
        request,
        Ok(BackendOutput::Profile(profile("u1", "cook-u1", false))),
    );

    let view = app.view(&model).profile.expect("profile open");
    assert_eq!(view.username, "cook-u1");
    assert!(!view.is_me);
    assert!(view.can_follow);
    let ids: Vec<_> = view.recipes.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["r1"]);

    let request = take_backend(
        app.update(
            Event::ToggleFollow {
                user_id: UserId::new("u1"),
            },
            &mut model,
        )
        .effects,
        |op| matches!(op, BackendOperation::SetFollow { follow: true, .. }),
    );
    resolve_backend(&app, &mut model, request, Ok(BackendOutput::Following(true)));

    let view = app.view(&model).profile.unwrap();
    assert!(view.is_following);
    assert_eq!(view.follower_count, 5);
    assert!(model.feed.is_following(&UserId::new("u1")));

    app.update(Event::ToggleProfileEditing, &mut model);
    assert!(!app.view(&model).profile.unwrap().is_editing);
}

#[test]
fn own_profile_username_is_validated_and_saved() {
    let app = Tester::default();
    let mut model = signed_in_with_feed(&app);

    let request = take_backend(
        app.update(Event::OpenProfile { user_id: None }, &mut model)
            .effects,
        |op| matches!(op, BackendOperation::FetchProfile { user_id } if user_id == &UserId::new("me")),
    );
    resolve_backend(
        &app,
        &mut model,
        request,
        Ok(BackendOutput::Profile(profile("me", "me", true))),
    );

    app.update(Event::ToggleProfileEditing, &mut model);
    app.update(
        Event::UsernameChanged {
            username: "   ".into(),
        },
        &mut model,
    );
    let update = app.update(Event::SaveUsername, &mut model);
    assert!(backend_requests(update.effects).is_empty());
    assert_eq!(
        app.view(&model).profile.unwrap().error.as_deref(),
        Some("Please enter a username.")
    );

    app.update(
        Event::UsernameChanged {
            username: " Chef Me ".into(),
        },
        &mut model,
    );
    let request = take_backend(
        app.update(Event::SaveUsername, &mut model).effects,
        |op| matches!(op, BackendOperation::UpdateUsername { username } if username == "Chef Me"),
    );
    resolve_backend(&app, &mut model, request, Ok(BackendOutput::Done));

    let view = app.view(&model);
    let profile = view.profile.expect("profile open");
    assert_eq!(profile.username, "Chef Me");
    assert!(!profile.is_editing);
    let ids: Vec<_> = profile.recipes.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["r2"]);
    assert_eq!(view.username.as_deref(), Some("Chef Me"));
}

#[test]
fn guests_have_no_own_profile() {
    let app = Tester::default();
    let mut model = Model::default();

    let update = app.update(Event::OpenProfile { user_id: None }, &mut model);
    assert!(backend_requests(update.effects).is_empty());
    assert!(model.profile.is_none());
    assert_eq!(model.active_toast.as_ref().map(|t| t.kind), Some(ToastKind::Info));
}
