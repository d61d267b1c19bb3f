use chrono::{Duration, Utc};
use recoza_lib::{
    bootstrap,
    db::{LoggedItemInput, ProfileInput, QuantityUnit, RecyclableType},
    impact::StreakPolicy,
    AppState,
};
use tempfile::TempDir;

async fn app() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let state = bootstrap(dir.path()).await.unwrap();
    (dir, state)
}

fn household_input(email: &str) -> ProfileInput {
    ProfileInput {
        full_name: "Lerato".into(),
        email: email.into(),
        is_collector: false,
    }
}

fn collector_input(email: &str) -> ProfileInput {
    ProfileInput {
        full_name: "Sipho".into(),
        email: email.into(),
        is_collector: true,
    }
}

#[tokio::test]
async fn bootstrap_loads_prices_and_defaults() {
    let (dir, state) = app().await;
    assert_eq!(state.prices.len(), 5);
    assert_eq!(state.settings.settings().weekly_window_days, 7);
    assert_eq!(state.db.path(), dir.path().join("recoza.sqlite3"));
    assert!(state.auth.current_profile().is_none());
}

#[tokio::test]
async fn writes_require_a_signed_in_profile() {
    let (_dir, state) = app().await;
    let result = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Paper, 1.0, QuantityUnit::Kg))
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("signed in"));
    assert!(state.recyclables.refresh().await.is_err());
}

#[tokio::test]
async fn household_logs_items_and_sees_summary() {
    let (_dir, state) = app().await;
    let signed_up = state.auth.sign_up(household_input("home@example.com")).await;
    assert!(signed_up.success);

    let plastic = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Plastic, 2.0, QuantityUnit::Kg))
        .await;
    assert!(plastic.success);
    let cans = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Metal, 20.0, QuantityUnit::Items))
        .await;
    assert!(cans.success);

    let invalid = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Metal, -4.0, QuantityUnit::Kg))
        .await;
    assert!(!invalid.success);
    assert!(invalid.error.is_some());

    let snapshot = state.recyclables.items().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].id, cans.data.as_ref().unwrap().id);

    let summary = state.recyclables.summary().await.unwrap();
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.weekly.item_count, 2);
    assert!((summary.total_weight_kg - 3.0).abs() < 1e-9);
    assert!((summary.impact.co2_saved_kg - 7.5).abs() < 1e-9);
    assert!((summary.estimated_earnings - 24.0).abs() < 1e-9);
    assert_eq!(summary.streak_days, 1);

    let plastic_id = plastic.data.unwrap().id;
    let updated = state
        .recyclables
        .update_item(
            &plastic_id,
            LoggedItemInput::new(RecyclableType::Plastic, 4.0, QuantityUnit::Kg),
        )
        .await;
    assert!(updated.success);
    let total = state.recyclables.summary().await.unwrap().total_weight_kg;
    assert!((total - 5.0).abs() < 1e-9);

    let deleted = state.recyclables.delete_item(&plastic_id).await;
    assert!(deleted.success);
    assert_eq!(deleted.data, None);
    assert_eq!(state.recyclables.items().await.unwrap().len(), 1);

    // The snapshot matches the store after a refresh.
    let refreshed = state.recyclables.refresh().await.unwrap();
    assert_eq!(refreshed, state.recyclables.items().await.unwrap());
}

#[tokio::test]
async fn households_cannot_change_each_others_items() {
    let (_dir, state) = app().await;
    state.auth.sign_up(household_input("first@example.com")).await;
    let first_item = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Paper, 2.0, QuantityUnit::Kg))
        .await
        .data
        .unwrap();
    state.auth.sign_out();

    state.auth.sign_up(household_input("second@example.com")).await;
    let edit = state
        .recyclables
        .update_item(
            &first_item.id,
            LoggedItemInput::new(RecyclableType::Glass, 99.0, QuantityUnit::Kg),
        )
        .await;
    assert!(!edit.success);
    assert!(edit.error.unwrap().contains("another household"));

    let delete = state.recyclables.delete_item(&first_item.id).await;
    assert!(!delete.success);
    assert!(delete.error.unwrap().contains("another household"));

    state.auth.sign_in("first@example.com").await;
    let items = state.recyclables.refresh().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, first_item.id);
    assert_eq!(items[0].recyclable_type, RecyclableType::Paper);
    assert!((items[0].quantity - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn switching_accounts_does_not_leak_items() {
    let (_dir, state) = app().await;
    state.auth.sign_up(household_input("first@example.com")).await;
    let first_item = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Plastic, 2.0, QuantityUnit::Kg))
        .await
        .data
        .unwrap();
    assert_eq!(state.recyclables.items().await.unwrap().len(), 1);

    state.auth.sign_out();
    assert!(state.recyclables.items().await.is_err());
    assert!(state.recyclables.summary().await.is_err());

    // No refresh: the cached list still belongs to the first household.
    state.auth.sign_up(household_input("second@example.com")).await;
    assert!(state.recyclables.items().await.unwrap().is_empty());
    let summary = state.recyclables.summary().await.unwrap();
    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.total_weight_kg, 0.0);

    let second_item = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Glass, 1.0, QuantityUnit::Kg))
        .await
        .data
        .unwrap();
    let ids: Vec<String> = state
        .recyclables
        .items()
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, vec![second_item.id.clone()]);

    // Switching back reloads the first household's items.
    state.auth.sign_in("first@example.com").await;
    let ids: Vec<String> = state
        .recyclables
        .items()
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, vec![first_item.id]);
    assert_eq!(state.recyclables.summary().await.unwrap().item_count, 1);
}

#[tokio::test]
async fn stale_streak_policy_is_configurable() {
    let (_dir, state) = app().await;
    let profile = state
        .auth
        .sign_up(household_input("home@example.com"))
        .await
        .data
        .unwrap();

    let long_ago = Utc::now() - Duration::days(40);
    for day in 0..3 {
        state
            .db
            .insert_logged_item(
                &profile.id,
                LoggedItemInput::new(RecyclableType::Paper, 1.0, QuantityUnit::Kg),
                long_ago - Duration::days(day),
            )
            .await
            .unwrap();
    }
    state.recyclables.refresh().await.unwrap();

    assert_eq!(state.recyclables.summary().await.unwrap().streak_days, 3);

    let mut settings = state.settings.settings();
    settings.streak_policy = StreakPolicy::ResetWhenStale;
    state.settings.update(settings).unwrap();
    assert_eq!(state.recyclables.summary().await.unwrap().streak_days, 0);
}

#[tokio::test]
async fn collector_schedules_and_completes_pickup() {
    let (_dir, state) = app().await;

    let household = state
        .auth
        .sign_up(household_input("home@example.com"))
        .await
        .data
        .unwrap();
    let logged = state
        .recyclables
        .log_item(LoggedItemInput::new(RecyclableType::Plastic, 10.0, QuantityUnit::Kg))
        .await
        .data
        .unwrap();

    // Households may not schedule.
    let refused = state
        .collections
        .schedule(&household.id, vec![logged.id.clone()], Utc::now())
        .await;
    assert!(!refused.success);
    assert!(refused.error.unwrap().contains("collectors"));

    state.auth.sign_out();
    let collector = state
        .auth
        .sign_up(collector_input("picker@example.com"))
        .await
        .data
        .unwrap();
    assert!(collector.is_collector);

    let available = state.collections.available_items().await.unwrap();
    assert_eq!(available.len(), 1);

    let scheduled = state
        .collections
        .schedule(&household.id, vec![logged.id.clone()], Utc::now() + Duration::hours(3))
        .await;
    assert!(scheduled.success, "{:?}", scheduled.error);
    let scheduled = scheduled.data.unwrap();
    assert!((scheduled.estimated_earnings - 85.0).abs() < 1e-9);

    let stats = state.collections.stats().await.unwrap();
    assert_eq!(stats.scheduled_collections, 1);
    assert_eq!(stats.total_collections, 0);

    let completed = state.collections.complete(&scheduled.id).await;
    assert!(completed.success);
    assert!((completed.data.unwrap().actual_earnings.unwrap() - 85.0).abs() < 1e-9);

    let again = state.collections.cancel(&scheduled.id).await;
    assert!(!again.success);

    let stats = state.collections.stats().await.unwrap();
    assert_eq!(stats.total_collections, 1);
    assert_eq!(stats.households_served, 1);
    assert!((stats.total_earnings - 85.0).abs() < 1e-9);
    assert!((stats.weekly_earnings - 85.0).abs() < 1e-9);
    assert!((stats.total_weight_kg - 10.0).abs() < 1e-9);

    // The household sees its item as collected and cannot edit it.
    let signed_in = state.auth.sign_in("HOME@example.com").await;
    assert!(signed_in.success);
    let items = state.recyclables.refresh().await.unwrap();
    assert!(items[0].collected);
    let edit = state
        .recyclables
        .update_item(
            &logged.id,
            LoggedItemInput::new(RecyclableType::Plastic, 1.0, QuantityUnit::Kg),
        )
        .await;
    assert!(!edit.success);

    let visible = state.collections.collections().await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].household_id, household.id);
}

#[tokio::test]
async fn collectors_cannot_touch_each_others_pickups() {
    let (_dir, state) = app().await;
    let household = state
        .auth
        .sign_up(household_input("home@example.com"))
        .await
        .data
        .unwrap();

    state.auth.sign_up(collector_input("first@example.com")).await;
    let scheduled = state
        .collections
        .schedule(&household.id, vec![], Utc::now())
        .await
        .data
        .unwrap();

    state.auth.sign_up(collector_input("second@example.com")).await;
    let hijack = state.collections.cancel(&scheduled.id).await;
    assert!(!hijack.success);
    assert!(hijack.error.unwrap().contains("another collector"));

    let unknown = state.collections.complete("missing").await;
    assert!(!unknown.success);
}

#[tokio::test]
async fn sign_in_with_unknown_email_fails_softly() {
    let (_dir, state) = app().await;
    let result = state.auth.sign_in("ghost@example.com").await;
    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(state.auth.current_profile().is_none());
}
