//! Plan catalog integration tests for subscriptions-core.

mod common;

use common::{test_user, TestHarness};
use rust_decimal::Decimal;
use subscriptions_core::error::AppError;
use subscriptions_core::models::{
    CreatePlan, CreatePlanCost, CreatePlanList, CreatePlanListDetail, ListPlansFilter,
    RecurrenceUnit, SetupOptions, UpdatePlan, UpdatePlanCost, UpdatePlanList,
};
use subscriptions_core::services::CatalogStore;

fn plan_input(name: &str, slug: Option<&str>) -> CreatePlan {
    CreatePlan {
        name: name.to_string(),
        slug: slug.map(str::to_string),
        description: None,
        group: None,
        tag_ids: Vec::new(),
        grace_period: 0,
        feature_ref: None,
    }
}

fn cost_input(plan_id: uuid::Uuid, unit: RecurrenceUnit, period: u32) -> CreatePlanCost {
    CreatePlanCost {
        plan_id,
        slug: None,
        recurrence_period: period,
        recurrence_unit: unit,
        cost: Decimal::from(10),
    }
}

#[tokio::test]
async fn duplicate_plan_slug_conflicts() {
    let harness = TestHarness::spawn().await;

    harness
        .store
        .create_plan(&plan_input("Basic", Some("basic")))
        .await
        .unwrap();
    let err = harness
        .store
        .create_plan(&plan_input("Also Basic", Some("basic")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Updates collide the same way
    let other = harness
        .store
        .create_plan(&plan_input("Other", Some("other")))
        .await
        .unwrap();
    let err = harness
        .store
        .update_plan(
            other.plan_id,
            &UpdatePlan {
                slug: Some("basic".to_string()),
                ..UpdatePlan::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn duplicate_cost_slug_conflicts() {
    let harness = TestHarness::spawn().await;
    let plan = harness
        .store
        .create_plan(&plan_input("Basic", None))
        .await
        .unwrap();

    let mut input = cost_input(plan.plan_id, RecurrenceUnit::Month, 1);
    input.slug = Some("basic-monthly".to_string());
    harness.store.create_cost(&input).await.unwrap();

    let mut duplicate = cost_input(plan.plan_id, RecurrenceUnit::Year, 1);
    duplicate.slug = Some("basic-monthly".to_string());
    let err = harness.store.create_cost(&duplicate).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn plans_list_sorted_by_name_and_filterable_by_tag() {
    let harness = TestHarness::spawn().await;
    let tag = harness.store.create_tag("team").await.unwrap();

    let mut tagged = plan_input("Zeta", None);
    tagged.tag_ids = vec![tag.tag_id];
    harness.store.create_plan(&tagged).await.unwrap();
    harness
        .store
        .create_plan(&plan_input("Alpha", None))
        .await
        .unwrap();
    harness
        .store
        .create_plan(&plan_input("Midway", None))
        .await
        .unwrap();

    let all = harness
        .store
        .list_plans(&ListPlansFilter::default())
        .await
        .unwrap();
    let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Midway", "Zeta"]);

    let tagged_only = harness
        .store
        .list_plans(&ListPlansFilter {
            tag_id: Some(tag.tag_id),
        })
        .await
        .unwrap();
    assert_eq!(tagged_only.len(), 1);
    assert_eq!(tagged_only[0].name, "Zeta");
}

#[tokio::test]
async fn costs_list_sorted_by_unit_then_period() {
    let harness = TestHarness::spawn().await;
    let plan = harness
        .store
        .create_plan(&plan_input("Basic", None))
        .await
        .unwrap();

    for (unit, period) in [
        (RecurrenceUnit::Year, 1),
        (RecurrenceUnit::Month, 3),
        (RecurrenceUnit::Week, 1),
        (RecurrenceUnit::Month, 1),
    ] {
        harness
            .store
            .create_cost(&cost_input(plan.plan_id, unit, period))
            .await
            .unwrap();
    }

    let costs = harness.store.list_costs(plan.plan_id).await.unwrap();
    let ordering: Vec<(RecurrenceUnit, u32)> = costs
        .iter()
        .map(|c| (c.recurrence_unit, c.recurrence_period))
        .collect();
    assert_eq!(
        ordering,
        vec![
            (RecurrenceUnit::Week, 1),
            (RecurrenceUnit::Month, 1),
            (RecurrenceUnit::Month, 3),
            (RecurrenceUnit::Year, 1),
        ]
    );
}

#[tokio::test]
async fn validation_rejects_bad_input() {
    let harness = TestHarness::spawn().await;

    let err = harness
        .store
        .create_plan(&plan_input("", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let plan = harness
        .store
        .create_plan(&plan_input("Basic", None))
        .await
        .unwrap();
    let err = harness
        .store
        .create_cost(&cost_input(plan.plan_id, RecurrenceUnit::Month, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn update_plan_applies_partial_fields() {
    let harness = TestHarness::spawn().await;
    let plan = harness
        .store
        .create_plan(&plan_input("Basic", Some("basic")))
        .await
        .unwrap();

    let updated = harness
        .store
        .update_plan(
            plan.plan_id,
            &UpdatePlan {
                name: Some("Basic v2".to_string()),
                grace_period: Some(5),
                ..UpdatePlan::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Basic v2");
    assert_eq!(updated.grace_period, 5);
    // Untouched fields survive
    assert_eq!(updated.slug.as_deref(), Some("basic"));
    assert!(updated.updated_utc >= plan.updated_utc);
}

#[tokio::test]
async fn delete_plan_cascades_to_list_entries() {
    let harness = TestHarness::spawn().await;
    let plan = harness
        .store
        .create_plan(&plan_input("Basic", None))
        .await
        .unwrap();
    let list = harness
        .store
        .create_plan_list(&CreatePlanList {
            title: Some("Pricing".to_string()),
            ..CreatePlanList::default()
        })
        .await
        .unwrap();
    harness
        .store
        .create_plan_list_detail(&CreatePlanListDetail {
            plan_id: plan.plan_id,
            list_id: list.list_id,
            html_content: None,
            subscribe_button_text: None,
            order: None,
        })
        .await
        .unwrap();

    harness.store.delete_plan(plan.plan_id).await.unwrap();

    let details = harness
        .store
        .list_plan_list_details(list.list_id)
        .await
        .unwrap();
    assert!(details.is_empty());
}

#[tokio::test]
async fn delete_tag_detaches_from_plans() {
    let harness = TestHarness::spawn().await;
    let tag = harness.store.create_tag("seasonal").await.unwrap();

    let mut input = plan_input("Basic", None);
    input.tag_ids = vec![tag.tag_id];
    let plan = harness.store.create_plan(&input).await.unwrap();

    harness.store.delete_tag(tag.tag_id).await.unwrap();

    let plan = harness
        .store
        .get_plan(plan.plan_id)
        .await
        .unwrap()
        .unwrap();
    assert!(plan.tag_ids.is_empty());
}

#[tokio::test]
async fn plan_list_details_sorted_with_default_button_text() {
    let harness = TestHarness::spawn().await;
    let plan = harness
        .store
        .create_plan(&plan_input("Basic", None))
        .await
        .unwrap();
    let list = harness
        .store
        .create_plan_list(&CreatePlanList::default())
        .await
        .unwrap();

    for (order, button) in [(2u32, None), (0, Some("Go Premium")), (1, None)] {
        harness
            .store
            .create_plan_list_detail(&CreatePlanListDetail {
                plan_id: plan.plan_id,
                list_id: list.list_id,
                html_content: None,
                subscribe_button_text: button.map(str::to_string),
                order: Some(order),
            })
            .await
            .unwrap();
    }

    let details = harness
        .store
        .list_plan_list_details(list.list_id)
        .await
        .unwrap();
    let orders: Vec<u32> = details.iter().map(|d| d.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    assert_eq!(details[0].subscribe_button_text.as_deref(), Some("Go Premium"));
    assert_eq!(details[1].subscribe_button_text.as_deref(), Some("Subscribe"));
    assert_eq!(details[2].subscribe_button_text.as_deref(), Some("Subscribe"));
}

#[tokio::test]
async fn tags_list_sorted_and_retrievable() {
    let harness = TestHarness::spawn().await;
    let sports = harness.store.create_tag("sports").await.unwrap();
    let news = harness.store.create_tag("news").await.unwrap();

    let tags = harness.store.list_tags().await.unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(names, vec!["news", "sports"]);

    let fetched = harness.store.get_tag(news.tag_id).await.unwrap().unwrap();
    assert_eq!(fetched.tag, "news");

    harness.store.delete_tag(sports.tag_id).await.unwrap();
    assert!(harness
        .store
        .get_tag(sports.tag_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn update_cost_reprices_tier() {
    let harness = TestHarness::spawn().await;
    let plan = harness
        .store
        .create_plan(&plan_input("Basic", None))
        .await
        .unwrap();
    let cost = harness
        .store
        .create_cost(&cost_input(plan.plan_id, RecurrenceUnit::Month, 1))
        .await
        .unwrap();

    let updated = harness
        .store
        .update_cost(
            cost.cost_id,
            &UpdatePlanCost {
                cost: Some(Decimal::new(2500, 2)),
                recurrence_period: Some(3),
                ..UpdatePlanCost::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.cost, Decimal::new(2500, 2));
    assert_eq!(updated.recurrence_period, 3);
    // Unit stays as created
    assert_eq!(updated.recurrence_unit, RecurrenceUnit::Month);

    harness.store.delete_cost(cost.cost_id).await.unwrap();
    assert!(harness
        .store
        .get_cost(cost.cost_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn plan_list_round_trip() {
    let harness = TestHarness::spawn().await;
    let plan = harness
        .store
        .create_plan(&plan_input("Basic", None))
        .await
        .unwrap();
    let list = harness
        .store
        .create_plan_list(&CreatePlanList {
            title: Some("Pricing".to_string()),
            slug: Some("pricing".to_string()),
            ..CreatePlanList::default()
        })
        .await
        .unwrap();
    assert!(list.active);
    assert_eq!(
        harness
            .store
            .get_plan_list(list.list_id)
            .await
            .unwrap()
            .unwrap()
            .slug
            .as_deref(),
        Some("pricing")
    );

    let updated = harness
        .store
        .update_plan_list(
            list.list_id,
            &UpdatePlanList {
                title: Some("Spring Pricing".to_string()),
                active: Some(false),
                ..UpdatePlanList::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title.as_deref(), Some("Spring Pricing"));
    assert!(!updated.active);
    // Untouched fields survive
    assert_eq!(updated.slug.as_deref(), Some("pricing"));

    let lists = harness.store.list_plan_lists().await.unwrap();
    assert!(lists.iter().any(|l| l.list_id == list.list_id));

    let detail = harness
        .store
        .create_plan_list_detail(&CreatePlanListDetail {
            plan_id: plan.plan_id,
            list_id: list.list_id,
            html_content: Some("<p>Two seats included.</p>".to_string()),
            subscribe_button_text: None,
            order: None,
        })
        .await
        .unwrap();
    assert_eq!(detail.order, 1);
    harness
        .store
        .delete_plan_list_detail(detail.detail_id)
        .await
        .unwrap();
    assert!(harness
        .store
        .list_plan_list_details(list.list_id)
        .await
        .unwrap()
        .is_empty());

    harness.store.delete_plan_list(list.list_id).await.unwrap();
    assert!(harness
        .store
        .get_plan_list(list.list_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn subscription_description_combines_plan_and_frequency() {
    let harness = TestHarness::spawn().await;

    let cases = [
        ("Premium", RecurrenceUnit::Month, 1, "Premium per month"),
        ("Gold", RecurrenceUnit::Month, 3, "Gold every 3 months"),
        ("Lifetime", RecurrenceUnit::Once, 1, "Lifetime one-time"),
        ("Daily News", RecurrenceUnit::Day, 1, "Daily News per day"),
    ];
    for (name, unit, period, expected) in cases {
        let (_, cost) = harness
            .create_plan_with_cost(name, None, 0, unit, period, Decimal::from(10))
            .await;
        let subscription = harness
            .service
            .setup_subscription(
                test_user(),
                cost.cost_id,
                &SetupOptions {
                    active: false,
                    ..SetupOptions::default()
                },
            )
            .await
            .unwrap();
        let description = harness
            .service
            .description(subscription.subscription_id)
            .await
            .unwrap();
        assert_eq!(description, expected);
    }
}
