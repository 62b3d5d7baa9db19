use std::sync::Arc;

use serde_json::json;
use time::macros::date;

use super::*;
use crate::net::Transport;
use crate::services::principal::Role;
use crate::test_helpers::{Reply, ScriptedTransport};

fn client() -> (Arc<ScriptedTransport>, ApiClient) {
    let transport = Arc::new(ScriptedTransport::new());
    let inner: Arc<dyn Transport> = transport.clone();
    (transport, ApiClient::new(inner))
}

// =============================================================================
// EntityId
// =============================================================================

#[test]
fn entity_id_from_text_prefers_numbers() {
    assert_eq!(EntityId::from("42"), EntityId::Num(42));
    assert_eq!(EntityId::from("abc-1"), EntityId::Text("abc-1".into()));
    assert_eq!(EntityId::from(7_i64).to_string(), "7");
}

// =============================================================================
// ResourceClient
// =============================================================================

#[tokio::test]
async fn generic_crud_uses_collection_and_item_paths() {
    let (transport, client) = client();
    let tables: ResourceClient<DiningTable> = ResourceClient::new(client, "/admin/tables");
    transport
        .push("GET /admin/tables", Reply::json(200, json!([{ "id": 1, "name": "Table 1" }])))
        .push("GET /admin/tables/1", Reply::json(200, json!({ "id": 1, "name": "Table 1" })))
        .push("POST /admin/tables", Reply::json(201, json!({ "id": 2, "name": "Patio" })))
        .push("PUT /admin/tables/2", Reply::json(200, json!({ "id": 2, "name": "Patio", "status": "OCCUPIED" })))
        .push("DELETE /admin/tables/2", Reply::status(204));

    assert_eq!(tables.list().await.unwrap().len(), 1);
    assert_eq!(tables.get(&1_i64.into()).await.unwrap().name, "Table 1");
    let created = tables.create(&TableForm::new("Patio")).await.unwrap();
    let updated = tables
        .update(&created.id, &TableForm { status: "OCCUPIED".into(), ..TableForm::new("Patio") })
        .await
        .unwrap();
    tables.delete(&created.id).await.unwrap();

    assert_eq!(updated.status.as_deref(), Some("OCCUPIED"));
    let calls = transport.calls();
    assert_eq!(calls[2].body, Some(json!({ "name": "Patio", "status": "FREE" })));
    assert_eq!(calls.len(), 5);
}

#[tokio::test]
async fn invalid_form_sends_nothing() {
    let (transport, client) = client();
    let tables: ResourceClient<DiningTable> = ResourceClient::new(client, "/admin/tables");

    let err = tables.create(&TableForm::new("")).await.unwrap_err();

    assert_eq!(err, ApiError::validation("name", "is required"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn server_side_validation_is_surfaced_with_field() {
    let (transport, client) = client();
    let promotions: ResourceClient<Promotion> = ResourceClient::new(client, "/promotions");
    transport.push(
        "POST /promotions",
        Reply::json(400, json!({ "field": "code", "message": "already exists" })),
    );
    let form = PromotionForm {
        code: "DUP".into(),
        discount_type: DiscountType::Fixed,
        discount_value: 1.0,
        start_date: date!(2024 - 01 - 01),
        end_date: date!(2024 - 01 - 02),
        active: true,
    };

    let err = promotions.create(&form).await.unwrap_err();

    assert_eq!(err, ApiError::validation("code", "already exists"));
}

#[tokio::test]
async fn list_path_override() {
    let (transport, client) = client();
    let shifts: ResourceClient<Shift> = ResourceClient::new(client, "/shifts").with_list_path("/shifts/all");
    transport.push("GET /shifts/all", Reply::json(200, json!([])));

    assert!(shifts.list().await.unwrap().is_empty());
    assert_eq!(shifts.item_path(&9_i64.into()), "/shifts/9");
    assert_eq!(shifts.base_path(), "/shifts");
}

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn toggle_status_patches_with_query_flag() {
    let (transport, client) = client();
    let menu = MenuApi::new(client);
    transport.push(
        "PATCH /admin/menu-items/3/status",
        Reply::json(200, json!({ "id": 3, "name": "Pho", "price": 45000, "isActive": false })),
    );

    let item = menu.toggle_status(&3_i64.into(), false).await.unwrap();

    assert_eq!(item.is_active, Some(false));
    assert_eq!(transport.calls()[0].query, vec![("isActive".to_owned(), "false".to_owned())]);
    assert_eq!(transport.calls()[0].body, None);
}

#[tokio::test]
async fn categories_list_and_create() {
    let (transport, client) = client();
    let menu = MenuApi::new(client);
    transport
        .push("GET /admin/categories", Reply::json(200, json!([{ "id": 1, "name": "Soup" }])))
        .push("POST /admin/categories", Reply::json(200, json!({ "id": 2, "name": "Drinks" })));

    assert_eq!(menu.categories().await.unwrap()[0].name, "Soup");
    let created = menu.create_category(&CategoryForm { name: "Drinks".into(), description: None }).await.unwrap();

    assert_eq!(created.id, EntityId::Num(2));
    assert_eq!(menu.items().base_path(), "/admin/menu-items");
}

// =============================================================================
// Users
// =============================================================================

fn user_form(password: Option<&str>) -> UserForm {
    UserForm {
        username: "kim".into(),
        password: password.map(str::to_owned),
        email: Some("kim@example.com".into()),
        phone_number: None,
        role: Role::Cashier,
    }
}

#[tokio::test]
async fn user_create_goes_through_signup() {
    let (transport, client) = client();
    let users = UsersApi::new(client);
    transport.push("POST /auth/signup", Reply::json(200, json!({ "id": 5, "username": "kim", "role": { "name": "CASHIER" } })));

    let user = users.create(&user_form(Some("pw"))).await.unwrap();

    assert_eq!(user.role, Some(Role::Cashier));
    assert_eq!(transport.calls()[0].body.as_ref().unwrap()["role"], json!({ "name": "CASHIER" }));
}

#[tokio::test]
async fn user_create_requires_password() {
    let (transport, client) = client();
    let users = UsersApi::new(client);

    assert_eq!(users.create(&user_form(None)).await.unwrap_err(), ApiError::validation("password", "is required"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn user_update_never_sends_password() {
    let (transport, client) = client();
    let users = UsersApi::new(client);
    transport.push("PUT /admin/users/5", Reply::json(200, json!({ "id": 5, "username": "kim" })));

    users.update(&5_i64.into(), &user_form(Some("leak"))).await.unwrap();

    let body = transport.calls()[0].body.clone().unwrap();
    assert!(body.get("password").is_none());
    assert_eq!(body["role"], json!({ "name": "CASHIER" }));
}

// =============================================================================
// Shifts
// =============================================================================

#[tokio::test]
async fn assignment_endpoints() {
    let (transport, client) = client();
    let shifts = ShiftsApi::new(client);
    transport
        .push("POST /shifts/assign", Reply::json(200, json!({ "id": 11, "userId": 4, "shiftId": 1, "date": "2999-01-01" })))
        .push("GET /shifts/assignments/user/4", Reply::json(200, json!([{ "id": 11, "status": "SCHEDULED" }])))
        .push("DELETE /shifts/assignments/11", Reply::status(200));

    let form = AssignmentForm { user_id: 4.into(), shift_id: 1.into(), date: date!(2999 - 01 - 01) };
    let assignment = shifts.assign(&form).await.unwrap();
    let mine = shifts.assignments_for_user(&4_i64.into()).await.unwrap();
    shifts.unassign(&assignment.id).await.unwrap();

    assert_eq!(assignment.user_id, Some(EntityId::Num(4)));
    assert_eq!(mine[0].status.as_deref(), Some("SCHEDULED"));
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn assigning_in_the_past_sends_nothing() {
    let (transport, client) = client();
    let shifts = ShiftsApi::new(client);
    let form = AssignmentForm { user_id: 4.into(), shift_id: 1.into(), date: date!(2000 - 01 - 01) };

    assert!(shifts.assign(&form).await.is_err());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn active_shift_is_none_when_off_duty() {
    let (transport, client) = client();
    let shifts = ShiftsApi::new(client);
    transport
        .push("GET /shifts/active", Reply::status(200))
        .push("GET /shifts/active", Reply::json(200, json!(null)))
        .push("GET /shifts/active", Reply::json(200, json!({ "id": 3, "status": "WORKING" })));

    assert_eq!(shifts.active_shift().await.unwrap(), None);
    assert_eq!(shifts.active_shift().await.unwrap(), None);
    assert_eq!(shifts.active_shift().await.unwrap().unwrap().status.as_deref(), Some("WORKING"));
}

#[tokio::test]
async fn attendance_and_stats_paths() {
    let (transport, client) = client();
    let shifts = ShiftsApi::new(client);
    transport
        .push("POST /shifts/checkin", Reply::json(200, json!({ "id": 3, "status": "WORKING" })))
        .push("POST /shifts/checkout", Reply::json(200, json!({ "id": 3, "status": "COMPLETED" })))
        .push("GET /shifts/stats", Reply::json(200, json!([{ "userId": 4, "username": "kim", "totalHours": 12 }])))
        .push("GET /shifts/stats/4", Reply::json(200, json!({ "userId": 4, "lateCount": 1 })))
        .push("GET /shifts/stats/filter", Reply::json(200, json!([])));

    shifts.check_in().await.unwrap();
    assert_eq!(shifts.check_out().await.unwrap().status.as_deref(), Some("COMPLETED"));
    let all = shifts.stats().await.unwrap();
    let one = shifts.user_stats(&4_i64.into()).await.unwrap();
    shifts.stats_between(date!(2024 - 01 - 01), date!(2024 - 01 - 31)).await.unwrap();

    assert_eq!(all[0].extra["totalHours"], 12);
    assert_eq!(one.extra["lateCount"], 1);
    let filter = transport.calls().pop().unwrap();
    assert_eq!(
        filter.query,
        vec![("startDate".to_owned(), "2024-01-01".to_owned()), ("endDate".to_owned(), "2024-01-31".to_owned())]
    );
}

#[tokio::test]
async fn stats_between_rejects_reversed_range() {
    let (transport, client) = client();
    let shifts = ShiftsApi::new(client);

    assert!(shifts.stats_between(date!(2024 - 02 - 01), date!(2024 - 01 - 01)).await.is_err());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn shift_crud_paths() {
    let (transport, client) = client();
    let shifts = ShiftsApi::new(client);
    let form = ShiftForm { name: "Morning".into(), start_time: "07:00".into(), end_time: "11:00".into() };
    transport
        .push("POST /shifts", Reply::json(200, json!({ "id": 1, "name": "Morning", "startTime": "07:00", "endTime": "11:00" })))
        .push("PUT /shifts/1", Reply::json(200, json!({ "id": 1, "name": "Morning", "startTime": "07:00", "endTime": "11:00" })))
        .push("DELETE /shifts/1", Reply::status(200));

    let shift = shifts.create(&form).await.unwrap();
    shifts.update(&shift.id, &form).await.unwrap();
    shifts.delete(&shift.id).await.unwrap();

    assert_eq!(shift.start_time, "07:00");
    assert_eq!(transport.calls().len(), 3);
}

// =============================================================================
// Files
// =============================================================================

#[tokio::test]
async fn files_url_and_delete() {
    let (transport, client) = client();
    let files = FilesApi::new(client, "http://localhost:8080/api");
    transport.push("DELETE /files/pho.png", Reply::status(204));

    assert_eq!(files.file_url("pho.png"), "http://localhost:8080/api/files/pho.png");
    files.delete("pho.png").await.unwrap();
    assert!(files.delete("../etc/passwd").await.is_err());
    assert_eq!(transport.calls().len(), 1);
}
