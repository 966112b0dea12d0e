use super::*;
use crate::bridge::simulator::{CallKind, SimulatedBridge};
use crate::model::IdAllocator;

#[tokio::test]
async fn missing_key_loads_empty_list() {
    let sim = SimulatedBridge::new();
    assert!(load_list(&sim).await.expect("load").is_empty());
}

#[tokio::test]
async fn blank_value_loads_empty_list() {
    let sim = SimulatedBridge::new();
    sim.seed_storage(CART_KEY, "");
    assert!(load_list(&sim).await.expect("load").is_empty());
}

#[tokio::test]
async fn corrupt_value_is_parse_failure() {
    let sim = SimulatedBridge::new();
    sim.seed_storage(CART_KEY, "[{\"id\":1,\"name\":");
    let err = load_list(&sim).await.expect_err("corrupt");
    assert!(matches!(err, SyncError::ParseFailure(_)));
}

#[tokio::test]
async fn duplicate_ids_are_parse_failure() {
    let sim = SimulatedBridge::new();
    sim.seed_storage(CART_KEY, r#"[{"id":1,"name":"a","done":false},{"id":1,"name":"b","done":false}]"#);
    assert!(matches!(load_list(&sim).await, Err(SyncError::ParseFailure(_))));
}

#[tokio::test]
async fn read_failure_is_persist_failure() {
    let sim = SimulatedBridge::new();
    sim.fail(CallKind::GetLocalStorage);
    assert!(matches!(load_list(&sim).await, Err(SyncError::PersistFailure(_))));
}

#[tokio::test]
async fn save_then_load_restores_order_and_state() {
    let sim = SimulatedBridge::new();
    let mut ids = IdAllocator::new();
    let list = CartList::new().add("Milk", &mut ids).add("Eggs", &mut ids);
    let eggs = list.items()[1].id;
    let list = list.toggle(eggs);

    save_list(&sim, &list).await.expect("save");
    assert_eq!(load_list(&sim).await.expect("load"), list);
}

#[tokio::test]
async fn save_writes_json_array_under_cart_key() {
    let sim = SimulatedBridge::new();
    let list = CartList::try_from(vec![crate::model::CartItem { id: 7, name: "Tea".into(), done: true }])
        .expect("unique ids");
    save_list(&sim, &list).await.expect("save");
    assert_eq!(sim.storage_value("cart_items").as_deref(), Some(r#"[{"id":7,"name":"Tea","done":true}]"#));
}

#[tokio::test]
async fn write_failure_is_persist_failure() {
    let sim = SimulatedBridge::new();
    sim.fail(CallKind::SetLocalStorage);
    let err = save_list(&sim, &CartList::new()).await.expect_err("should fail");
    assert!(matches!(err, SyncError::PersistFailure(_)));
}
