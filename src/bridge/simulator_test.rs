use super::*;
use crate::layout;
use crate::model::CartList;

#[tokio::test]
async fn storage_round_trips_and_is_recorded() {
    let sim = SimulatedBridge::new();
    assert_eq!(sim.get_local_storage("k").await.expect("get"), None);
    sim.set_local_storage("k", "v").await.expect("set");
    assert_eq!(sim.get_local_storage("k").await.expect("get"), Some("v".to_owned()));
    assert_eq!(sim.count(CallKind::GetLocalStorage), 2);
    assert_eq!(sim.count(CallKind::SetLocalStorage), 1);
}

#[tokio::test]
async fn injected_storage_failure_surfaces_as_storage_error() {
    let sim = SimulatedBridge::new();
    sim.fail(CallKind::SetLocalStorage);
    let err = sim.set_local_storage("cart_items", "[]").await.expect_err("should fail");
    assert!(matches!(err, BridgeError::Storage { op: "set", .. }));
    assert_eq!(sim.storage_value("cart_items"), None);
}

#[tokio::test]
async fn device_info_reports_configured_status() {
    let sim = SimulatedBridge::new().with_status(DeviceStatus::new(true, 64));
    let info = sim.get_device_info().await.expect("info");
    assert_eq!(info.status, DeviceStatus::new(true, 64));

    sim.fail(CallKind::GetDeviceInfo);
    assert!(matches!(sim.get_device_info().await, Err(BridgeError::Call { .. })));
}

#[tokio::test]
async fn status_listeners_receive_changes_until_unsubscribed() {
    let sim = SimulatedBridge::new();
    let (tx, mut rx) = mpsc::channel(4);
    let sub = sim.on_device_status_changed(tx);
    assert_eq!(sim.subscriber_counts(), (1, 0));

    sim.set_status(DeviceStatus::new(true, 50)).await;
    assert_eq!(rx.recv().await, Some(DeviceStatus::new(true, 50)));

    sub.unsubscribe();
    assert_eq!(sim.subscriber_counts(), (0, 0));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn emit_reaches_event_listeners() {
    let sim = SimulatedBridge::new();
    let (tx, mut rx) = mpsc::channel(4);
    let _sub = sim.on_hub_event(tx);
    sim.emit(HubEvent::list_click(1)).await;
    assert_eq!(rx.recv().await, Some(HubEvent::list_click(1)));
}

#[tokio::test]
async fn emit_json_decodes_host_payload() {
    let sim = SimulatedBridge::new();
    let (tx, mut rx) = mpsc::channel(4);
    let _sub = sim.on_hub_event(tx);

    sim.emit_json(r#"{"listEvent":{"currentSelectItemName":"[ ] Milk"}}"#).await.expect("valid");
    let event = rx.recv().await.expect("delivered");
    assert_eq!(event.event_type(), None);
    assert_eq!(
        event.list_event.and_then(|e| e.current_select_item_name).as_deref(),
        Some("[ ] Milk")
    );

    let err = sim.emit_json("{\"listEvent\":").await.expect_err("malformed");
    assert!(matches!(err, BridgeError::Codec(_)));
}

#[tokio::test]
async fn last_page_tracks_successful_pushes_only() {
    let sim = SimulatedBridge::new();
    let page = layout::build(&CartList::new()).to_page();
    sim.create_startup_page(&page).await.expect("create");
    sim.fail(CallKind::RebuildPage);
    assert!(sim.rebuild_page(&layout::splash_page()).await.is_err());
    assert_eq!(sim.last_page(), Some(page));
}

#[tokio::test]
async fn store_file_persists_between_instances() {
    let path = std::env::temp_dir().join(format!("smartcart-sim-{}.json", std::process::id()));
    let _ = tokio::fs::remove_file(&path).await;

    let first = SimulatedBridge::with_store_file(path.clone()).await;
    first.set_local_storage("cart_items", "[]").await.expect("set");

    let second = SimulatedBridge::with_store_file(path.clone()).await;
    assert_eq!(second.storage_value("cart_items"), Some("[]".to_owned()));

    let _ = tokio::fs::remove_file(&path).await;
}

#[test]
fn render_page_lists_header_and_rows() {
    let mut ids = crate::model::IdAllocator::new();
    let list = CartList::new().add("Milk", &mut ids);
    let text = render_page(&layout::build(&list).to_page());
    assert_eq!(text, "[0/1] ────────────────\n  [ ] Milk");
}

#[test]
fn render_page_shows_image_slots() {
    let text = render_page(&layout::splash_page());
    assert!(text.ends_with("<image splash-img 200x100>"));
}
