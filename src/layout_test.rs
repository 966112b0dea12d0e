use super::*;
use crate::model::{CartItem, CartList, ItemId};

fn list_of(items: &[(ItemId, &str, bool)]) -> CartList {
    CartList::try_from(
        items
            .iter()
            .map(|(id, name, done)| CartItem { id: *id, name: (*name).to_owned(), done: *done })
            .collect::<Vec<_>>(),
    )
    .expect("unique ids")
}

fn numbered(count: usize, done_every: usize) -> CartList {
    let items: Vec<CartItem> = (0..count)
        .map(|i| CartItem {
            id: ItemId::try_from(i).expect("fits") + 1,
            name: format!("item {i}"),
            done: done_every != 0 && i % done_every == 0,
        })
        .collect();
    CartList::try_from(items).expect("unique ids")
}

#[test]
fn milk_and_eggs_scenario() {
    let list = list_of(&[(1, "Milk", false), (2, "Eggs", true)]);
    let layout = build(&list);
    assert_eq!(layout.header.content, "[1/2] ━━━━━━━━────────");
    assert_eq!(layout.rows(), &["[ ] Milk".to_owned(), "[X] Eggs".to_owned()]);
    assert_eq!(layout.container_count, 2);
}

#[test]
fn empty_list_yields_empty_state_body() {
    let layout = build(&CartList::new());
    assert_eq!(layout.container_count, 2);
    assert_eq!(layout.header.content, "[0/0] ────────────────");
    let Body::EmptyState(text) = &layout.body else {
        panic!("expected empty-state body");
    };
    assert_eq!(text.container_id, LIST_ID);
    assert_eq!(text.container_name, "empty-state");
    assert_eq!(text.content, "Cart is empty.\nAdd items on your phone.");
    assert_eq!(text.rect, Rect::new(0, 48, 576, 240));
    assert!(layout.rows().is_empty());
}

#[test]
fn only_first_twenty_rows_are_displayed() {
    let list = numbered(25, 0);
    let layout = build(&list);
    assert_eq!(layout.rows().len(), MAX_ROWS);
    assert_eq!(layout.rows()[0], "[ ] item 0");
    assert_eq!(layout.rows()[19], "[ ] item 19");
    let Body::List(container) = &layout.body else {
        panic!("expected list body");
    };
    assert_eq!(container.item_container.item_count, 20);
}

#[test]
fn header_counts_cover_whole_list_not_just_displayed_rows() {
    let list = numbered(25, 1).toggle(25);
    let layout = build(&list);
    assert!(layout.header.content.starts_with("[24/25] "));
}

#[test]
fn filled_segments_rounding() {
    assert_eq!(filled_segments(0, 0), 0);
    assert_eq!(filled_segments(4, 8), 8);
    assert_eq!(filled_segments(8, 8), 16);
    assert_eq!(filled_segments(1, 3), 5);
    assert_eq!(filled_segments(1, 32), 1);
    assert_eq!(filled_segments(1, 33), 0);
}

#[test]
fn header_bar_always_sixteen_segments() {
    for (done_every, count) in [(0, 5), (1, 5), (2, 7), (3, 11)] {
        let text = header_text(&numbered(count, done_every));
        let bar = text.split(' ').nth(1).expect("bar segment");
        assert_eq!(bar.chars().count(), BAR_LENGTH);
    }
}

#[test]
fn header_geometry_and_styling_are_fixed() {
    let layout = build(&CartList::new());
    let header = &layout.header;
    assert_eq!(header.container_id, HEADER_ID);
    assert_eq!(header.rect, Rect::new(0, 0, 576, 48));
    assert_eq!(header.border_width, Some(0));
    assert_eq!(header.border_color, Some(5));
    assert_eq!(header.padding_length, Some(10));
    assert_eq!(header.is_event_capture, Some(0));
}

#[test]
fn list_container_geometry_and_styling_are_fixed() {
    let layout = build(&list_of(&[(1, "Milk", false)]));
    let Body::List(list) = &layout.body else {
        panic!("expected list body");
    };
    assert_eq!(list.rect, Rect::new(0, 48, 576, 240));
    assert_eq!((list.border_width, list.border_color, list.border_radius), (1, 5, 0));
    assert_eq!(list.padding_length, 5);
    assert_eq!(list.container_id, LIST_ID);
    assert_eq!(list.container_name, "cart-list");
    assert_eq!(list.is_event_capture, 1);
    assert_eq!(list.item_container.item_width, 0);
    assert_eq!(list.item_container.is_item_select_border_en, 1);
}

#[test]
fn to_page_places_containers_by_body_kind() {
    let page = build(&CartList::new()).to_page();
    assert_eq!(page.text_object.len(), 2);
    assert!(page.list_object.is_none());
    assert_eq!(page.container_total_num, 2);

    let page = build(&list_of(&[(1, "Milk", false)])).to_page();
    assert_eq!(page.text_object.len(), 1);
    assert_eq!(page.list_object.as_ref().map(Vec::len), Some(1));
    assert!(page.image_object.is_none());
}

#[test]
fn build_is_deterministic() {
    let list = list_of(&[(1, "Milk", false), (2, "Eggs", true)]);
    assert_eq!(build(&list), build(&list));
}

#[test]
fn splash_page_centres_image_on_canvas() {
    let page = splash_page();
    assert_eq!(page.container_total_num, 2);
    assert!(page.list_object.is_none());
    let background = &page.text_object[0];
    assert_eq!(background.container_id, SPLASH_BG_ID);
    assert_eq!(background.rect, Rect::new(0, 0, 576, 288));
    assert_eq!(background.content, " ");
    let image = &page.image_object.as_ref().expect("image slot")[0];
    assert_eq!(image.container_id, SPLASH_IMG_ID);
    assert_eq!(image.rect, Rect::new(188, 94, 200, 100));
}

#[test]
fn splash_image_update_targets_image_slot() {
    let update = splash_image_update(vec![1, 2, 3]);
    assert_eq!(update.container_id, SPLASH_IMG_ID);
    assert_eq!(update.container_name, "splash-img");
    assert_eq!(update.image_data, vec![1, 2, 3]);
}
