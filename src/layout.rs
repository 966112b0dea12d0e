//! Display layout builder: cart list snapshot to glasses page layout.
//!
//! DESIGN
//! ======
//! `build` is a pure function of the list. Every sync rebuilds the whole
//! page; nothing is diffed. The page always holds exactly two containers:
//! a progress header and either the item list or an empty-state message.
//!
//! Geometry, ids and styling below are a fixed contract with the firmware.
//! Row labels double as the only identifier the glasses can echo back, see
//! [`row_label`].

use hubwire::{
    ImageContainer, ImageRawDataUpdate, ListContainer, ListItemContainer, PageLayout, Rect, TextContainer,
};

use crate::model::{CartItem, CartList};

// =============================================================================
// CONSTANTS
// =============================================================================

pub const HEADER_ID: u32 = 1;
pub const LIST_ID: u32 = 2;
pub const SPLASH_BG_ID: u32 = 99;
pub const SPLASH_IMG_ID: u32 = 100;

pub const CANVAS_WIDTH: u32 = 576;
pub const CANVAS_HEIGHT: u32 = 288;

/// Rows beyond this are not shown on the glasses.
pub const MAX_ROWS: usize = 20;
/// Segments in the header progress bar.
pub const BAR_LENGTH: usize = 16;

const HEADER_RECT: Rect = Rect::new(0, 0, CANVAS_WIDTH, 48);
const BODY_RECT: Rect = Rect::new(0, 48, CANVAS_WIDTH, 240);
const SPLASH_BG_RECT: Rect = Rect::new(0, 0, CANVAS_WIDTH, CANVAS_HEIGHT);
const SPLASH_IMG_RECT: Rect = Rect::new((CANVAS_WIDTH - 200) / 2, (CANVAS_HEIGHT - 100) / 2, 200, 100);

const EMPTY_STATE_TEXT: &str = "Cart is empty.\nAdd items on your phone.";
const SPLASH_IMG_NAME: &str = "splash-img";

const BAR_FILLED: char = '━';
const BAR_EMPTY: char = '─';

// =============================================================================
// TYPES
// =============================================================================

/// Lower container of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    List(ListContainer),
    EmptyState(TextContainer),
}

/// Page derived from a cart list. Ephemeral; rebuilt on every sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLayout {
    pub header: TextContainer,
    pub body: Body,
    pub container_count: u32,
}

impl DeviceLayout {
    /// Row labels in display order. Empty for the empty-state body.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        match &self.body {
            Body::List(list) => &list.item_container.item_name,
            Body::EmptyState(_) => &[],
        }
    }

    /// Wire payload for the host's create/rebuild calls.
    #[must_use]
    pub fn to_page(&self) -> PageLayout {
        match &self.body {
            Body::List(list) => PageLayout {
                text_object: vec![self.header.clone()],
                list_object: Some(vec![list.clone()]),
                image_object: None,
                container_total_num: self.container_count,
            },
            Body::EmptyState(text) => PageLayout {
                text_object: vec![self.header.clone(), text.clone()],
                list_object: None,
                image_object: None,
                container_total_num: self.container_count,
            },
        }
    }
}

// =============================================================================
// BUILD
// =============================================================================

/// Label rendered for an item: `"[X] name"` when done, `"[ ] name"` otherwise.
#[must_use]
pub fn row_label(item: &CartItem) -> String {
    let mark = if item.done { "[X]" } else { "[ ]" };
    format!("{mark} {}", item.name)
}

/// Filled segments out of [`BAR_LENGTH`], rounded half up.
#[must_use]
pub fn filled_segments(done: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (2 * BAR_LENGTH * done + total) / (2 * total)
}

/// Header text, e.g. `"[1/2] ━━━━━━━━────────"`.
#[must_use]
pub fn header_text(list: &CartList) -> String {
    let done = list.done_count();
    let total = list.len();
    let filled = filled_segments(done, total).min(BAR_LENGTH);
    let bar: String = std::iter::repeat_n(BAR_FILLED, filled)
        .chain(std::iter::repeat_n(BAR_EMPTY, BAR_LENGTH - filled))
        .collect();
    format!("[{done}/{total}] {bar}")
}

/// Build the full page for `list`.
#[must_use]
pub fn build(list: &CartList) -> DeviceLayout {
    let header = TextContainer::new(HEADER_ID, "header", HEADER_RECT, header_text(list))
        .with_border(0, Some(5))
        .with_padding(10)
        .with_event_capture(false);

    let rows: Vec<String> = list.items().iter().take(MAX_ROWS).map(row_label).collect();

    let body = if rows.is_empty() {
        Body::EmptyState(
            TextContainer::new(LIST_ID, "empty-state", BODY_RECT, EMPTY_STATE_TEXT)
                .with_padding(10)
                .with_event_capture(true),
        )
    } else {
        #[allow(clippy::cast_possible_truncation)]
        let item_count = rows.len() as u32;
        Body::List(ListContainer {
            rect: BODY_RECT,
            border_width: 1,
            border_color: 5,
            border_radius: 0,
            padding_length: 5,
            container_id: LIST_ID,
            container_name: "cart-list".to_owned(),
            is_event_capture: 1,
            item_container: ListItemContainer {
                item_count,
                item_width: 0,
                is_item_select_border_en: 1,
                item_name: rows,
            },
        })
    };

    DeviceLayout { header, body, container_count: 2 }
}

// =============================================================================
// SPLASH
// =============================================================================

/// Two-container splash page: blank full-canvas background plus a centred image slot.
#[must_use]
pub fn splash_page() -> PageLayout {
    let background = TextContainer::new(SPLASH_BG_ID, "splash-bg", SPLASH_BG_RECT, " ")
        .with_border(0, None)
        .with_padding(0)
        .with_event_capture(true);
    let image = ImageContainer { rect: SPLASH_IMG_RECT, container_id: SPLASH_IMG_ID, container_name: SPLASH_IMG_NAME.to_owned() };

    PageLayout {
        text_object: vec![background],
        list_object: None,
        image_object: Some(vec![image]),
        container_total_num: 2,
    }
}

/// Pixel update targeting the splash image slot.
#[must_use]
pub fn splash_image_update(bytes: Vec<u8>) -> ImageRawDataUpdate {
    ImageRawDataUpdate { container_id: SPLASH_IMG_ID, container_name: SPLASH_IMG_NAME.to_owned(), image_data: bytes }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
