//! Keep the active thumbnail visible.

use upcat_session::EntryId;
use web_sys::{ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

/// DOM id of the thumbnail button for an entry.
#[must_use]
pub fn thumbnail_dom_id(id: EntryId) -> String {
    format!("thumb-{id}")
}

/// Smoothly scroll the thumbnail strip so the entry's thumbnail is
/// centered horizontally.
///
/// Silently does nothing outside a browser or when the thumbnail is not
/// mounted yet.
pub fn center_thumbnail(id: EntryId) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(element) = document.get_element_by_id(&thumbnail_dom_id(id)) else {
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Nearest);
    options.set_inline(ScrollLogicalPosition::Center);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}
