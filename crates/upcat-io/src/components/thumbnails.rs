//! Horizontal strip of entry thumbnails.
//!
//! Clicking a thumbnail makes that entry active. Entries still being
//! processed show a spinner over their thumbnail.

use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdLoader;
use upcat_session::{EntryId, ImageEntry, Session};

use crate::scroll::thumbnail_dom_id;

/// Props for the [`Thumbnails`] component.
#[derive(Props, Clone)]
pub struct ThumbnailsProps {
    /// Session snapshot to render.
    session: Arc<Session>,
    /// Callback fired when a thumbnail is clicked.
    on_select: EventHandler<EntryId>,
}

impl PartialEq for ThumbnailsProps {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.session, &other.session)
    }
}

/// Scrollable strip with one tile per entry, in session order.
///
/// The active tile is highlighted with the accent border.
#[component]
pub fn Thumbnails(props: ThumbnailsProps) -> Element {
    let active = props.session.active_id();

    rsx! {
        div {
            class: "flex flex-nowrap overflow-x-auto gap-2 py-2 scrollbar-thin",

            for entry in props.session.entries() {
                {render_tile(entry, active == Some(entry.id), &props.on_select)}
            }
        }
    }
}

/// Render a single thumbnail tile.
fn render_tile(entry: &ImageEntry, is_active: bool, on_select: &EventHandler<EntryId>) -> Element {
    let border = if is_active {
        "border-2 border-[var(--border-accent)]"
    } else {
        "border border-[var(--border)]"
    };

    let id = entry.id;
    let onclick = {
        let on_select = *on_select;
        move |_| on_select.call(id)
    };
    let name = entry.source.download_name();
    let src = entry.display_ref.as_str().to_owned();
    let processing = !entry.status.is_ready();

    rsx! {
        button {
            key: "{id}",
            id: "{thumbnail_dom_id(id)}",
            class: "relative flex-shrink-0 p-1 rounded cursor-pointer w-[80px] md:w-[100px]
                    bg-[var(--surface)] hover:bg-[var(--surface-active)] transition-colors {border}",
            onclick: onclick,
            title: "{name}",
            aria_label: "Select {name}",
            "aria-pressed": "{is_active}",

            div { class: "w-full aspect-square overflow-hidden rounded bg-[var(--preview-bg)]",
                if !src.is_empty() {
                    img {
                        src: "{src}",
                        class: "w-full h-full object-cover",
                        alt: "{name} thumbnail",
                    }
                }
            }

            if processing {
                div { class: "absolute inset-0 flex items-center justify-center bg-black/40 rounded",
                    span { class: "animate-spin text-white",
                        Icon { icon: LdLoader, width: 20, height: 20 }
                    }
                }
            }
        }
    }
}
