//! Modal shown when a replacement image is too large.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdX;

/// Props for the [`SizeErrorModal`] component.
#[derive(Props, Clone, PartialEq)]
pub struct SizeErrorModalProps {
    /// Close without retrying.
    on_close: EventHandler<()>,
    /// Close and pick another replacement.
    on_retry: EventHandler<()>,
}

/// Explains the dimension ceiling and offers to pick another file.
#[component]
pub fn SizeErrorModal(props: SizeErrorModalProps) -> Element {
    rsx! {
        div {
            class: "fixed inset-0 z-50 flex items-center justify-center bg-black/60",
            role: "dialog",
            "aria-modal": "true",
            onclick: move |_| props.on_close.call(()),

            div {
                class: "relative max-w-sm w-full mx-4 p-6 rounded-lg bg-[var(--surface)] space-y-4",
                onclick: move |evt| evt.stop_propagation(),

                button {
                    class: "absolute top-2 right-2 p-1 rounded hover:bg-[var(--surface-active)] cursor-pointer",
                    aria_label: "Close",
                    onclick: move |_| props.on_close.call(()),
                    Icon { icon: LdX, width: 16, height: 16 }
                }

                h3 { class: "text-lg font-semibold text-[var(--text-heading)]",
                    "Image too large"
                }
                p { class: "text-[var(--text-secondary)]",
                    "Images must be at most 1920x1080 pixels. Choose a smaller image."
                }

                div { class: "flex justify-end",
                    button {
                        class: "px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer",
                        onclick: move |_| props.on_retry.call(()),
                        "Choose another image"
                    }
                }
            }
        }
    }
}
