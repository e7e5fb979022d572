mod live;

use std::time::Duration;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{
    LdChevronLeft, LdChevronRight, LdDownload, LdLoader, LdRefreshCw, LdX,
};
use upcat_io::download::trigger_download;
use upcat_io::notice::notice_text;
use upcat_io::scroll::center_thumbnail;
use upcat_io::{FileUpload, SizeErrorModal, Thumbnails};
use upcat_session::{Candidate, Notice, Studio, StudioConfig, View};

use crate::live::{LiveStudio, Outbox};

/// How long a toast stays on screen.
const TOAST_LIFETIME: Duration = Duration::from_secs(4);

fn main() {
    dioxus::launch(app);
}

/// A notice on screen, keyed so it can be removed after its lifetime.
#[derive(Clone, Copy, PartialEq)]
struct Toast {
    key: u64,
    notice: Notice,
}

/// Run `action` against the studio and deliver its outbox: notices
/// become toasts, finished exports are handed to the browser.
fn dispatch<T>(
    mut live: Signal<LiveStudio>,
    mut toasts: Signal<Vec<Toast>>,
    mut next_toast: Signal<u64>,
    mut download_error: Signal<Option<String>>,
    action: impl FnOnce(&mut Studio<upcat_io::BlobUrls>) -> T,
) -> T {
    let (value, Outbox { notices, exports }) = live.write().act(action);

    for notice in notices {
        let key = *next_toast.peek();
        next_toast += 1;
        toasts.write().push(Toast { key, notice });
        spawn(async move {
            gloo_timers::future::sleep(TOAST_LIFETIME).await;
            toasts.write().retain(|t| t.key != key);
        });
    }

    for export in exports {
        match trigger_download(&export) {
            Ok(()) => download_error.set(None),
            Err(e) => download_error.set(Some(format!("Download failed: {e}"))),
        }
    }

    value
}

/// Root application component.
///
/// Owns the studio in a signal, runs the timer pump, validates picked
/// files off the event handler, and switches between the landing,
/// global progress, and workspace screens.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let live = use_signal(|| LiveStudio::new(StudioConfig::default()));
    let toasts = use_signal(Vec::<Toast>::new);
    let next_toast = use_signal(|| 0_u64);
    let download_error = use_signal(|| Option::<String>::None);

    // --- Timer pump ---
    // Sleeps until the next deadline (capped), then fires what came due.
    use_future(move || async move {
        loop {
            let hint = live.peek().sleep_hint();
            gloo_timers::future::sleep(hint).await;
            if live.peek().is_due() {
                dispatch(live, toasts, next_toast, download_error, |_| ());
            }
        }
    });

    // --- Keep the active thumbnail centered ---
    use_effect(move || {
        if let Some(id) = live.read().studio().session().active_id() {
            center_thumbnail(id);
        }
    });

    // --- Batch intake ---
    // Reserve the slots now; each candidate is validated in its own
    // task after yielding so the progress screen can paint first.
    let on_batch = move |candidates: Vec<Candidate>| {
        let ticket = dispatch(live, toasts, next_toast, download_error, |studio| {
            studio.begin_batch(candidates)
        });
        let Some(ticket) = ticket else {
            return;
        };
        let batch = ticket.id;
        for (index, candidate) in ticket.candidates.into_iter().enumerate() {
            spawn(async move {
                gloo_timers::future::TimeoutFuture::new(0).await;
                let verdict = upcat_session::validate(&candidate);
                dispatch(live, toasts, next_toast, download_error, |studio| {
                    if let Err(e) = studio.complete_validation(batch, index, verdict) {
                        tracing::warn!("dropping verdict: {e}");
                    }
                });
            });
        }
    };

    let on_limit = move |_| {
        dispatch(live, toasts, next_toast, download_error, |studio| {
            studio.request_add();
        });
    };

    // --- Replace ---
    let on_replacement = move |mut candidates: Vec<Candidate>| {
        if candidates.is_empty() {
            return;
        }
        let candidate = candidates.swap_remove(0);
        let outcome = dispatch(live, toasts, next_toast, download_error, |studio| {
            studio.replace_active(candidate)
        });
        tracing::debug!(?outcome, "replace finished");
    };

    let on_select = move |id| {
        dispatch(live, toasts, next_toast, download_error, |studio| {
            let _ = studio.select_active(id);
        });
    };

    // --- Read the current state for rendering ---
    let state = live.read();
    let studio = state.studio();
    let view = studio.view();
    let session = studio.snapshot();
    let pending_count = session.processing_count();
    let full = studio.free_slots() == 0;
    let changing = studio.is_changing();
    let downloading = studio.is_downloading();
    let show_upscaled = studio.show_upscaled();
    let showing_original = !show_upscaled;
    let oversize_warning = studio.oversize_warning();
    let size_error = studio.size_error();
    let active = session.active().cloned();
    let position = active
        .as_ref()
        .and_then(|entry| session.position(entry.id))
        .map_or(0, |p| p + 1);
    drop(state);

    let button_class = "inline-flex items-center gap-2 px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer";
    let quiet_class = "inline-flex items-center gap-2 px-3 py-2 rounded border border-(--border) hover:bg-[var(--surface-active)] transition-colors cursor-pointer";
    let disabled_class = "inline-flex items-center gap-2 px-4 py-2 bg-[var(--btn-disabled)] rounded text-[var(--text-disabled)] cursor-not-allowed";

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!(env!("TAILWIND_CSS_PATH")) }

        div { class: "min-h-screen bg-(--bg) text-(--text) flex flex-col",
            header { class: "px-6 py-4 border-b border-(--border)",
                h1 { class: "text-2xl font-semibold", "upcat" }
                p { class: "text-(--muted) text-sm",
                    "Upload photos, enhance them, and compare before and after"
                }
            }

            // Toasts
            div { class: "fixed top-4 right-4 z-40 flex flex-col gap-2 max-w-xs",
                for toast in toasts() {
                    {render_toast(toast.notice)}
                }
            }

            // Persistent until dismissed, on every screen.
            if oversize_warning {
                div { class: "mx-6 mt-4 flex items-start justify-between gap-3 bg-(--warning-bg) border border-(--warning-border) rounded p-3",
                    p { class: "text-sm",
                        "Some images were larger than 1920x1080 and were skipped."
                    }
                    button {
                        class: "p-1 rounded cursor-pointer",
                        aria_label: "Dismiss",
                        onclick: move |_| {
                            dispatch(live, toasts, next_toast, download_error, |studio| {
                                studio.dismiss_oversize_warning();
                            });
                        },
                        Icon { icon: LdX, width: 16, height: 16 }
                    }
                }
            }

            match view {
                View::Landing => rsx! {
                    div { class: "flex-1 flex items-center justify-center p-6",
                        div { class: "w-full max-w-lg",
                            FileUpload { on_select: on_batch }
                        }
                    }
                },
                View::Uploading | View::Enhancing => {
                    let label = if view == View::Uploading { "Uploading" } else { "Enhancing" };
                    rsx! {
                        div { class: "flex-1 flex flex-col items-center justify-center gap-3 p-6",
                            span { class: "animate-spin text-(--text-secondary)",
                                Icon { icon: LdLoader, width: 32, height: 32 }
                            }
                            p { class: "text-(--text-secondary) text-lg animate-pulse",
                                "{label} {pending_count} image(s)..."
                            }
                        }
                    }
                }
                View::Workspace => rsx! {
                    div { class: "flex-1 flex flex-col gap-4 p-6",
                        if let Some(ref entry) = active {
                            div { class: "flex flex-wrap items-center justify-between gap-2",
                                div { class: "flex items-center gap-2",
                                    button {
                                        class: quiet_class,
                                        aria_label: "Previous image",
                                        onclick: move |_| {
                                            dispatch(live, toasts, next_toast, download_error, |studio| {
                                                studio.select_previous();
                                            });
                                        },
                                        Icon { icon: LdChevronLeft, width: 16, height: 16 }
                                    }
                                    span { class: "text-sm text-(--text-secondary)",
                                        "{position} / {session.len()}"
                                    }
                                    button {
                                        class: quiet_class,
                                        aria_label: "Next image",
                                        onclick: move |_| {
                                            dispatch(live, toasts, next_toast, download_error, |studio| {
                                                studio.select_next();
                                            });
                                        },
                                        Icon { icon: LdChevronRight, width: 16, height: 16 }
                                    }
                                }

                                div { class: "flex items-center gap-1",
                                    button {
                                        class: quiet_class,
                                        "aria-pressed": "{showing_original}",
                                        onclick: move |_| {
                                            dispatch(live, toasts, next_toast, download_error, |studio| {
                                                studio.set_show_upscaled(false);
                                            });
                                        },
                                        "Original"
                                    }
                                    button {
                                        class: quiet_class,
                                        "aria-pressed": "{show_upscaled}",
                                        onclick: move |_| {
                                            dispatch(live, toasts, next_toast, download_error, |studio| {
                                                studio.set_show_upscaled(true);
                                            });
                                        },
                                        "Upscaled"
                                    }
                                }

                                div { class: "flex items-center gap-2",
                                    if changing && !entry.status.is_ready() {
                                        button {
                                            class: disabled_class,
                                            disabled: true,
                                            span { class: "animate-spin",
                                                Icon { icon: LdLoader, width: 16, height: 16 }
                                            }
                                            "Replacing..."
                                        }
                                    } else if changing {
                                        FileUpload {
                                            on_select: on_replacement,
                                            multiple: false,
                                            compact: true,
                                            label: "Choose replacement".to_owned(),
                                        }
                                        button {
                                            class: quiet_class,
                                            onclick: move |_| {
                                                dispatch(live, toasts, next_toast, download_error, |studio| {
                                                    studio.cancel_replace();
                                                });
                                            },
                                            "Cancel"
                                        }
                                    } else {
                                        button {
                                            class: quiet_class,
                                            onclick: move |_| {
                                                dispatch(live, toasts, next_toast, download_error, |studio| {
                                                    studio.begin_replace();
                                                });
                                            },
                                            Icon { icon: LdRefreshCw, width: 16, height: 16 }
                                            "Change image"
                                        }
                                    }
                                    button {
                                        class: if downloading || !entry.status.is_ready() { disabled_class } else { button_class },
                                        disabled: downloading || !entry.status.is_ready(),
                                        onclick: move |_| {
                                            dispatch(live, toasts, next_toast, download_error, |studio| {
                                                studio.request_download();
                                            });
                                        },
                                        if downloading {
                                            span { class: "animate-spin",
                                                Icon { icon: LdLoader, width: 16, height: 16 }
                                            }
                                            "Preparing..."
                                        } else {
                                            Icon { icon: LdDownload, width: 16, height: 16 }
                                            "Download"
                                        }
                                    }
                                }
                            }

                            if let Some(ref err) = download_error() {
                                div { class: "bg-(--error-bg) border border-(--error-border) rounded p-3",
                                    p { class: "text-(--text-error) text-sm", "{err}" }
                                }
                            }

                            {render_preview(entry, show_upscaled)}
                        }

                        Thumbnails {
                            session: session.clone(),
                            on_select: on_select,
                        }

                        div { class: "flex justify-center",
                            if full {
                                button { class: quiet_class, onclick: on_limit, "Add images" }
                            } else {
                                FileUpload {
                                    on_select: on_batch,
                                    compact: true,
                                    label: "Add images".to_owned(),
                                }
                            }
                        }
                    }
                },
            }

            if size_error {
                SizeErrorModal {
                    on_close: move |()| {
                        dispatch(live, toasts, next_toast, download_error, |studio| {
                            studio.dismiss_size_error();
                        });
                    },
                    on_retry: move |()| {
                        dispatch(live, toasts, next_toast, download_error, |studio| {
                            studio.retry_from_size_error();
                        });
                    },
                }
            }
        }
    }
}

/// Render the large preview of the active entry.
///
/// The "upscaled" side is simulated: the same pixels rendered smoothed
/// at the full preview width.
fn render_preview(entry: &upcat_session::ImageEntry, show_upscaled: bool) -> Element {
    let name = entry.source.download_name();
    let src = entry.display_ref.as_str();
    let dims = entry.source.dimensions;
    let processing = !entry.status.is_ready();
    let (label, image_class) = if show_upscaled {
        ("Upscaled", "w-full h-full object-contain [image-rendering:auto]")
    } else {
        ("Original", "max-w-full max-h-full object-contain [image-rendering:pixelated]")
    };

    rsx! {
        div { class: "relative flex-1 min-h-[320px] flex items-center justify-center rounded bg-[var(--preview-bg)] overflow-hidden",
            if !src.is_empty() {
                img { src: "{src}", class: image_class, alt: "{name}" }
            }
            span { class: "absolute bottom-2 left-2 px-2 py-1 rounded bg-black/50 text-white text-xs",
                "{label} · {name} · {dims}"
            }
            if processing {
                div { class: "absolute inset-0 flex flex-col items-center justify-center gap-2 bg-black/40 text-white",
                    span { class: "animate-spin",
                        Icon { icon: LdLoader, width: 28, height: 28 }
                    }
                    "Processing..."
                }
            }
        }
    }
}

/// Render one notice as a toast.
fn render_toast(notice: Notice) -> Element {
    let (title, description) = notice_text(notice);
    rsx! {
        div { class: "bg-(--surface) border border-(--border) rounded shadow p-3",
            p { class: "font-semibold text-sm text-(--text-heading)", "{title}" }
            p { class: "text-sm text-(--text-secondary)", "{description}" }
        }
    }
}
