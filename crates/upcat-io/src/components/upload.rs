//! File picker component with drag-and-drop.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use upcat_session::Candidate;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

/// Extensions offered by the native picker. Anything else that arrives
/// via drag-and-drop is still forwarded; the session rejects it.
const ACCEPT: &str = ".jpg,.jpeg,.png";

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Called with every file read from one selection, in selection order.
    on_select: EventHandler<Vec<Candidate>>,
    /// Allow choosing more than one file.
    #[props(default = true)]
    multiple: bool,
    /// Button caption.
    #[props(default = "Choose Images".to_owned())]
    label: String,
    /// Render the picker without the drop zone (for toolbar buttons).
    #[props(default = false)]
    compact: bool,
}

/// A drop zone with a file picker button.
///
/// Reads the bytes of each chosen file and fires `on_select` once with
/// the whole selection. Files that cannot be read are skipped and
/// reported inline. The input is cleared after every pick so choosing
/// the same file again fires another selection.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let mut input = use_signal(|| Option::<HtmlInputElement>::None);
    let multiple = props.multiple;

    // Shared by the picker and drag-and-drop paths.
    let process_files = move |files: Vec<FileData>| async move {
        let files: Vec<FileData> = if multiple {
            files
        } else {
            files.into_iter().take(1).collect()
        };
        if files.is_empty() {
            return;
        }
        let mut candidates = Vec::with_capacity(files.len());
        let mut unreadable = 0_usize;
        for file in files {
            let name = file.name();
            let reported = file.content_type();
            match file.read_bytes().await {
                Ok(bytes) => candidates.push(Candidate::from_reported_type(
                    name,
                    reported.as_deref(),
                    bytes.to_vec(),
                )),
                Err(e) => {
                    tracing::warn!(%name, "failed to read file: {e}");
                    unreadable += 1;
                }
            }
        }
        if unreadable > 0 {
            error.set(Some(format!("Failed to read {unreadable} file(s)")));
        } else {
            error.set(None);
        }
        if let Some(element) = input.peek().as_ref() {
            element.set_value("");
        }
        if !candidates.is_empty() {
            props.on_select.call(candidates);
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let picker = rsx! {
        label {
            class: "inline-block px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded cursor-pointer text-white font-medium transition-colors",
            input {
                r#type: "file",
                accept: ACCEPT,
                multiple: multiple,
                class: "hidden",
                onmounted: move |evt: MountedEvent| {
                    let data = evt.data();
                    input.set(
                        data.downcast::<web_sys::Element>()
                            .and_then(|el| el.clone().dyn_into::<HtmlInputElement>().ok()),
                    );
                },
                onchange: handle_files,
            }
            "{props.label}"
        }
    };

    if props.compact {
        return picker;
    }

    let border_class = if dragging() {
        "border-[var(--border-accent)] bg-[var(--surface-active)]"
    } else {
        "border-[var(--border-muted)] bg-[var(--surface)]"
    };

    rsx! {
        div {
            class: "border-2 border-dashed rounded-lg p-6 text-center transition-colors {border_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref err) = error() {
                p { class: "text-[var(--text-error)] mb-2",
                    "{err}"
                }
            }

            p { class: "text-[var(--text-secondary)] mb-3",
                "Drop images here or "
            }

            {picker}

            p { class: "text-[var(--muted)] text-sm mt-2",
                "JPEG or PNG, up to 1920x1080"
            }
        }
    }
}
