use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// State and callbacks for a text field that commits a parsed value.
#[derive(Clone)]
pub struct ParsedInput {
    /// The current text content of the input field.
    pub text: String,
    /// Message from the last failed commit, cleared by the next success.
    pub error: Option<String>,
    /// For the input's `oninput` event.
    pub on_text_input: Callback<InputEvent>,
    /// Parse the current text and, if valid, emit it to `on_valid`.
    /// Wire to `onchange` and to Enter in `onkeydown`.
    pub on_commit: Callback<()>,
    /// Overwrite the text programmatically, e.g. with a canonical value.
    pub set_text: Callback<String>,
}

/// Text field whose committed value goes through `parse` before reaching
/// `on_valid`. Valid text is rewritten to `T`'s `Display` form; invalid
/// text stays in the field together with an error.
#[hook]
pub fn use_parsed_input<T: std::fmt::Display + 'static>(
    initial_text: String,
    parse: Rc<dyn Fn(&str) -> Result<T, String>>,
    on_valid: Callback<T>,
) -> ParsedInput {
    let text = use_state(|| initial_text);
    let error = use_state(|| None::<String>);

    let on_text_input = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text.set(input.value());
        })
    };

    let on_commit = {
        let text = text.clone();
        let error = error.clone();
        Callback::from(move |_| match parse(text.as_str()) {
            Ok(value) => {
                // Canonical form, even when the committed value is unchanged
                text.set(value.to_string());
                error.set(None);
                on_valid.emit(value);
            }
            Err(msg) => error.set(Some(msg)),
        })
    };

    let set_text = {
        let text = text.clone();
        let error = error.clone();
        Callback::from(move |new_text: String| {
            text.set(new_text);
            error.set(None);
        })
    };

    ParsedInput {
        text: (*text).clone(),
        error: (*error).clone(),
        on_text_input,
        on_commit,
        set_text,
    }
}

/// `onkeydown` handler that commits on Enter.
pub fn commit_on_enter(on_commit: Callback<()>) -> Callback<KeyboardEvent> {
    Callback::from(move |e: KeyboardEvent| {
        if e.key() == "Enter" {
            on_commit.emit(());
        }
    })
}
