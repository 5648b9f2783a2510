//! Browser-side collaborators for the countdown: the rendered text, the
//! document title and the alert sound.

use crate::config::APP_TITLE;
use countdown::countdown::{AudioSink, DisplaySink};
use countdown::{defaults::EXPIRED_MESSAGE, TickResult};
use log::warn;
use web_sys::HtmlAudioElement;
use yew::UseStateHandle;

/// Pushes each tick into component state and mirrors expiry into the
/// document title.
pub struct StateDisplay {
    text: UseStateHandle<String>,
    expired: bool,
}

impl StateDisplay {
    /// `text` should come from `use_state_eq` so unchanged text does not
    /// re-render four times a second.
    pub fn new(text: UseStateHandle<String>) -> Self {
        StateDisplay {
            text,
            expired: false,
        }
    }
}

impl DisplaySink for StateDisplay {
    fn show(&mut self, result: &TickResult) {
        self.text.set(result.to_string());

        let expired = result.is_expired();
        if expired != self.expired {
            self.expired = expired;
            gloo_utils::document().set_title(if expired { EXPIRED_MESSAGE } else { APP_TITLE });
        }
    }
}

/// Alert sound backed by a detached `<audio>` element.
pub struct AudioAlert {
    element: Option<HtmlAudioElement>,
}

impl AudioAlert {
    pub fn new(src: &str) -> Self {
        let element = match HtmlAudioElement::new_with_src(src) {
            Ok(el) => Some(el),
            Err(e) => {
                warn!("Could not create audio element for {}: {:?}", src, e);
                None
            }
        };
        AudioAlert { element }
    }
}

impl AudioSink for AudioAlert {
    fn play(&mut self) {
        let Some(element) = &self.element else {
            return;
        };
        element.set_current_time(0.0);
        // Autoplay policies may reject the promise; nothing to recover.
        if let Err(e) = element.play() {
            warn!("Alert sound failed to play: {:?}", e);
        }
    }
}
