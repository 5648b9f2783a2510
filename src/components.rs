//! Pure Yew view components for the countdown UI.
//!
//! This module contains stateless components that render based on props,
//! so all countdown state stays in the `App` component.

use crate::config::QUICK_DURATIONS_MIN;
use crate::utils::format_preset_time;
use chrono::Weekday;
use countdown::presets::PresetTable;
use countdown::TimeOfDay;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CountdownDisplayProps {
    pub text: AttrValue,
    pub expired: bool,
}

/// The large `MM:SS` / "Times Up!" readout.
#[function_component(CountdownDisplay)]
pub fn countdown_display(props: &CountdownDisplayProps) -> Html {
    html! {
        <div class={classes!("timer", props.expired.then_some("expired"))}>
            { props.text.to_string() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct QuickDurationsProps {
    pub on_select: Callback<u32>,
}

/// One button per entry of `QUICK_DURATIONS_MIN`.
#[function_component(QuickDurations)]
pub fn quick_durations(props: &QuickDurationsProps) -> Html {
    html! {
        <div class="quick-durations">
            { QUICK_DURATIONS_MIN.iter().map(|&minutes| {
                let on_select = props.on_select.clone();
                html! {
                    <button class="btn-secondary small"
                        onclick={Callback::from(move |_| on_select.emit(minutes))}>
                        { format!("{} min", minutes) }
                    </button>
                }
            }).collect::<Html>() }
        </div>
    }
}

/// Buttons for the presets of a single weekday plus a "Best" shortcut.
///
/// Empty slots render as spacers so each day keeps the same grid.
#[derive(Properties, PartialEq)]
pub struct PresetButtonsProps {
    pub table: Rc<PresetTable>,
    pub weekday: Weekday,
    pub on_select: Callback<TimeOfDay>,
    pub on_best: Callback<()>,
}

#[function_component(PresetButtons)]
pub fn preset_buttons(props: &PresetButtonsProps) -> Html {
    let slots = props.table.slots(props.weekday);
    if slots.is_empty() {
        return html! {
            <div class="presets">
                <p class="no-presets-message">{ format!("No presets for {}", props.weekday) }</p>
            </div>
        };
    }

    let on_best = props.on_best.clone();
    html! {
        <div class="presets">
            <button class="btn-primary" onclick={Callback::from(move |_| on_best.emit(()))}>
                { "Best" }
            </button>
            <div class="preset-grid">
                { slots.iter().map(|slot| match slot {
                    Some(preset) => {
                        let on_select = props.on_select.clone();
                        let time = preset.time();
                        html! {
                            <button class="preset" title={preset.to_string()}
                                onclick={Callback::from(move |_| on_select.emit(time))}>
                                <span class="preset-label">{ preset.label().to_string() }</span>
                                <span class="preset-time">{ format_preset_time(time) }</span>
                            </button>
                        }
                    }
                    None => html! { <span class="preset-gap"></span> },
                }).collect::<Html>() }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SoundToggleProps {
    pub enabled: bool,
    pub on_toggle: Callback<bool>,
}

#[function_component(SoundToggle)]
pub fn sound_toggle(props: &SoundToggleProps) -> Html {
    let on_toggle = props.on_toggle.clone();
    let onchange = Callback::from(move |e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        on_toggle.emit(input.checked());
    });

    html! {
        <label class="sound-toggle">
            <input type="checkbox" checked={props.enabled} {onchange} />
            { "Sound" }
        </label>
    }
}
