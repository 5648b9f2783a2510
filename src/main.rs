//! Main module for the CountDown application using Yew.
//! Wires the countdown engine to the DOM, the scheduler and the inputs.

use chrono::{DateTime, Datelike, Local};
use countdown::clock::{Clock, LocalClock};
use countdown::countdown::Countdown;
use countdown::defaults::EXPIRED_MESSAGE;
use countdown::presets::PresetTable;
use countdown::TimeOfDay;
use gloo_timers::callback::Interval;
use log::info;
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod config;
mod dom;
mod hooks;
mod utils;

use components::{CountdownDisplay, PresetButtons, QuickDurations, SoundToggle};
use config::*;
use dom::{AudioAlert, StateDisplay};
use hooks::{commit_on_enter, use_parsed_input};
use utils::{format_end_at, validate_duration, validate_end_at};

type WebCountdown = Countdown<LocalClock, StateDisplay, AudioAlert>;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Run a setter on the countdown, refresh the display right away and
/// publish the new target.
fn retarget(
    countdown: &Rc<RefCell<WebCountdown>>,
    target: &UseStateHandle<DateTime<Local>>,
    set: impl FnOnce(&mut WebCountdown),
) {
    let mut countdown = countdown.borrow_mut();
    set(&mut countdown);
    countdown.tick();
    target.set(countdown.target());
}

// ──────────────────────────────────────────────────────────────────────────────

/// Primary application component wiring state, effects, and UI elements.
#[function_component(App)]
fn app() -> Html {
    let presets = use_memo((), |_| PresetTable::builtin());
    let display_text = use_state_eq(String::new);

    let countdown = {
        let display_text = display_text.clone();
        let presets = presets.clone();
        use_mut_ref(move || {
            let mut countdown = Countdown::new(
                LocalClock,
                StateDisplay::new(display_text),
                AudioAlert::new(ALERT_SOUND_SRC),
            );
            countdown.set_sound_enabled(SOUND_ENABLED_BY_DEFAULT);
            if AUTO_SELECT_PRESET && !countdown.select_best_preset(&presets) {
                info!("No preset left for today, counting down from the default");
            }
            countdown
        })
    };

    let target = use_state_eq(|| countdown.borrow().target());
    let sound_enabled = use_state(|| SOUND_ENABLED_BY_DEFAULT);
    let notice = use_state(|| None::<String>);

    // Drive the countdown for as long as the app is mounted
    {
        let countdown = countdown.clone();
        use_effect_with((), move |_| {
            countdown.borrow_mut().tick();
            let interval = Interval::new(TICK_INTERVAL_MS, move || {
                countdown.borrow_mut().tick();
            });
            move || drop(interval)
        });
    }

    // --- Setters ---
    let on_end_at = {
        let countdown = countdown.clone();
        let target = target.clone();
        let notice = notice.clone();
        Callback::from(move |time: TimeOfDay| {
            notice.set(None);
            retarget(&countdown, &target, |c| c.set_from_time_of_day(time));
        })
    };
    let on_duration = {
        let countdown = countdown.clone();
        let target = target.clone();
        let notice = notice.clone();
        Callback::from(move |minutes: u32| {
            notice.set(None);
            retarget(&countdown, &target, |c| c.set_from_duration(minutes, false));
        })
    };
    let on_quick_duration = {
        let countdown = countdown.clone();
        let target = target.clone();
        let notice = notice.clone();
        Callback::from(move |minutes: u32| {
            notice.set(None);
            retarget(&countdown, &target, |c| c.set_from_duration(minutes, true));
        })
    };
    let on_best = {
        let countdown = countdown.clone();
        let target = target.clone();
        let notice = notice.clone();
        let presets = presets.clone();
        Callback::from(move |_: ()| {
            let mut found = false;
            retarget(&countdown, &target, |c| found = c.select_best_preset(&presets));
            notice.set((!found).then(|| "No presets left for today".to_string()));
        })
    };
    let on_sound_toggle = {
        let countdown = countdown.clone();
        let sound_enabled = sound_enabled.clone();
        Callback::from(move |enabled: bool| {
            countdown.borrow_mut().set_sound_enabled(enabled);
            sound_enabled.set(enabled);
        })
    };

    let parse_end_at: Rc<dyn Fn(&str) -> Result<TimeOfDay, String>> = Rc::new(validate_end_at);
    let end_at = use_parsed_input(format_end_at(target.naive_local()), parse_end_at, on_end_at.clone());
    let parse_duration: Rc<dyn Fn(&str) -> Result<u32, String>> = Rc::new(validate_duration);
    let duration = use_parsed_input(DEFAULT_DURATION_MIN.to_string(), parse_duration, on_duration);

    // --- Synchronization Effects (Target -> End-at Text) ---
    {
        let set_text = end_at.set_text.clone();
        use_effect_with(*target, move |&current_target| {
            set_text.emit(format_end_at(current_target.naive_local()));
            || ()
        });
    }

    let weekday = LocalClock.now().weekday();
    let expired = *display_text == EXPIRED_MESSAGE;

    html! {
        <div class="container">
            <h1>{ APP_TITLE }</h1>

            <CountdownDisplay text={(*display_text).clone()} {expired} />
            <div class="target-info">{ format!("Ends at {}", format_end_at(target.naive_local())) }</div>

            <div class="top-controls">
                <div class="form-group">
                    <label for="end_at_input">{ "End at:" }</label>
                    <input
                        type="text"
                        id="end_at_input"
                        placeholder="HH:MM"
                        value={end_at.text.clone()}
                        class={if end_at.error.is_some() { "invalid" } else { "" }}
                        oninput={end_at.on_text_input.clone()}
                        onchange={end_at.on_commit.reform(|_| ())}
                        onkeydown={commit_on_enter(end_at.on_commit.clone())}
                    />
                    if let Some(ref err) = end_at.error {
                        <div class="input-error">{ err }</div>
                    }
                </div>

                <div class="form-group">
                    <label for="duration_input">{ "Minutes:" }</label>
                    <input
                        type="number"
                        id="duration_input"
                        min={MIN_DURATION_MIN.to_string()}
                        max={MAX_DURATION_MIN.to_string()}
                        value={duration.text.clone()}
                        class={if duration.error.is_some() { "invalid" } else { "" }}
                        oninput={duration.on_text_input.clone()}
                        onkeydown={commit_on_enter(duration.on_commit.clone())}
                    />
                    <button class="btn-primary" onclick={duration.on_commit.reform(|_| ())}>
                        { "Start" }
                    </button>
                    if let Some(ref err) = duration.error {
                        <div class="input-error">{ err }</div>
                    }
                </div>

                <QuickDurations on_select={on_quick_duration} />
                <SoundToggle enabled={*sound_enabled} on_toggle={on_sound_toggle} />
            </div>

            <PresetButtons table={presets.clone()} {weekday} on_select={on_end_at} {on_best} />

            if let Some(ref msg) = *notice {
                <div class="notice compact">{ msg }</div>
            }
        </div>
    }
}

/// Entry point: initializes Yew renderer for the App component.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
