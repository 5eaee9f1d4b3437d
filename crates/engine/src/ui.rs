// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog of meeting-provider UI signatures
//!
//! Phrases are matched against lowercased visible text. Selectors use the
//! case-insensitive attribute flag so one entry covers label casing changes.

use av_core::{JoinCandidate, Locator, MeetingErrorKind};

/// Error pages, checked in order; the first matching phrase wins
pub const ERROR_PHRASES: &[(MeetingErrorKind, &[&str])] = &[
    (
        MeetingErrorKind::NotFound,
        &[
            "check your meeting code",
            "meeting not found",
            "invalid meeting",
            "this meeting link is invalid",
            "couldn't find the meeting",
            "no meeting found",
        ],
    ),
    (
        MeetingErrorKind::Ended,
        &[
            "the meeting has ended",
            "this meeting has ended",
            "this call has ended",
            "you left the meeting",
            "you've left the meeting",
            "you have been removed from the meeting",
        ],
    ),
    (
        MeetingErrorKind::AccessDenied,
        &[
            "you can't join this video call",
            "you can't join this call",
            "your request to join was denied",
            "someone in the call denied your request",
            "you don't have permission",
            "access denied",
        ],
    ),
    (
        MeetingErrorKind::Full,
        &[
            "meeting is full",
            "call is full",
            "maximum number of participants",
            "reached the participant limit",
        ],
    ),
];

/// URL fragments of provider error pages without a recognizable phrase
pub const ERROR_URL_MARKERS: &[&str] = &["/_meet/whoops", "/meeting-error", "error=meeting"];

pub const AUTH_PHRASES: &[&str] = &[
    "sign in to join",
    "sign in to continue",
    "you must sign in",
    "choose an account",
    "enter your password",
    "verify it's you",
    "use your google account",
];

pub const AUTH_URL_MARKERS: &[&str] = &[
    "accounts.google.com",
    "login.microsoftonline.com",
    "login.live.com",
    "/signin",
    "/login",
];

/// A visible password field means a sign-in form, whatever the text says
pub const AUTH_INPUTS: &[&str] = &["input[type='password']"];

/// Known join controls: (label, locator, specificity)
const JOIN_CONTROLS: &[(&str, Selector, u8)] = &[
    ("join now", Selector::Text("join now"), 90),
    ("ask to join", Selector::Text("ask to join"), 80),
    (
        "prejoin join button",
        Selector::Css("button[data-tid='prejoin-join-button']"),
        75,
    ),
    (
        "join button",
        Selector::Css("button[aria-label*='join meeting' i]"),
        70,
    ),
    ("join meeting", Selector::Text("join meeting"), 60),
    ("join from your browser", Selector::Text("join from your browser"), 50),
    ("continue on this browser", Selector::Text("continue on this browser"), 40),
    ("join", Selector::Text("join"), 10),
];

pub const MIC_TOGGLE: &[&str] = &[
    "[aria-label*='microphone' i]",
    "[data-tid='toggle-mute']",
];

pub const CAMERA_TOGGLE: &[&str] = &["[aria-label*='camera' i]", "[data-tid='toggle-video']"];

pub const CHAT_TOGGLE: &[&str] = &[
    "[aria-label*='chat with everyone' i]",
    "[data-tid='chat-button']",
    "button[aria-label*='chat' i]",
];

/// Chat text boxes, most specific first
pub const CHAT_INPUT: &[&str] = &[
    "textarea[aria-label*='send a message' i]",
    "textarea[aria-label*='message' i]",
    "[contenteditable='true'][aria-label*='message' i]",
    "[data-tid='ckeditor']",
];

/// Name prompt shown to guests on the pre-join screen
pub const GUEST_NAME_INPUT: &[&str] = &[
    "input[aria-label*='your name' i]",
    "input[placeholder*='your name' i]",
];

/// Labels tried when the page is unrecognized: join-like first, then
/// interstitial dismissals
pub const HEURISTIC_LABELS: &[&str] = &[
    "enter meeting",
    "start meeting",
    "launch meeting",
    "open meeting",
    "admit",
    "enter",
    "start",
    "continue",
    "proceed",
    "got it",
    "dismiss",
];

/// Join-like controls labelled only through `aria-label`
pub const HEURISTIC_SELECTORS: &[&str] = &[
    "[aria-label*='join' i]",
    "[aria-label*='enter meeting' i]",
    "[aria-label*='start meeting' i]",
];

pub const JOIN_SHORTCUTS: &[&str] = &["Enter"];

/// In-meeting control groups; two or more present means we are inside
pub const CONTROL_GROUPS: &[(&str, &[&str])] = &[
    ("mic", MIC_TOGGLE),
    ("camera", CAMERA_TOGGLE),
    ("chat", CHAT_TOGGLE),
];

#[derive(Clone, Copy)]
enum Selector {
    Css(&'static str),
    Text(&'static str),
}

impl Selector {
    fn locator(self) -> Locator {
        match self {
            Selector::Css(s) => Locator::css(s),
            Selector::Text(t) => Locator::text(t),
        }
    }
}

/// Every known join control, most specific first
pub fn join_controls() -> Vec<JoinCandidate> {
    JOIN_CONTROLS
        .iter()
        .map(|(label, selector, specificity)| {
            JoinCandidate::click(*label, selector.locator(), *specificity)
        })
        .collect()
}
