// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn text_locators_become_case_insensitive_xpath() {
    let (using, value) = locator_strategy(&Locator::text("Join Now"));
    assert_eq!(using, "xpath");
    assert!(value.contains("'join now'"));
    assert!(value.contains("@aria-label"));
}

#[test]
fn css_locators_pass_through() {
    let (using, value) = locator_strategy(&Locator::css("button[jsname='Qx7uuf']"));
    assert_eq!(using, "css selector");
    assert_eq!(value, "button[jsname='Qx7uuf']");
}

#[parameterized(
    plain = { "join", "'join'" },
    apostrophe = { "can't join", "\"can't join\"" },
    both = { "it's \"full\"", "concat('it', \"'\", 's \"full\"')" },
)]
fn xpath_literals(input: &str, expected: &str) {
    assert_eq!(xpath_literal(input), expected);
}

#[parameterized(
    gone = { "invalid session id", DriverError::SessionGone },
    missing = { "no such element", DriverError::ElementNotFound("m".into()) },
    timeout = { "timeout", DriverError::Timeout("m".into()) },
    other = { "unknown error", DriverError::Protocol("unknown error: m".into()) },
)]
fn error_codes_map_to_driver_errors(code: &str, expected: DriverError) {
    assert_eq!(map_error(code, "m"), expected);
}

#[test]
fn element_ids_reads_w3c_references() {
    let value = json!([
        { "element-6066-11e4-a52e-4f735466cecf": "a1" },
        { "unexpected": "x" },
        { "element-6066-11e4-a52e-4f735466cecf": "b2" },
    ]);
    assert_eq!(element_ids(&value), ["a1", "b2"]);
}

#[test]
fn key_actions_press_and_release_in_reverse() {
    let chord: KeyChord = "ctrl+shift+d".parse().unwrap();
    let value = key_actions(&chord);
    let actions = value["actions"][0]["actions"].as_array().unwrap();
    let kinds: Vec<_> = actions
        .iter()
        .map(|a| format!("{}:{}", a["type"].as_str().unwrap(), a["value"].as_str().unwrap()))
        .collect();
    assert_eq!(
        kinds,
        [
            "keyDown:\u{E009}",
            "keyDown:\u{E008}",
            "keyDown:d",
            "keyUp:d",
            "keyUp:\u{E008}",
            "keyUp:\u{E009}",
        ]
    );
}

#[test]
fn cookies_survive_wire_format() {
    let cookie = Cookie::new("SID", "abc").with_domain(".google.com");
    let wire = json!([cookie_json(&cookie), { "name": "broken" }]);
    assert_eq!(parse_cookies(&wire), vec![cookie]);
}

#[test]
fn capabilities_include_headless_only_when_asked() {
    let headless = WebDriver::new("http://localhost:4444/", true).unwrap();
    let headed = WebDriver::new("http://localhost:4444", false).unwrap();

    assert_eq!(headless.base_url, "http://localhost:4444");
    assert!(headless.capabilities().to_string().contains("--headless=new"));
    assert!(!headed.capabilities().to_string().contains("--headless"));
}
