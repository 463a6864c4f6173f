//! Integration tests for the form validation session: field events,
//! cross-field rules, hints, and the submit gate.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use event_intake::clock::{Clock, FixedClock};
use event_intake::models::field::{FieldKind, FieldSpec, FieldValues};
use event_intake::models::form::{FormMode, FormSchema};
use event_intake::models::verdict::Violation;
use event_intake::session::{
    FieldState, FormValidationSession, HintKind, MemoryPresenter, SubmitOutcome,
};
use event_intake::AppError;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("date")
}

fn session(schema: FormSchema) -> FormValidationSession<MemoryPresenter> {
    FormValidationSession::new(schema, MemoryPresenter::new())
        .with_clock(Arc::new(FixedClock::on_date(today())))
}

fn complete_request() -> FieldValues {
    FieldValues::from([
        ("event_name".to_owned(), "Spring Fair".to_owned()),
        ("description".to_owned(), String::new()),
        ("location".to_owned(), "Main Hall".to_owned()),
        ("date".to_owned(), "2026-10-26".to_owned()),
        ("start_time".to_owned(), "09:00".to_owned()),
        ("end_time".to_owned(), "11:30".to_owned()),
        ("participant_limit".to_owned(), "120".to_owned()),
    ])
}

/// Clock whose instant the test can move.
struct ManualClock(Mutex<NaiveDateTime>);

impl ManualClock {
    fn at(date: NaiveDate, hour: u32, minute: u32) -> Self {
        Self(Mutex::new(date.and_time(
            NaiveTime::from_hms_opt(hour, minute, 0).expect("time"),
        )))
    }

    fn set(&self, date: NaiveDate, hour: u32, minute: u32) {
        *self.0.lock().expect("clock lock") =
            date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).expect("time"));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().expect("clock lock")
    }
}

// ── End-to-end scenarios ────────────────────────────────

#[test]
fn new_request_dated_today_is_blocked_on_the_date_field() {
    let mut values = complete_request();
    values.insert("date".into(), "2026-10-19".into());
    let mut form = session(FormSchema::request_event()).with_values(&values);

    let SubmitOutcome::Blocked {
        first_invalid,
        errors,
    } = form.submit()
    else {
        panic!("submit should be blocked");
    };
    assert_eq!(first_invalid, "date");
    assert_eq!(errors.len(), 1);

    let message = form.presenter().error("date").expect("date error shown");
    assert!(message.contains("at least 7 days from today"), "{message}");
    assert_eq!(form.field_state("date"), Some(FieldState::Invalid));
    assert_eq!(
        form.verdict("date").and_then(|v| v.violation()),
        Some(Violation::DateTooEarly)
    );
    assert_eq!(form.presenter().focused(), Some("date"));
}

#[test]
fn edit_with_end_before_start_is_blocked_on_the_end_field() {
    let mut values = complete_request();
    values.insert("start_time".into(), "14:00".into());
    values.insert("end_time".into(), "13:00".into());
    let mut form = session(FormSchema::edit_request()).with_values(&values);

    let outcome = form.submit();

    assert!(!outcome.is_allowed());
    let view = form.presenter();
    assert_eq!(view.error("end_time"), Some("End time must be after start time."));
    assert_eq!(view.error("start_time"), None);
    assert_eq!(view.hint("end_time", HintKind::Duration), None);
    assert_eq!(view.focused(), Some("end_time"));
}

#[test]
fn postpone_to_tomorrow_with_valid_range_is_allowed() {
    let values = FieldValues::from([
        ("new_date".to_owned(), "2026-10-20".to_owned()),
        ("new_start_time".to_owned(), "09:00".to_owned()),
        ("new_end_time".to_owned(), "11:00".to_owned()),
    ]);
    let mut form = session(FormSchema::postpone_event()).with_values(&values);

    let outcome = form.submit();

    for field in ["new_date", "new_start_time", "new_end_time", "reason"] {
        assert_eq!(form.field_state(field), Some(FieldState::Valid), "{field}");
    }
    assert_eq!(
        form.presenter().hint("new_end_time", HintKind::Duration),
        Some("2 hours")
    );
    assert!(form.presenter().errors().is_empty());

    let SubmitOutcome::Allowed { values: submitted } = outcome else {
        panic!("submit should be allowed");
    };
    assert_eq!(submitted.get("new_date").map(String::as_str), Some("2026-10-20"));
}

#[test]
fn required_error_appears_on_blur_and_clears_on_next_input() {
    let schema = FormSchema {
        id: "contact".into(),
        mode: FormMode::NewRequest,
        fields: vec![FieldSpec::new("contact_name", "Contact name", FieldKind::Text).required()],
        date_field: None,
        start_time_field: None,
        end_time_field: None,
    };
    let mut form = session(schema);

    let state = form.on_blur("contact_name").expect("blur");
    assert_eq!(state, FieldState::Invalid);
    assert_eq!(
        form.presenter().error("contact_name"),
        Some("Contact name is required.")
    );

    let state = form.on_input("contact_name", "J").expect("input");
    assert_eq!(state, FieldState::Valid);
    assert_eq!(form.presenter().error("contact_name"), None);
    assert_eq!(form.presenter().state("contact_name"), FieldState::Valid);
}

// ── Event triggers ──────────────────────────────────────

#[test]
fn typing_into_untouched_field_does_not_validate() {
    let mut form = session(FormSchema::request_event());

    let state = form.on_input("event_name", "a").expect("input");

    assert_eq!(state, FieldState::Untouched);
    assert_eq!(form.presenter().error("event_name"), None);
    assert_eq!(form.verdict("event_name"), None);
    assert_eq!(form.value("event_name"), Some("a"));
}

#[test]
fn typing_into_valid_field_waits_for_blur() {
    let mut form = session(FormSchema::request_event());
    form.on_input("event_name", "Spring Fair").expect("input");
    assert_eq!(form.on_blur("event_name").expect("blur"), FieldState::Valid);

    assert_eq!(form.on_input("event_name", "Sp").expect("input"), FieldState::Valid);
    assert_eq!(form.on_blur("event_name").expect("blur"), FieldState::Invalid);
}

#[test]
fn message_is_replaced_not_duplicated() {
    let mut form = session(FormSchema::request_event());
    form.on_blur("event_name").expect("blur");
    assert_eq!(
        form.presenter().error("event_name"),
        Some("Event name is required.")
    );

    form.on_input("event_name", "ab").expect("input");
    assert_eq!(
        form.presenter().error("event_name"),
        Some("Event name must be at least 3 characters long.")
    );
    assert_eq!(form.presenter().errors().len(), 1);
}

#[test]
fn change_validates_immediately() {
    let mut form = session(FormSchema::request_event());
    let state = form.on_change("participant_limit", "20000").expect("change");
    assert_eq!(state, FieldState::Invalid);
    assert_eq!(
        form.presenter().error("participant_limit"),
        Some("Participant limit cannot exceed 10,000.")
    );
}

#[test]
fn unknown_field_is_not_found() {
    let mut form = session(FormSchema::request_event());
    assert!(matches!(form.on_input("nope", "x"), Err(AppError::NotFound(_))));
    assert!(matches!(form.on_blur("nope"), Err(AppError::NotFound(_))));
    assert!(matches!(form.on_change("nope", "x"), Err(AppError::NotFound(_))));
    assert_eq!(form.field_state("nope"), None);
}

// ── Cross-field rules and hints ─────────────────────────

#[test]
fn moving_start_revalidates_a_touched_end() {
    let mut form = session(FormSchema::request_event());
    form.on_change("start_time", "09:00").expect("start");
    form.on_change("end_time", "10:00").expect("end");
    assert_eq!(
        form.presenter().hint("end_time", HintKind::Duration),
        Some("1 hour")
    );

    form.on_change("start_time", "11:00").expect("start");
    assert_eq!(form.field_state("end_time"), Some(FieldState::Invalid));
    assert_eq!(form.presenter().hint("end_time", HintKind::Duration), None);

    form.on_change("start_time", "08:15").expect("start");
    assert_eq!(form.field_state("end_time"), Some(FieldState::Valid));
    assert_eq!(
        form.presenter().hint("end_time", HintKind::Duration),
        Some("1 hour 45 minutes")
    );
}

#[test]
fn moving_start_leaves_an_untouched_end_alone() {
    let mut form = session(FormSchema::request_event());
    form.on_change("start_time", "09:00").expect("start");
    assert_eq!(form.field_state("end_time"), Some(FieldState::Untouched));
}

#[test]
fn malformed_start_is_reported_on_start_only() {
    let mut form = session(FormSchema::request_event());
    form.on_change("end_time", "10:00").expect("end");
    form.on_change("start_time", "9am").expect("start");

    assert_eq!(
        form.presenter().error("start_time"),
        Some("Please enter a valid time (HH:MM).")
    );
    assert_eq!(form.field_state("end_time"), Some(FieldState::Valid));
    assert_eq!(form.presenter().hint("end_time", HintKind::Duration), None);
}

#[test]
fn valid_date_shows_long_form_hint() {
    let mut form = session(FormSchema::request_event());

    form.on_change("date", "2026-10-26").expect("date");
    assert_eq!(
        form.presenter().hint("date", HintKind::DateInfo),
        Some("Monday, October 26, 2026")
    );

    form.on_change("date", "2026-10-20").expect("date");
    assert_eq!(form.presenter().hint("date", HintKind::DateInfo), None);
    assert_eq!(
        form.presenter().error("date"),
        Some("Event date must be at least 7 days from today.")
    );
}

#[test]
fn malformed_date_is_a_format_error() {
    let mut form = session(FormSchema::request_event());
    form.on_change("date", "26/10/2026").expect("date");
    assert_eq!(
        form.verdict("date").and_then(|v| v.violation()),
        Some(Violation::MalformedDate)
    );
}

#[test]
fn date_minimum_follows_the_clock_across_midnight() {
    let clock = Arc::new(ManualClock::at(today(), 23, 50));
    let mut form = FormValidationSession::new(FormSchema::edit_request(), MemoryPresenter::new())
        .with_clock(clock.clone());

    assert_eq!(
        form.on_change("date", "2026-10-20").expect("date"),
        FieldState::Valid
    );

    clock.set(NaiveDate::from_ymd_opt(2026, 10, 20).expect("date"), 0, 5);
    assert_eq!(form.on_blur("date").expect("blur"), FieldState::Invalid);
    assert_eq!(
        form.presenter().error("date"),
        Some("Please select a future date.")
    );
}

// ── Submit gate ─────────────────────────────────────────

#[test]
fn blocked_submit_lists_failures_in_document_order() {
    let mut form = session(FormSchema::request_event());

    let SubmitOutcome::Blocked {
        first_invalid,
        errors,
    } = form.submit()
    else {
        panic!("empty form must be blocked");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        [
            "event_name",
            "location",
            "date",
            "start_time",
            "end_time",
            "participant_limit"
        ]
    );
    assert_eq!(first_invalid, "event_name");
    assert_eq!(form.presenter().focused(), Some("event_name"));
    assert_eq!(form.field_state("description"), Some(FieldState::Valid));
    assert_eq!(form.presenter().errors().len(), 6);
}

#[test]
fn complete_request_is_allowed_with_hints() {
    let mut form = session(FormSchema::request_event()).with_values(&complete_request());
    assert!(form.is_valid());

    let outcome = form.submit();

    assert_eq!(
        outcome,
        SubmitOutcome::Allowed {
            values: complete_request()
        }
    );
    assert_eq!(
        form.presenter().hint("end_time", HintKind::Duration),
        Some("2 hours 30 minutes")
    );
    assert_eq!(
        form.presenter().hint("date", HintKind::DateInfo),
        Some("Monday, October 26, 2026")
    );
}

#[test]
fn is_valid_does_not_touch_the_view() {
    let form = session(FormSchema::request_event());
    assert!(!form.is_valid());
    assert!(form.presenter().errors().is_empty());
    assert_eq!(form.field_state("event_name"), Some(FieldState::Untouched));
}

#[test]
fn fixing_the_blocking_field_unblocks_submit() {
    let mut values = complete_request();
    values.insert("participant_limit".into(), "0".into());
    let mut form = session(FormSchema::request_event()).with_values(&values);

    assert!(!form.submit().is_allowed());
    assert_eq!(
        form.presenter().error("participant_limit"),
        Some("Participant limit must be at least 1.")
    );

    form.on_input("participant_limit", "50").expect("input");
    assert_eq!(form.presenter().error("participant_limit"), None);
    assert!(form.submit().is_allowed());
}

#[test]
fn outcome_serializes_with_a_tag() {
    let mut form = session(FormSchema::request_event());
    let json = serde_json::to_value(form.submit()).expect("serialize");
    assert_eq!(json["outcome"], "blocked");
    assert_eq!(json["first_invalid"], "event_name");
    assert_eq!(json["errors"][0]["message"], "Event name is required.");
}

#[test]
fn sessions_get_distinct_ids() {
    let a = session(FormSchema::request_event());
    let b = session(FormSchema::request_event());
    assert_ne!(a.session_id(), b.session_id());
    assert_eq!(a.schema().id, "request_event");
}
