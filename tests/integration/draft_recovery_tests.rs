//! Integration tests for draft protection wired through a form session:
//! leave prompts, autosave on edit, recovery, and discard on submit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use event_intake::clock::FixedClock;
use event_intake::config::GlobalConfig;
use event_intake::draft::{
    DraftAutosave, DraftGuard, DraftStore, FileDraftStore, LeaveDecision, MemoryDraftStore,
};
use event_intake::models::field::FieldValues;
use event_intake::models::form::FormSchema;
use event_intake::session::{FieldState, FormValidationSession, MemoryPresenter};
use event_intake::Result;

const KEY: &str = "event_request_draft";

fn postpone_session(guard: DraftGuard) -> FormValidationSession<MemoryPresenter> {
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).expect("date");
    FormValidationSession::new(FormSchema::postpone_event(), MemoryPresenter::new())
        .with_clock(Arc::new(FixedClock::on_date(today)))
        .with_draft_guard(guard)
}

/// Store whose writes take long enough to overlap a submit.
#[derive(Default)]
struct SlowStore {
    inner: MemoryDraftStore,
    saves_started: AtomicUsize,
}

impl DraftStore for SlowStore {
    fn save(&self, key: &str, values: &FieldValues) -> Result<()> {
        self.saves_started.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(80));
        self.inner.save(key, values)
    }

    fn load(&self, key: &str) -> Result<Option<FieldValues>> {
        self.inner.load(key)
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.inner.clear(key)
    }
}

fn filled_postpone() -> [(&'static str, &'static str); 3] {
    [
        ("new_date", "2026-10-21"),
        ("new_start_time", "10:00"),
        ("new_end_time", "12:00"),
    ]
}

#[test]
fn edits_raise_the_leave_prompt_until_reverted() {
    let mut form = postpone_session(DraftGuard::new(FieldValues::new()));

    form.on_input("reason", "Venue double-booked").expect("input");
    let guard = form.draft_guard().expect("guard");
    assert!(guard.is_modified());
    assert!(guard.leave_decision().should_block());
    assert!(guard.cancel_decision().should_block());

    form.on_input("reason", "").expect("input");
    let guard = form.draft_guard().expect("guard");
    assert!(!guard.is_modified());
    assert_eq!(guard.leave_decision(), LeaveDecision::Proceed);
}

#[test]
fn blocked_submit_keeps_the_guard_armed() {
    let mut form = postpone_session(DraftGuard::new(FieldValues::new()));
    form.on_change("new_start_time", "10:00").expect("change");

    assert!(!form.submit().is_allowed());
    assert!(form.draft_guard().expect("guard").is_modified());
}

#[test]
fn allowed_submit_releases_guard_and_discards_draft() {
    let store = Arc::new(MemoryDraftStore::new());
    store
        .save(KEY, &FieldValues::from([("reason".to_owned(), "old".to_owned())]))
        .expect("seed draft");
    let guard = DraftGuard::new(FieldValues::new()).with_store(store.clone(), KEY);
    let mut form = postpone_session(guard);

    for (name, value) in filled_postpone() {
        form.on_change(name, value).expect("change");
    }
    assert!(form.submit().is_allowed());

    let guard = form.draft_guard().expect("guard");
    assert!(!guard.is_modified());
    assert_eq!(guard.leave_decision(), LeaveDecision::Proceed);
    assert_eq!(store.load(KEY).expect("load"), None);
}

#[test]
fn restore_applies_stored_values_without_validating() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileDraftStore::new(dir.path()).expect("store"));
    let draft = FieldValues::from([
        ("new_date".to_owned(), "2026-10-19".to_owned()),
        ("new_start_time".to_owned(), "10:00".to_owned()),
        ("stale_field".to_owned(), "ignored".to_owned()),
    ]);
    store.save(KEY, &draft).expect("seed draft");

    let baseline = FieldValues::new();
    let guard = DraftGuard::new(baseline).with_store(store, KEY);
    let mut form = postpone_session(guard);

    assert!(form.restore_draft());
    assert_eq!(form.value("new_date"), Some("2026-10-19"));
    assert_eq!(form.value("new_start_time"), Some("10:00"));
    assert_eq!(form.field_state("new_date"), Some(FieldState::Untouched));
    assert!(form.presenter().errors().is_empty());
    assert!(form.draft_guard().expect("guard").is_modified());

    // The restored date is today, which a postponement cannot use.
    assert_eq!(form.on_blur("new_date").expect("blur"), FieldState::Invalid);
}

#[test]
fn restore_without_a_draft_is_a_no_op() {
    let guard = DraftGuard::new(FieldValues::new()).with_store(Arc::new(MemoryDraftStore::new()), KEY);
    let mut form = postpone_session(guard);
    assert!(!form.restore_draft());

    let mut bare = postpone_session(DraftGuard::new(FieldValues::new()));
    assert!(!bare.restore_draft());
}

#[test]
fn unavailable_storage_degrades_to_no_draft() {
    let guard =
        DraftGuard::new(FieldValues::new()).with_store(Arc::new(MemoryDraftStore::unavailable()), KEY);
    let mut form = postpone_session(guard);

    assert!(!form.restore_draft());
    for (name, value) in filled_postpone() {
        form.on_change(name, value).expect("change");
    }
    assert!(form.submit().is_allowed());
}

#[tokio::test]
async fn edits_are_autosaved_after_the_quiet_period() {
    let config = GlobalConfig::from_toml_str("[draft]\ndebounce_ms = 50\n").expect("config");
    let store: Arc<dyn DraftStore> = Arc::new(MemoryDraftStore::new());
    let guard = DraftGuard::from_config(FieldValues::new(), &config.draft, Arc::clone(&store));
    let mut form = postpone_session(guard);

    form.on_input("reason", "V").expect("input");
    form.on_input("reason", "Venue").expect("input");
    form.on_input("new_start_time", "10:00").expect("input");

    let saved = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            if let Some(saved) = store.load(KEY).expect("load") {
                return saved;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("draft should be autosaved");

    assert_eq!(saved.get("reason").map(String::as_str), Some("Venue"));
    assert_eq!(saved.get("new_start_time").map(String::as_str), Some("10:00"));
}

#[tokio::test]
async fn disabled_autosave_never_writes() {
    let config = GlobalConfig::from_toml_str("[draft]\nenabled = false\ndebounce_ms = 20\n")
        .expect("config");
    let store: Arc<dyn DraftStore> = Arc::new(MemoryDraftStore::new());
    let guard = DraftGuard::from_config(FieldValues::new(), &config.draft, Arc::clone(&store));
    let mut form = postpone_session(guard);

    form.on_input("reason", "Venue").expect("input");
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.load(KEY).expect("load"), None);
    assert!(form.draft_guard().expect("guard").is_modified());
}

#[tokio::test]
async fn submit_cancels_a_pending_autosave() {
    let store: Arc<dyn DraftStore> = Arc::new(MemoryDraftStore::new());
    let autosave =
        DraftAutosave::new(KEY.to_owned(), Duration::from_millis(200), Arc::clone(&store)).spawn();
    let guard = DraftGuard::new(FieldValues::new())
        .with_store(Arc::clone(&store), KEY)
        .with_autosave(autosave);
    let mut form = postpone_session(guard);

    for (name, value) in filled_postpone() {
        form.on_change(name, value).expect("change");
    }
    assert!(form.submit().is_allowed());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(store.load(KEY).expect("load"), None);
}

#[tokio::test]
async fn submit_during_an_autosave_write_leaves_no_draft() {
    let slow = Arc::new(SlowStore::default());
    let store: Arc<dyn DraftStore> = slow.clone();
    let autosave =
        DraftAutosave::new(KEY.to_owned(), Duration::from_millis(20), Arc::clone(&store)).spawn();
    let guard = DraftGuard::new(FieldValues::new())
        .with_store(Arc::clone(&store), KEY)
        .with_autosave(autosave);
    let mut form = postpone_session(guard);

    for (name, value) in filled_postpone() {
        form.on_change(name, value).expect("change");
    }
    tokio::time::timeout(Duration::from_secs(3), async {
        while slow.saves_started.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("autosave write should start");

    assert!(form.submit().is_allowed());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(store.load(KEY).expect("load"), None);

    // A fresh form on the same store finds nothing to restore.
    let mut next = postpone_session(DraftGuard::new(FieldValues::new()).with_store(store, KEY));
    assert!(!next.restore_draft());
}
