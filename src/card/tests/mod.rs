//! Unit tests for the card context.


use crate::card::domain::{
    AssigneeId, Card, CardSubject, CardTitle, EscalationChain, EscalationPolicy, SubjectKind,
};
use crate::clock::ManualClock;
use chrono::{DateTime, TimeZone, Utc};

/// Start of every scenario: 2026-03-02 08:00 UTC.
pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
        .single()
        .expect("valid start timestamp")
}

/// Warning after 30 minutes, breach after 60, re-escalate every 30.
pub(super) fn policy() -> EscalationPolicy {
    EscalationPolicy::from_minutes(30, 60, 30).expect("valid policy")
}

pub(super) fn assignee(handle: &str) -> AssigneeId {
    AssigneeId::new(handle).expect("valid assignee")
}

pub(super) fn chain(handles: &[&str]) -> EscalationChain {
    EscalationChain::new(handles.iter().map(|handle| assignee(handle))).expect("valid chain")
}

/// Opens a shipment card at [`start`] with the given chain.
pub(super) fn open_card(clock: &ManualClock, handles: &[&str]) -> Card {
    Card::open(
        CardSubject::new(SubjectKind::Shipment, "SHP-1001").expect("valid subject"),
        CardTitle::new("Confirm vessel booking").expect("valid title"),
        chain(handles),
        policy(),
        clock,
    )
    .expect("card opens")
}
