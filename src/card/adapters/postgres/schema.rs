//! Diesel schema for card persistence.

diesel::table! {
    /// Task cards with their escalation chain and armed deadlines.
    cards (id) {
        /// Card identifier.
        id -> Uuid,
        /// Kind of tracked business record.
        #[max_length = 50]
        subject_kind -> Varchar,
        /// Reference of the tracked business record.
        #[max_length = 255]
        subject_ref -> Varchar,
        /// Card title.
        #[max_length = 200]
        title -> Varchar,
        /// Escalation chain as a JSON array of assignee handles.
        chain -> Jsonb,
        /// Current escalation level.
        level -> Int4,
        /// Assignee holding the current level.
        #[max_length = 255]
        current_assignee -> Varchar,
        /// Card status.
        #[max_length = 50]
        status -> Varchar,
        /// Warning threshold in seconds.
        warning_after_secs -> Int8,
        /// Breach threshold in seconds.
        breach_after_secs -> Int8,
        /// Re-escalation interval in seconds.
        re_escalate_after_secs -> Int8,
        /// Warning deadline.
        warning_at -> Timestamptz,
        /// Breach deadline.
        breach_at -> Timestamptz,
        /// Pending re-escalation deadline.
        next_escalation_at -> Nullable<Timestamptz>,
        /// Next time-driven deadline; null once nothing is pending.
        due_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
        /// Completion or deletion timestamp.
        closed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only audit trail, one row per card revision.
    card_audit_log (card_id, revision) {
        /// Card identifier.
        card_id -> Uuid,
        /// Revision reached by the transition.
        revision -> Int8,
        /// Fired trigger.
        #[max_length = 50]
        trigger_name -> Varchar,
        /// Status before the transition.
        #[max_length = 50]
        from_status -> Varchar,
        /// Status after the transition.
        #[max_length = 50]
        to_status -> Varchar,
        /// Actor label.
        #[max_length = 300]
        actor -> Varchar,
        /// Full transition payload.
        payload -> Jsonb,
        /// SHA-256 of the payload.
        #[max_length = 64]
        fingerprint -> Varchar,
        /// Transition time.
        occurred_at -> Timestamptz,
    }
}

diesel::joinable!(card_audit_log -> cards (card_id));
diesel::allow_tables_to_appear_in_same_query!(cards, card_audit_log);
