//! Diesel schema for shipment persistence.

diesel::table! {
    /// Booked shipments and their edit lock.
    shipments (id) {
        /// Shipment identifier.
        id -> Uuid,
        /// Unique human-facing reference.
        #[max_length = 40]
        reference -> Varchar,
        /// Transport mode.
        #[max_length = 20]
        mode -> Varchar,
        /// Estimated time of departure.
        etd -> Timestamptz,
        /// Shipment status.
        #[max_length = 20]
        status -> Varchar,
        /// Time the shipment locks.
        lock_at -> Timestamptz,
        /// Time the shipment was locked.
        locked_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}
