use metrics::{describe_counter, Unit};

/// Register metric descriptions with whichever recorder the process
/// installs. Calls are no-ops when no recorder is present, so library users
/// without a metrics pipeline pay nothing.
pub fn describe_metrics() {
    describe_counter!(
        "positions_created_total",
        Unit::Count,
        "Positions created"
    );
    describe_counter!(
        "positions_closed_total",
        Unit::Count,
        "Positions transitioned to closed"
    );
    describe_counter!(
        "positions_stopped_total",
        Unit::Count,
        "Positions soft-deleted (stopped)"
    );
    describe_counter!(
        "positions_deleted_total",
        Unit::Count,
        "Positions permanently removed"
    );
    describe_counter!(
        "price_cache_hits_total",
        Unit::Count,
        "Quote lookups served from cache"
    );
    describe_counter!(
        "price_cache_misses_total",
        Unit::Count,
        "Quote lookups that missed the cache"
    );
    describe_counter!(
        "price_feed_requests_total",
        Unit::Count,
        "Upstream price feed calls"
    );
    describe_counter!(
        "price_mock_quotes_total",
        Unit::Count,
        "Synthesized mock quotes served"
    );
}
