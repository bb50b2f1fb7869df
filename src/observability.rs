use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: bookings created (entered `pending`).
pub const BOOKINGS_CREATED_TOTAL: &str = "hearth_bookings_created_total";

/// Counter: bookings confirmed (payment debited).
pub const BOOKINGS_CONFIRMED_TOTAL: &str = "hearth_bookings_confirmed_total";

/// Counter: bookings cancelled.
pub const BOOKINGS_CANCELLED_TOTAL: &str = "hearth_bookings_cancelled_total";

/// Counter: confirmed bookings promoted to `completed` on read.
pub const BOOKINGS_COMPLETED_TOTAL: &str = "hearth_bookings_completed_total";

/// Counter: creation attempts rejected because the dates were taken.
pub const BOOKING_CONFLICTS_TOTAL: &str = "hearth_booking_conflicts_total";

/// Counter: payment attempts rejected for insufficient balance.
pub const PAYMENT_DECLINED_TOTAL: &str = "hearth_payment_declined_total";

/// Histogram: quote computation latency in seconds.
pub const QUOTE_DURATION_SECONDS: &str = "hearth_quote_duration_seconds";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
