//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- HTTP ---
    pub api_requests: AtomicU64,
    pub server_errors: AtomicU64,

    // --- Pages ---
    pub page_renders: AtomicU64,
    pub page_not_found: AtomicU64,
    pub content_errors: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub content_duration_us_sum: AtomicU64,
    pub content_duration_us_max: AtomicU64,

    // --- Mint ---
    pub mint_attempts: AtomicU64,
    pub mint_success: AtomicU64,
    pub mint_errors: AtomicU64,
    pub mint_conflicts: AtomicU64,

    // --- RPC ---
    pub rpc_failovers: AtomicU64,
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            api_requests: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
            page_renders: AtomicU64::new(0),
            page_not_found: AtomicU64::new(0),
            content_errors: AtomicU64::new(0),
            content_duration_us_sum: AtomicU64::new(0),
            content_duration_us_max: AtomicU64::new(0),
            mint_attempts: AtomicU64::new(0),
            mint_success: AtomicU64::new(0),
            mint_errors: AtomicU64::new(0),
            mint_conflicts: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    pub fn record_content_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.content_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.content_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.content_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, wallet_connected: bool, mints_in_flight: usize) -> String {
        let api_requests = self.api_requests.load(Ordering::Relaxed);
        let server_errors = self.server_errors.load(Ordering::Relaxed);
        let page_renders = self.page_renders.load(Ordering::Relaxed);
        let page_not_found = self.page_not_found.load(Ordering::Relaxed);
        let content_errors = self.content_errors.load(Ordering::Relaxed);
        let content_dur_sum = self.content_duration_us_sum.load(Ordering::Relaxed);
        let content_dur_max = self.content_duration_us_max.swap(0, Ordering::Relaxed);
        let mint_attempts = self.mint_attempts.load(Ordering::Relaxed);
        let mint_success = self.mint_success.load(Ordering::Relaxed);
        let mint_errors = self.mint_errors.load(Ordering::Relaxed);
        let mint_conflicts = self.mint_conflicts.load(Ordering::Relaxed);
        let rpc_failovers = self.rpc_failovers.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);
        let wallet_connected = u8::from(wallet_connected);

        // Convert μs to seconds for Prometheus conventions
        let content_dur_sum_s = content_dur_sum as f64 / 1_000_000.0;
        let content_dur_max_s = content_dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP storefront_api_requests_total Requests to the JSON API.\n\
# TYPE storefront_api_requests_total counter\n\
storefront_api_requests_total {api_requests}\n\
# HELP storefront_http_server_errors_total Responses with a 5xx status.\n\
# TYPE storefront_http_server_errors_total counter\n\
storefront_http_server_errors_total {server_errors}\n\
# HELP storefront_page_renders_total Pages rendered.\n\
# TYPE storefront_page_renders_total counter\n\
storefront_page_renders_total {page_renders}\n\
# HELP storefront_page_not_found_total Detail pages for unknown slugs.\n\
# TYPE storefront_page_not_found_total counter\n\
storefront_page_not_found_total {page_not_found}\n\
# HELP storefront_content_errors_total Content store query failures.\n\
# TYPE storefront_content_errors_total counter\n\
storefront_content_errors_total {content_errors}\n\
# HELP storefront_content_duration_seconds_sum Total content query time (seconds).\n\
# TYPE storefront_content_duration_seconds_sum counter\n\
storefront_content_duration_seconds_sum {content_dur_sum_s:.6}\n\
# HELP storefront_content_duration_seconds_max Max content query time since last scrape (seconds).\n\
# TYPE storefront_content_duration_seconds_max gauge\n\
storefront_content_duration_seconds_max {content_dur_max_s:.6}\n\
# HELP storefront_mint_attempts_total Claim transactions sent.\n\
# TYPE storefront_mint_attempts_total counter\n\
storefront_mint_attempts_total {mint_attempts}\n\
# HELP storefront_mint_success_total Claim transactions accepted by the wallet.\n\
# TYPE storefront_mint_success_total counter\n\
storefront_mint_success_total {mint_success}\n\
# HELP storefront_mint_errors_total Claim transactions that failed.\n\
# TYPE storefront_mint_errors_total counter\n\
storefront_mint_errors_total {mint_errors}\n\
# HELP storefront_mint_conflicts_total Mints rejected while another was in flight.\n\
# TYPE storefront_mint_conflicts_total counter\n\
storefront_mint_conflicts_total {mint_conflicts}\n\
# HELP storefront_rpc_failovers_total RPC primary-to-fallback failovers.\n\
# TYPE storefront_rpc_failovers_total counter\n\
storefront_rpc_failovers_total {rpc_failovers}\n\
# HELP storefront_rpc_errors_total RPC transport errors.\n\
# TYPE storefront_rpc_errors_total counter\n\
storefront_rpc_errors_total {rpc_errors}\n\
# HELP storefront_wallet_connected Whether a wallet session is active.\n\
# TYPE storefront_wallet_connected gauge\n\
storefront_wallet_connected {wallet_connected}\n\
# HELP storefront_mints_in_flight Mints currently awaiting the wallet.\n\
# TYPE storefront_mints_in_flight gauge\n\
storefront_mints_in_flight {mints_in_flight}\n"
        )
    }
}
