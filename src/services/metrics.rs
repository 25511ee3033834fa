use once_cell::sync::OnceCell;
use prometheus::{
    IntCounter, IntCounterVec, register_int_counter, register_int_counter_vec,
};

pub static QR_GENERATED: OnceCell<IntCounterVec> = OnceCell::new();
pub static ENCODE_FAILURES: OnceCell<IntCounter> = OnceCell::new();
pub static RATE_LIMIT_EXCEEDED: OnceCell<IntCounter> = OnceCell::new();

pub fn init_metrics() {
    QR_GENERATED
        .set(
            register_int_counter_vec!(
                "qr_generated_total",
                "Number of QR codes generated",
                &["format"]
            )
            .unwrap(),
        )
        .unwrap();
    ENCODE_FAILURES
        .set(
            register_int_counter!(
                "qr_encode_failures_total",
                "Number of QR encoding failures"
            )
            .unwrap(),
        )
        .unwrap();
    RATE_LIMIT_EXCEEDED
        .set(
            register_int_counter!(
                "rate_limit_exceeded_total",
                "Total number of requests exceeding rate limit"
            )
            .unwrap(),
        )
        .unwrap();
}

pub fn record_generated(format: &'static str) {
    if let Some(generated) = QR_GENERATED.get() {
        generated.with_label_values(&[format]).inc();
    }
}

pub fn record_encode_failure() {
    if let Some(failures) = ENCODE_FAILURES.get() {
        failures.inc();
    }
}

pub fn record_rate_limit_exceeded() {
    if let Some(exceeded) = RATE_LIMIT_EXCEEDED.get() {
        exceeded.inc();
    }
}
