//! progress helpers for long running scans and verifications
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::style::ProgressStyle;

/// Style the given span as a spinner for a single step of a larger task
pub fn set_sub_task(span: &Span, msg: &str) {
    span.pb_set_style(
        &ProgressStyle::with_template("  {span_child_prefix} {spinner:.blue} {wide_msg}")
            .unwrap_or(ProgressStyle::default_spinner()),
    );
    span.pb_set_message(msg);
}

/// Style the given span as a progress bar of `len` steps
pub fn set_bar(span: &Span, msg: &str, len: u64) {
    let style = ProgressStyle::with_template(
        "{elapsed} ░ {prefix} ░ {bar:30.green/black} {pos}/{len} ░ {msg}",
    )
    .unwrap_or(ProgressStyle::default_bar())
    .progress_chars("█▒ ");
    span.pb_set_style(&style);
    span.pb_set_message(msg);
    span.pb_set_length(len);
}

/// Advance the progress bar of the given span by one step
pub fn tick(span: &Span) {
    span.pb_inc(1);
}
