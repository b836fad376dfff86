use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Routes worker logs to the test output. Safe to call from every test.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .with_thread_names(true)
            .with_ansi(false)
            .try_init();
    });
}

/// A generator yielding `values` in order, then repeating the last one.
pub fn sequence(values: Vec<i32>) -> impl FnMut() -> i32 + Send + 'static {
    let mut iter = values.into_iter();
    let mut last = 0;
    move || {
        if let Some(value) = iter.next() {
            last = value;
        }
        last
    }
}
