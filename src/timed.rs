/// Run a closure, logging when it starts and how long it took once it is done.
#[macro_export]
macro_rules! timed {
    ($msg:expr, $($args:expr),+ => $closure:expr) => {{
        let msg = format!($msg, $($args),+);

        let start_time = std::time::Instant::now();
        info!("Start: {}", msg);

        let out = $closure();

        info!("End:   {}: {:?}", msg, start_time.elapsed());

        out
    }};
    ($msg:expr, $closure:expr) => {{
        let msg: &str = $msg;

        let start_time = std::time::Instant::now();
        info!("Start: {}", msg);

        let out = $closure();

        info!("End:   {}: {:?}", msg, start_time.elapsed());

        out
    }};
}
