/// Logs an error together with the whole chain of its sources.
///
/// An optional context message may be prepended:
/// `log_full_error!(err, "Script service failed")`.
#[macro_export]
macro_rules! log_full_error {
    ($err:expr) => {
        $crate::log_full_error!($err, "Error")
    };
    ($err:expr, $context:expr) => {{
        use std::error::Error;

        let error: &dyn Error = &$err;
        let mut error_message = format!("{}: {}", $context, error);
        let mut source = error.source();
        while let Some(cause) = source {
            error_message.push_str(&format!(": {}", cause));
            source = cause.source();
        }
        bevy::prelude::error!("{}", error_message);
    }};
}
