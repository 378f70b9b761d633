/// Returns early with [`Error::OutOfInterval`](crate::error::Error::OutOfInterval)
/// if a numerical value is not in the provided interval `[a,b]`
///
/// ### Example
/// ```ignore
/// let alpha = 2.0;
/// ensure_interval!(alpha, 0.0, 1.0);
/// ```
/// This returns an error reading "invalid value for \`alpha\`: 2, must be in the interval \[0, 1\]".
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::error::Error::OutOfInterval {
                name: stringify!($var),
                value: $var,
                min: $a,
                max: $b,
            });
        }
    };
}
