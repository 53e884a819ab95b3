use crate::types::Position;

/// Horizontal bounds (percent of the floor plan) an avatar may be dragged within.
pub const X_BOUNDS: (f64, f64) = (5.0, 95.0);
/// Vertical bounds (percent of the floor plan) an avatar may be dragged within.
pub const Y_BOUNDS: (f64, f64) = (10.0, 90.0);

/// Expands a leading `~` in a path to the user's home directory.
/// Also normalizes path separators for the current OS.
pub fn expand_tilde(path: &str) -> String {
    let result = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home
                .join(rest.trim_start_matches('/'))
                .to_string_lossy()
                .to_string(),
            None => path.to_string(),
        },
        _ => path.to_string(),
    };
    if cfg!(windows) {
        result.replace('/', "\\")
    } else {
        result
    }
}

/// Keep a dragged avatar inside the floor plan.
pub fn clamp_position(x: f64, y: f64) -> Position {
    // NaN would otherwise survive `clamp`
    let x = if x.is_nan() { X_BOUNDS.0 } else { x };
    let y = if y.is_nan() { Y_BOUNDS.0 } else { y };
    Position::new(
        x.clamp(X_BOUNDS.0, X_BOUNDS.1),
        y.clamp(Y_BOUNDS.0, Y_BOUNDS.1),
    )
}

/// Request id sent as `X-Request-Id` so client and server logs can be matched.
pub fn generate_request_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("req_{millis}_{}", &suffix[..9])
}
