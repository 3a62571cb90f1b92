use crate::matcher::TIMEOUT_MARKER;
use tracelat_model::PROBES_PER_HOP;
use tracing::debug;

/// Converts one timing token to milliseconds.
///
/// `"*"` and unparseable text both come back as `None`; a trailing ` !X`
/// annotation is dropped.
pub fn normalize_rtt(token: &str) -> Option<f64> {
    let token = token.trim();
    if token == TIMEOUT_MARKER {
        return None;
    }

    let value = match token.find(" !") {
        Some(idx) => &token[..idx],
        None => token,
    };
    let numeric_len = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());

    match value[..numeric_len].parse::<f64>() {
        Ok(ms) => Some(ms),
        Err(err) => {
            debug!(token, %err, "unparseable rtt token");
            None
        }
    }
}

/// Normalizes up to [`PROBES_PER_HOP`] tokens, padding missing slots with `None`.
pub fn normalize_probes<S: AsRef<str>>(tokens: &[S]) -> [Option<f64>; PROBES_PER_HOP] {
    let mut rtt = [None; PROBES_PER_HOP];
    for (slot, token) in rtt.iter_mut().zip(tokens) {
        *slot = normalize_rtt(token.as_ref());
    }
    rtt
}
