use subtle::ConstantTimeEq;

/// Capability check shared by the password gate and the upload-token gate:
/// does the caller-presented secret match the configured one?
///
/// Comparison is constant-time over the byte contents (differing lengths
/// short-circuit to `false`, which only leaks the length). Both gates call
/// through here so a future session-based scheme can replace the check
/// without touching the routes.
#[must_use]
pub fn secret_matches(presented: &str, configured: &str) -> bool {
    presented
        .as_bytes()
        .ct_eq(configured.as_bytes())
        .into()
}
