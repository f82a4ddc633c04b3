use crate::error::{MobileError, Result};

/// Normalize an incomplete URL for opening on a device
///
/// Anything with a scheme (including app deep links like `myapp://`) is kept as-is;
/// bare hosts get `https://`, or `http://` for the emulator host loopback addresses.
pub fn normalize_url(url: &str) -> Result<String> {
    let trimmed = url.trim();

    if trimmed.is_empty() {
        return Err(MobileError::InvalidArgument("URL must not be empty".to_string()));
    }

    if has_scheme(trimmed) {
        return Ok(trimmed.to_string());
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(MobileError::InvalidArgument(format!("'{}' is not a URL", trimmed)));
    }

    // emulators reach the host machine through these
    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") || trimmed.starts_with("10.0.2.2") {
        return Ok(format!("http://{}", trimmed));
    }

    Ok(format!("https://{}", trimmed))
}

/// `scheme:` prefix per RFC 3986 (letter, then letters, digits, `+`, `-`, `.`)
fn has_scheme(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    // "localhost:8080" is a host and port, not a scheme
    let port_like = rest
        .split('/')
        .next()
        .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()));
    starts_with_letter && chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) && !port_like
}
