//! Syntactic check for notification addresses.
//!
//! Decides whether an address is worth handing to a mail transport, not
//! whether it can receive mail.

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Return `true` if `address` looks like `local@domain.tld`.
///
/// Rules:
/// - exactly one `@`, non-empty local part of at most 64 bytes
/// - no whitespace or control characters anywhere
/// - domain made of dot-separated labels of `[A-Za-z0-9-]`, at least two
///   labels, no label empty or starting/ending with `-`
/// - local part may not start or end with `.` nor contain `..`
///
/// # Example
/// ```
/// use form_throttle::domain::address::is_plausible_email_address;
///
/// assert!(is_plausible_email_address("webmaster@example.org"));
/// assert!(!is_plausible_email_address("not an address"));
/// ```
pub fn is_plausible_email_address(address: &str) -> bool {
    if address.is_empty() || address.len() > MAX_ADDRESS_LEN {
        return false;
    }
    if address
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return false;
    }

    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    valid_local_part(local) && valid_domain(domain)
}

fn valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c))
}

fn valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
