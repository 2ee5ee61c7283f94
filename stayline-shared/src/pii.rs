use std::fmt;

/// Wrapper around an email address that masks the local part in Debug and
/// Display output. Prevents accidental leakage through log macros like
/// `tracing::info!("{}", ...)` while keeping the raw value reachable.
#[derive(Clone)]
pub struct MaskedEmail<'a>(pub &'a str);

impl fmt::Display for MaskedEmail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let head = local.chars().next().unwrap_or('*');
                write!(f, "{}***@{}", head, domain)
            }
            None => write!(f, "********"),
        }
    }
}

impl fmt::Debug for MaskedEmail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
