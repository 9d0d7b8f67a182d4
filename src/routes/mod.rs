mod form_submit;
mod health_check;
pub use form_submit::*;
pub use health_check::*;

/// Walk the `source` chain of an error, so that logs show the cause of a 500
/// and not just the top-level message
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}
