//! ---
//! bizdesk_section: "03-persistence-logging"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Structured logging adapters and sinks."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
/// Emit an informational log enriched with BizDesk context.
#[macro_export]
macro_rules! bizdesk_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::INFO,
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a debug log enriched with BizDesk context.
#[macro_export]
macro_rules! bizdesk_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::DEBUG,
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an error log enriched with BizDesk context.
#[macro_export]
macro_rules! bizdesk_error {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::ERROR,
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::ERROR,
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}
