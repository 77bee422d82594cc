//! ---
//! bizdesk_section: "03-persistence-logging"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Structured logging adapters and sinks."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
#![warn(missing_docs)]

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for development.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Business (tenant) identifier associated with the log event.
    pub business: Option<&'a str>,
    /// Acting user identifier associated with the log event.
    pub actor: Option<&'a str>,
    /// Role the actor held when the event was emitted.
    pub role: Option<&'a str>,
    /// Request sequence number, when the event belongs to one.
    pub request: Option<u64>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a business identifier.
    pub fn with_business(mut self, business: &'a str) -> Self {
        self.business = Some(business);
        self
    }

    /// Attach an acting user identifier.
    pub fn with_actor(mut self, actor: &'a str) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Attach the actor's role name.
    pub fn with_role(mut self, role: &'a str) -> Self {
        self.role = Some(role);
        self
    }

    /// Attach a request sequence number.
    pub fn with_request(mut self, request: u64) -> Self {
        self.request = Some(request);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation failed or was aborted.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Fault => "fault",
        }
    }

    fn level(&self) -> Level {
        match self {
            SystemEventOutcome::Success => Level::INFO,
            SystemEventOutcome::Fault => Level::ERROR,
        }
    }
}

/// Emit a standardized system event with a success/fault outcome.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let default_ctx = LogContext::default();
    let ctx = context.unwrap_or(&default_ctx);
    match outcome.level() {
        Level::ERROR => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %message
        ),
        _ => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            business = ctx.business.unwrap_or(""),
            actor = ctx.actor.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new()
            .with_business("acme-plumbing")
            .with_actor("user-1");
        bizdesk_info!(context = ctx.clone(), "profile attached");
        bizdesk_debug!("debug message");
        bizdesk_error!(context = ctx, "error code: {}", 42);
    }

    #[test]
    fn init_does_not_panic() {
        init();
    }

    #[test]
    fn system_event_helper_emits() {
        init();
        let ctx = LogContext::new().with_business("acme-plumbing");
        log_system_event(
            Some(&ctx),
            "test.event",
            "system event helper executed",
            SystemEventOutcome::Success,
        );
        log_system_event(
            None,
            "test.event",
            "system event helper fault",
            SystemEventOutcome::Fault,
        );
    }
}
