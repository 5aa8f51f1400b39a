//! Static action table.
//!
//! # Design Decisions
//! - Defined at compile time, immutable at runtime (shared without locks)
//! - Keyed by (method, action name); every POST is a booking creation
//! - No entry = unknown action, handled by the router's passthrough policy

/// Inbound method an action is reachable through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMethod {
    Get,
    Post,
}

/// How the inbound request is turned into the outbound one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Forward every query pair verbatim as an upstream GET.
    ForwardQuery,
    /// Send only `action=<upstream_action>` plus the required fields.
    DerivedQuery,
    /// POST the inbound body unchanged with `action=<upstream_action>` in the query.
    ForwardJsonBody,
}

/// How the upstream outcome becomes the outward response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    JsonPassthrough,
    RenderedFragment,
    DerivedSummary,
}

/// One routable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    pub method: ActionMethod,
    pub name: &'static str,
    /// Checked in order; the first missing one is reported for GET actions.
    pub required_fields: &'static [&'static str],
    /// Action name sent upstream when it differs from `name`.
    pub upstream_action: Option<&'static str>,
    pub body_mode: BodyMode,
    pub response_mode: ResponseMode,
}

impl ActionSpec {
    /// Action name the upstream sees.
    pub fn upstream_name(&self) -> &'static str {
        self.upstream_action.unwrap_or(self.name)
    }
}

pub const BOOKING_FIELDS: &[&str] = &[
    "name", "email", "phone", "service", "barber", "dateStr", "timeStr",
];

pub static ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        method: ActionMethod::Get,
        name: "cancel",
        required_fields: &["bookingId"],
        upstream_action: None,
        body_mode: BodyMode::ForwardQuery,
        response_mode: ResponseMode::RenderedFragment,
    },
    ActionSpec {
        method: ActionMethod::Get,
        name: "getServices",
        required_fields: &["barber"],
        upstream_action: None,
        body_mode: BodyMode::ForwardQuery,
        response_mode: ResponseMode::JsonPassthrough,
    },
    ActionSpec {
        method: ActionMethod::Get,
        name: "slots",
        required_fields: &["barber", "date"],
        upstream_action: None,
        body_mode: BodyMode::ForwardQuery,
        response_mode: ResponseMode::JsonPassthrough,
    },
    ActionSpec {
        method: ActionMethod::Get,
        name: "getAvailableSlots",
        required_fields: &["barber", "date"],
        upstream_action: None,
        body_mode: BodyMode::ForwardQuery,
        response_mode: ResponseMode::JsonPassthrough,
    },
    ActionSpec {
        method: ActionMethod::Get,
        name: "slotsSummary",
        required_fields: &["barber"],
        upstream_action: Some("allSlots"),
        body_mode: BodyMode::DerivedQuery,
        response_mode: ResponseMode::DerivedSummary,
    },
    ActionSpec {
        method: ActionMethod::Post,
        name: "create",
        required_fields: BOOKING_FIELDS,
        upstream_action: None,
        body_mode: BodyMode::ForwardJsonBody,
        response_mode: ResponseMode::JsonPassthrough,
    },
];

/// Find the action for a GET request. Names are case-sensitive.
pub fn lookup_get(action: Option<&str>) -> Option<&'static ActionSpec> {
    let action = action?;
    ACTIONS
        .iter()
        .find(|spec| spec.method == ActionMethod::Get && spec.name == action)
}

/// The booking creation action every POST maps to.
pub fn create_action() -> &'static ActionSpec {
    ACTIONS
        .iter()
        .find(|spec| spec.method == ActionMethod::Post)
        .unwrap_or(&ACTIONS[ACTIONS.len() - 1])
}
