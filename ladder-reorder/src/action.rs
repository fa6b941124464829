//! Move action service
//!
//! Binds inbound request parameters to a record lookup, a permission check,
//! and a move, then shapes the result for the caller. The service never
//! touches a transport: parameters arrive as maps, and the outcome is data
//! the caller renders (a payload, a redirect target, or hook output).

use crate::engine::ReorderEngine;
use ladder_core::{Direction, LadderResult, RecordId, ReorderError, SortRecord};
use ladder_storage::{BoundsCache, RecordStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// POLICIES
// ============================================================================

/// Permission decision for a move: a fixed answer, or one computed per
/// record by an injected predicate. The service only invokes the decision;
/// it never implements one.
pub enum AccessPolicy {
    /// The same answer for every record
    Fixed(bool),
    /// An answer computed from the record
    Computed(Arc<dyn Fn(&SortRecord) -> bool + Send + Sync>),
}

impl AccessPolicy {
    /// Permit every move.
    pub fn allow_all() -> Self {
        AccessPolicy::Fixed(true)
    }

    /// Deny every move.
    pub fn deny_all() -> Self {
        AccessPolicy::Fixed(false)
    }

    /// Decide per record.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&SortRecord) -> bool + Send + Sync + 'static,
    {
        AccessPolicy::Computed(Arc::new(f))
    }

    /// Whether the actor may move this record.
    pub fn allows(&self, record: &SortRecord) -> bool {
        match self {
            AccessPolicy::Fixed(allowed) => *allowed,
            AccessPolicy::Computed(f) => f(record),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl Clone for AccessPolicy {
    fn clone(&self) -> Self {
        match self {
            AccessPolicy::Fixed(allowed) => AccessPolicy::Fixed(*allowed),
            AccessPolicy::Computed(f) => AccessPolicy::Computed(Arc::clone(f)),
        }
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPolicy::Fixed(allowed) => f.debug_tuple("Fixed").field(allowed).finish(),
            AccessPolicy::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Where a navigational caller should go after a handled move: a route
/// name plus request parameters. Data only, no URL rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub route: String,
    pub params: Vec<(String, String)>,
}

impl RedirectTarget {
    /// Target for a route with no parameters.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            params: Vec::new(),
        }
    }

    /// Append a request parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

/// Redirect selection: a fixed target, or one computed per record.
pub enum RedirectPolicy {
    /// The same target for every move
    Fixed(RedirectTarget),
    /// A target computed from the moved record
    Computed(Arc<dyn Fn(&SortRecord) -> RedirectTarget + Send + Sync>),
}

impl RedirectPolicy {
    /// Redirect to a fixed target.
    pub fn fixed(target: RedirectTarget) -> Self {
        RedirectPolicy::Fixed(target)
    }

    /// Compute the target per record.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&SortRecord) -> RedirectTarget + Send + Sync + 'static,
    {
        RedirectPolicy::Computed(Arc::new(f))
    }

    fn resolve(&self, record: &SortRecord) -> RedirectTarget {
        match self {
            RedirectPolicy::Fixed(target) => target.clone(),
            RedirectPolicy::Computed(f) => f(record),
        }
    }
}

impl Clone for RedirectPolicy {
    fn clone(&self) -> Self {
        match self {
            RedirectPolicy::Fixed(target) => RedirectPolicy::Fixed(target.clone()),
            RedirectPolicy::Computed(f) => RedirectPolicy::Computed(Arc::clone(f)),
        }
    }
}

impl fmt::Debug for RedirectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectPolicy::Fixed(target) => f.debug_tuple("Fixed").field(target).finish(),
            RedirectPolicy::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Custom response hook invoked after the move with the refreshed record
/// and whether a swap happened. Its output becomes the outcome verbatim.
pub type AfterChange = Arc<dyn Fn(&SortRecord, bool) -> Value + Send + Sync>;

// ============================================================================
// REQUEST AND OUTCOME
// ============================================================================

/// Inbound move parameters, already extracted from the transport.
///
/// Body parameters take priority over query parameters when both carry the
/// same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub body: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// Caller wants a structured payload rather than a redirect
    pub wants_json: bool,
}

impl MoveRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a body parameter.
    pub fn with_body_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    /// Set a query parameter.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Ask for a structured payload outcome.
    pub fn with_json_response(mut self) -> Self {
        self.wants_json = true;
        self
    }

    /// Resolve a parameter by name, body first.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.body
            .get(name)
            .or_else(|| self.query.get(name))
            .map(String::as_str)
    }
}

/// Structured success payload for JSON-style callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReceipt {
    pub status: String,
    /// Whether a swap happened; `false` means the record was already at
    /// the partition extreme
    pub moved: bool,
}

impl MoveReceipt {
    /// Receipt for a handled request.
    pub fn success(moved: bool) -> Self {
        Self {
            status: "success".to_string(),
            moved,
        }
    }
}

/// What the caller should do after a handled move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Return a structured payload
    Payload(MoveReceipt),
    /// Navigate to a target
    Redirect(RedirectTarget),
    /// Return the after-change hook's output
    Custom(Value),
}

// ============================================================================
// MOVE ACTION
// ============================================================================

/// End-to-end handler for a move request.
///
/// Resolution order matches the error taxonomy: missing or malformed id
/// parameter, record lookup, permission, direction, then the move itself.
pub struct MoveAction<S: RecordStore> {
    engine: ReorderEngine<S>,
    access: AccessPolicy,
    redirect: Option<RedirectPolicy>,
    after_change: Option<AfterChange>,
}

impl<S: RecordStore + fmt::Debug> fmt::Debug for MoveAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveAction")
            .field("engine", &self.engine)
            .field("access", &self.access)
            .field("redirect", &self.redirect)
            .field("after_change", &self.after_change.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<S: RecordStore> MoveAction<S> {
    /// Create an action over an engine. Every move is permitted and a
    /// default view redirect is produced until policies say otherwise.
    pub fn new(engine: ReorderEngine<S>) -> Self {
        Self {
            engine,
            access: AccessPolicy::default(),
            redirect: None,
            after_change: None,
        }
    }

    /// Set the permission policy.
    pub fn with_access_policy(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }

    /// Set the redirect policy. Without one, the outcome targets the
    /// `view` route carrying the record id.
    pub fn with_redirect_policy(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Set the after-change hook.
    pub fn with_after_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&SortRecord, bool) -> Value + Send + Sync + 'static,
    {
        self.after_change = Some(Arc::new(f));
        self
    }

    /// The underlying engine.
    pub fn engine(&self) -> &ReorderEngine<S> {
        &self.engine
    }

    /// Handle a move request end to end.
    pub fn handle(&self, cache: &BoundsCache, request: &MoveRequest) -> LadderResult<MoveOutcome> {
        let config = self.engine.config();

        let id = self.resolve_id(request)?;
        let record = self
            .engine
            .store()
            .record_get(id)?
            .ok_or(ReorderError::RecordNotFound { id })?;

        if !self.access.allows(&record) {
            tracing::warn!(record_id = %id, "Move denied by access policy");
            return Err(ReorderError::PermissionDenied { id }.into());
        }

        let raw_direction = request.param(&config.direction_param).ok_or_else(|| {
            ReorderError::MissingParameter {
                name: config.direction_param.clone(),
            }
        })?;
        let direction = Direction::from_db_str(raw_direction).map_err(ReorderError::from)?;

        let moved = self.engine.move_record(cache, &record, direction)?;
        tracing::debug!(record_id = %id, %direction, moved, "Handled move request");

        // The pre-move copy is stale after a swap; hooks and redirects see
        // the refreshed record.
        let current = self.engine.store().record_get(id)?.unwrap_or(record);

        if let Some(hook) = &self.after_change {
            return Ok(MoveOutcome::Custom(hook(&current, moved)));
        }

        if request.wants_json {
            return Ok(MoveOutcome::Payload(MoveReceipt::success(moved)));
        }

        let target = match &self.redirect {
            Some(policy) => policy.resolve(&current),
            None => RedirectTarget::new("view").with_param(config.id_param.clone(), id.to_string()),
        };
        Ok(MoveOutcome::Redirect(target))
    }

    fn resolve_id(&self, request: &MoveRequest) -> LadderResult<RecordId> {
        let name = &self.engine.config().id_param;
        let raw = request
            .param(name)
            .ok_or_else(|| ReorderError::MissingParameter { name: name.clone() })?;
        RecordId::parse_str(raw)
            .map_err(|_| {
                ReorderError::MalformedParameter {
                    name: name.clone(),
                    value: raw.to_string(),
                }
                .into()
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================
