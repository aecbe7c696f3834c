use sandgraph_domain::Authorizations;

/// Capability token for reading the audit log without visibility
/// filtering.
///
/// The audit trail must stay internally consistent regardless of who can
/// currently read its subjects, so visibility propagation scans every
/// record of a subject. The token is constructed explicitly at wiring time
/// and handed to the propagator; it is never derived from a user's
/// authorizations.
#[derive(Debug, Clone)]
pub struct SystemAuditContext {
    _private: (),
}

impl SystemAuditContext {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for SystemAuditContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Read context for audit scans: a user's authorizations (records filtered
/// by visibility) or the system token (no filtering).
#[derive(Debug, Clone)]
pub enum AuditReadContext {
    System(SystemAuditContext),
    User(Authorizations),
}

impl AuditReadContext {
    pub fn system(context: &SystemAuditContext) -> Self {
        Self::System(context.clone())
    }

    pub fn user(authorizations: Authorizations) -> Self {
        Self::User(authorizations)
    }
}
