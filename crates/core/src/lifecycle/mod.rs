use serde::{Deserialize, Serialize};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::actor::{Actor, Role};
use crate::domain::ticket::{Ticket, TicketStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignLabel {
    Assign,
    Reassign,
    AssignToMe,
}

impl AssignLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Reassign => "reassign",
            Self::AssignToMe => "assign_to_me",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketActions {
    pub can_resolve: bool,
    pub can_close: bool,
    pub can_reopen: bool,
    pub can_assign: bool,
    pub assign_label: AssignLabel,
}

/// Admins may always resolve; agents only when the ticket is assigned to them.
pub fn can_resolve(ticket: &Ticket, actor: &Actor) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Agent => ticket.assigned_to.as_ref() == Some(&actor.id),
        Role::User => false,
    }
}

/// Closing requires a resolved ticket with a recorded resolution text and
/// timestamp, plus resolve-grade authority. All four conditions are mandatory.
pub fn can_close(ticket: &Ticket, actor: &Actor) -> bool {
    ticket.status == TicketStatus::Resolved
        && has_recorded_resolution(ticket)
        && ticket.resolved_at.is_some()
        && can_resolve(ticket, actor)
}

/// Only the ticket owner or an admin may reopen, and only once the ticket is
/// settled. Assignment grants no reopen authority.
pub fn can_reopen(ticket: &Ticket, actor: &Actor) -> bool {
    ticket.status.is_settled() && (actor.role == Role::Admin || ticket.owner_id == actor.id)
}

pub fn can_assign(ticket: &Ticket, actor: &Actor) -> bool {
    matches!(actor.role, Role::Admin | Role::Agent) && !ticket.status.is_settled()
}

/// Display hint only; callers gate the action on `can_assign`.
pub fn assign_label(ticket: &Ticket, actor: &Actor) -> AssignLabel {
    if actor.role == Role::Admin {
        AssignLabel::Assign
    } else if ticket.assigned_to.as_ref() == Some(&actor.id) {
        AssignLabel::Reassign
    } else {
        AssignLabel::AssignToMe
    }
}

pub fn evaluate_actions(ticket: &Ticket, actor: &Actor) -> TicketActions {
    TicketActions {
        can_resolve: can_resolve(ticket, actor),
        can_close: can_close(ticket, actor),
        can_reopen: can_reopen(ticket, actor),
        can_assign: can_assign(ticket, actor),
        assign_label: assign_label(ticket, actor),
    }
}

pub fn evaluate_actions_with_audit<S>(
    ticket: &Ticket,
    actor: &Actor,
    sink: &S,
    audit: &AuditContext,
) -> TicketActions
where
    S: AuditSink,
{
    let actions = evaluate_actions(ticket, actor);
    sink.emit(
        AuditEvent::new(
            Some(ticket.id.clone()),
            audit.correlation_id.clone(),
            "lifecycle.actions_evaluated",
            AuditCategory::Lifecycle,
            audit.actor.clone(),
            AuditOutcome::Success,
        )
        .with_metadata("actor_role", actor.role.as_str())
        .with_metadata("status", ticket.status.as_str())
        .with_metadata("can_resolve", actions.can_resolve.to_string())
        .with_metadata("can_close", actions.can_close.to_string())
        .with_metadata("can_reopen", actions.can_reopen.to_string())
        .with_metadata("can_assign", actions.can_assign.to_string())
        .with_metadata("assign_label", actions.assign_label.as_str()),
    );
    actions
}

fn has_recorded_resolution(ticket: &Ticket) -> bool {
    ticket.resolution.as_deref().is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::domain::actor::{Actor, ActorId, Role};
    use crate::domain::ticket::{Priority, Ticket, TicketId, TicketStatus};

    use super::{
        assign_label, can_assign, can_close, can_reopen, can_resolve, evaluate_actions,
        evaluate_actions_with_audit, AssignLabel, TicketActions,
    };

    fn ticket(status: TicketStatus) -> Ticket {
        let settled = status.is_settled();
        Ticket {
            id: TicketId("T-10".to_string()),
            subject: "cannot log in".to_string(),
            status,
            priority: Priority::High,
            owner_id: ActorId("u-owner".to_string()),
            assigned_to: Some(ActorId("u-agent".to_string())),
            created_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            resolution: settled.then(|| "reset the account".to_string()),
            resolved_at: settled.then(|| Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap()),
        }
    }

    fn admin() -> Actor {
        Actor::new("u-admin", Role::Admin)
    }

    fn assigned_agent() -> Actor {
        Actor::new("u-agent", Role::Agent)
    }

    fn other_agent() -> Actor {
        Actor::new("u-other-agent", Role::Agent)
    }

    fn owner_user() -> Actor {
        Actor::new("u-owner", Role::User)
    }

    fn other_user() -> Actor {
        Actor::new("u-someone", Role::User)
    }

    #[test]
    fn users_can_never_resolve() {
        for status in
            [TicketStatus::Open, TicketStatus::InProgress, TicketStatus::Resolved, TicketStatus::Closed]
        {
            assert!(!can_resolve(&ticket(status), &owner_user()));
            assert!(!can_resolve(&ticket(status), &other_user()));
        }
    }

    #[test]
    fn admins_can_resolve_regardless_of_assignment() {
        let mut snapshot = ticket(TicketStatus::InProgress);
        snapshot.assigned_to = None;

        assert!(can_resolve(&snapshot, &admin()));
    }

    #[test]
    fn only_the_assigned_agent_can_resolve() {
        let snapshot = ticket(TicketStatus::InProgress);

        assert!(can_resolve(&snapshot, &assigned_agent()));
        assert!(!can_resolve(&snapshot, &other_agent()));
    }

    #[test]
    fn unassigned_tickets_grant_no_agent_resolve_authority() {
        let mut snapshot = ticket(TicketStatus::Open);
        snapshot.assigned_to = None;

        assert!(!can_resolve(&snapshot, &assigned_agent()));
    }

    #[test]
    fn close_is_permitted_when_all_preconditions_hold() {
        let snapshot = ticket(TicketStatus::Resolved);

        assert!(can_close(&snapshot, &assigned_agent()));
        assert!(can_close(&snapshot, &admin()));
        assert!(!can_close(&snapshot, &owner_user()));
    }

    #[test]
    fn empty_resolution_blocks_close_regardless_of_role() {
        for resolution in [None, Some(String::new()), Some("   ".to_string())] {
            let mut snapshot = ticket(TicketStatus::Resolved);
            snapshot.resolution = resolution;

            assert!(!can_close(&snapshot, &assigned_agent()));
            assert!(!can_close(&snapshot, &admin()));
        }
    }

    #[test]
    fn missing_resolved_at_blocks_close_regardless_of_role() {
        let mut snapshot = ticket(TicketStatus::Resolved);
        snapshot.resolved_at = None;

        assert!(!can_close(&snapshot, &assigned_agent()));
        assert!(!can_close(&snapshot, &admin()));
    }

    #[test]
    fn close_requires_resolved_status() {
        let mut snapshot = ticket(TicketStatus::InProgress);
        snapshot.resolution = Some("restarted the service".to_string());
        snapshot.resolved_at = Some(snapshot.created_at);

        assert!(!can_close(&snapshot, &admin()));
        assert!(!can_close(&ticket(TicketStatus::Closed), &admin()));
    }

    #[test]
    fn admins_can_reopen_any_settled_ticket() {
        assert!(can_reopen(&ticket(TicketStatus::Resolved), &admin()));
        assert!(can_reopen(&ticket(TicketStatus::Closed), &admin()));
    }

    #[test]
    fn owner_can_reopen_a_closed_ticket_but_strangers_cannot() {
        let snapshot = ticket(TicketStatus::Closed);

        assert!(can_reopen(&snapshot, &owner_user()));
        assert!(!can_reopen(&snapshot, &other_user()));
    }

    #[test]
    fn assignment_grants_no_reopen_authority() {
        assert!(!can_reopen(&ticket(TicketStatus::Resolved), &assigned_agent()));
    }

    #[test]
    fn open_tickets_cannot_be_reopened() {
        assert!(!can_reopen(&ticket(TicketStatus::Open), &admin()));
        assert!(!can_reopen(&ticket(TicketStatus::InProgress), &owner_user()));
    }

    #[test]
    fn staff_can_assign_only_while_the_ticket_is_active() {
        for status in [TicketStatus::Open, TicketStatus::InProgress] {
            assert!(can_assign(&ticket(status), &admin()));
            assert!(can_assign(&ticket(status), &other_agent()));
            assert!(!can_assign(&ticket(status), &owner_user()));
        }
        for status in [TicketStatus::Resolved, TicketStatus::Closed] {
            assert!(!can_assign(&ticket(status), &admin()));
            assert!(!can_assign(&ticket(status), &assigned_agent()));
        }
    }

    #[test]
    fn assign_label_reflects_the_acting_identity() {
        let snapshot = ticket(TicketStatus::Open);

        assert_eq!(assign_label(&snapshot, &admin()), AssignLabel::Assign);
        assert_eq!(assign_label(&snapshot, &assigned_agent()), AssignLabel::Reassign);
        assert_eq!(assign_label(&snapshot, &other_agent()), AssignLabel::AssignToMe);
        assert_eq!(assign_label(&snapshot, &other_user()), AssignLabel::AssignToMe);
    }

    #[test]
    fn evaluate_actions_bundles_every_predicate() {
        let actions = evaluate_actions(&ticket(TicketStatus::Resolved), &assigned_agent());

        assert_eq!(
            actions,
            TicketActions {
                can_resolve: true,
                can_close: true,
                can_reopen: false,
                can_assign: false,
                assign_label: AssignLabel::Reassign,
            }
        );
    }

    #[test]
    fn evaluate_actions_emits_one_audit_event_per_decision() {
        let sink = InMemoryAuditSink::default();
        let snapshot = ticket(TicketStatus::Open);

        let actions = evaluate_actions_with_audit(
            &snapshot,
            &assigned_agent(),
            &sink,
            &AuditContext::new(Some(snapshot.id.clone()), "req-7", "list-view"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "lifecycle.actions_evaluated");
        assert_eq!(events[0].correlation_id, "req-7");
        assert_eq!(events[0].metadata.get("can_resolve").map(String::as_str), Some("true"));
        assert_eq!(events[0].metadata.get("assign_label").map(String::as_str), Some("reassign"));
        assert!(actions.can_resolve);
    }
}
