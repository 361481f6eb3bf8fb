use super::user::Role;

/// Privileged actions gated by platform role. Relationship checks (is this
/// user the team leader, an accepted judge for the event, and so on) stay
/// in the services; this table answers only the role half of the question,
/// in one place instead of per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageHackathons,
    ManageOrganizations,
    LockTeams,
    AssignMentors,
    AssignJudges,
    ViewAllSubmissions,
    RateSubmissions,
    ManageUsers,
}

pub fn allows(role: Role, capability: Capability) -> bool {
    use Capability::*;
    match role {
        Role::Admin => true,
        Role::Organizer => matches!(
            capability,
            ManageHackathons
                | ManageOrganizations
                | LockTeams
                | AssignMentors
                | AssignJudges
                | ViewAllSubmissions
        ),
        Role::Judge => matches!(capability, ViewAllSubmissions | RateSubmissions),
        Role::Mentor => matches!(capability, LockTeams),
        Role::Participant | Role::Sponsor => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_capability() {
        for capability in [
            Capability::ManageHackathons,
            Capability::ManageOrganizations,
            Capability::LockTeams,
            Capability::AssignMentors,
            Capability::AssignJudges,
            Capability::ViewAllSubmissions,
            Capability::RateSubmissions,
            Capability::ManageUsers,
        ] {
            assert!(allows(Role::Admin, capability));
        }
    }

    #[test]
    fn participants_hold_none() {
        assert!(!allows(Role::Participant, Capability::LockTeams));
        assert!(!allows(Role::Participant, Capability::ViewAllSubmissions));
    }

    #[test]
    fn judges_rate_but_do_not_assign() {
        assert!(allows(Role::Judge, Capability::RateSubmissions));
        assert!(!allows(Role::Judge, Capability::AssignJudges));
    }
}
