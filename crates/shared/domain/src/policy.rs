//! Role and department scoped authorization.
//!
//! Deny by default: an operation is allowed only when one of the actor's
//! rules names the resource and action and its scope predicate holds for
//! the record. Every denial carries the actor's own home path.

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::user::{User, UserRole};

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
}

impl Actor {
    pub fn home_path(&self) -> &'static str {
        self.role.home_path()
    }

    /// The uniform "no rights" error for this actor.
    pub fn forbidden(&self) -> DomainError {
        DomainError::Forbidden {
            redirect_to: self.home_path(),
        }
    }

    pub fn require_role(&self, role: UserRole) -> DomainResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(self.forbidden())
        }
    }

    pub fn ability(&self) -> Ability {
        Ability::for_actor(self)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            department_id: user.department_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Department,
    User,
    DailyReport,
    AdminDashboard,
    ManagerDashboard,
    UserDashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Destroy,
    Review,
}

impl Action {
    pub const MANAGE: &'static [Action] =
        &[Action::Create, Action::Read, Action::Update, Action::Destroy];
}

/// What an action is checked against.
///
/// Class-level subjects pass when any rule grants the action on the
/// resource. Record-level subjects carry the attributes scope predicates
/// look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Class(Resource),
    Department {
        id: Uuid,
    },
    User {
        id: Uuid,
        department_id: Option<Uuid>,
    },
    DailyReport {
        owner_id: Uuid,
        owner_department_id: Option<Uuid>,
    },
}

impl Subject {
    pub fn resource(&self) -> Resource {
        match self {
            Subject::Class(resource) => *resource,
            Subject::Department { .. } => Resource::Department,
            Subject::User { .. } => Resource::User,
            Subject::DailyReport { .. } => Resource::DailyReport,
        }
    }

    pub fn user(user: &User) -> Self {
        Subject::User {
            id: user.id,
            department_id: user.department_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Any,
    /// Record belongs to the actor's department
    OwnDepartment,
    /// Record is owned by the actor
    Own,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    resource: Resource,
    actions: &'static [Action],
    scope: Scope,
}

impl Rule {
    const fn new(resource: Resource, actions: &'static [Action], scope: Scope) -> Self {
        Self {
            resource,
            actions,
            scope,
        }
    }

    fn grants(&self, action: Action, resource: Resource) -> bool {
        self.resource == resource && self.actions.contains(&action)
    }
}

const ADMIN_RULES: &[Rule] = &[
    Rule::new(Resource::Department, Action::MANAGE, Scope::Any),
    Rule::new(Resource::User, Action::MANAGE, Scope::Any),
    Rule::new(Resource::AdminDashboard, &[Action::Read], Scope::Any),
];

const MANAGER_RULES: &[Rule] = &[
    Rule::new(
        Resource::DailyReport,
        &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Destroy,
            Action::Review,
        ],
        Scope::OwnDepartment,
    ),
    Rule::new(
        Resource::User,
        &[Action::Read, Action::Destroy],
        Scope::OwnDepartment,
    ),
    Rule::new(Resource::Department, &[Action::Read], Scope::OwnDepartment),
    Rule::new(Resource::ManagerDashboard, &[Action::Read], Scope::Any),
    Rule::new(Resource::User, &[Action::Create], Scope::Any),
];

const USER_RULES: &[Rule] = &[
    Rule::new(Resource::DailyReport, Action::MANAGE, Scope::Own),
    Rule::new(Resource::UserDashboard, &[Action::Read], Scope::Any),
];

/// Capability table of one actor.
#[derive(Debug, Clone)]
pub struct Ability {
    actor: Actor,
    rules: &'static [Rule],
}

impl Ability {
    pub fn for_actor(actor: &Actor) -> Self {
        let rules = match actor.role {
            UserRole::Admin => ADMIN_RULES,
            UserRole::Manager => MANAGER_RULES,
            UserRole::User => USER_RULES,
        };
        Self {
            actor: *actor,
            rules,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn can(&self, action: Action, subject: &Subject) -> bool {
        let resource = subject.resource();
        self.rules
            .iter()
            .filter(|rule| rule.grants(action, resource))
            .any(|rule| self.scope_matches(rule.scope, subject))
    }

    pub fn cannot(&self, action: Action, subject: &Subject) -> bool {
        !self.can(action, subject)
    }

    pub fn authorize(&self, action: Action, subject: &Subject) -> DomainResult<()> {
        if self.can(action, subject) {
            Ok(())
        } else {
            Err(self.actor.forbidden())
        }
    }

    /// Authorize against a record that may not exist.
    ///
    /// A missing record is only reported as not found to actors holding an
    /// unconditional rule for the resource. Everyone else gets the same
    /// denial as for a record outside their scope.
    pub fn authorize_found<T>(
        &self,
        action: Action,
        resource: Resource,
        record: Option<T>,
        subject: impl FnOnce(&T) -> Subject,
    ) -> DomainResult<T> {
        match record {
            Some(record) => {
                self.authorize(action, &subject(&record))?;
                Ok(record)
            }
            None if self.has_unconditional(action, resource) => {
                Err(DomainError::not_found(resource_name(resource)))
            }
            None => Err(self.actor.forbidden()),
        }
    }

    fn has_unconditional(&self, action: Action, resource: Resource) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.grants(action, resource) && rule.scope == Scope::Any)
    }

    fn scope_matches(&self, scope: Scope, subject: &Subject) -> bool {
        match (scope, subject) {
            (_, Subject::Class(_)) => true,
            (Scope::Any, _) => true,
            (Scope::OwnDepartment, subject) => {
                let Some(own) = self.actor.department_id else {
                    return false;
                };
                match subject {
                    Subject::Department { id } => *id == own,
                    Subject::User { department_id, .. } => *department_id == Some(own),
                    Subject::DailyReport {
                        owner_department_id,
                        ..
                    } => *owner_department_id == Some(own),
                    Subject::Class(_) => true,
                }
            }
            (Scope::Own, Subject::DailyReport { owner_id, .. }) => *owner_id == self.actor.id,
            (Scope::Own, Subject::User { id, .. }) => *id == self.actor.id,
            (Scope::Own, Subject::Department { .. }) => false,
        }
    }
}

fn resource_name(resource: Resource) -> &'static str {
    match resource {
        Resource::Department => "Department",
        Resource::User => "User",
        Resource::DailyReport => "Daily report",
        Resource::AdminDashboard | Resource::ManagerDashboard | Resource::UserDashboard => {
            "Dashboard"
        }
    }
}
