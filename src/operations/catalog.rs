//! The Veracross v3 operation table.
//!
//! Names follow `<resource>.<action>` and scopes follow
//! `<resource>:<action>`, where the resource uses dots between domain and
//! entity (`academics.classes`). Operations on a sub-collection borrow the
//! parent's read scope.

use std::collections::HashSet;

use thiserror::Error;

use super::{Operation, Verb};
use crate::error::{Result, VeracrossError};
use crate::scope::Scopes;

const ACTIONS: [&str; 5] = ["list", "read", "create", "update", "delete"];

static OPERATIONS: &[Operation] = &[
    // Academics
    Operation::list(
        "academics.assignments.list",
        "academics/assignments",
        "academics.assignments:list",
    ),
    Operation::read(
        "academics.assignments.read",
        "academics/assignments/{id}",
        "academics.assignments:read",
    ),
    Operation::list(
        "academics.blocks.list",
        "academics/blocks",
        "academics.blocks:list",
    ),
    Operation::list(
        "academics.classes.list",
        "academics/classes",
        "academics.classes:list",
    ),
    Operation::read(
        "academics.classes.read",
        "academics/classes/{id}",
        "academics.classes:read",
    ),
    Operation::create(
        "academics.classes.create",
        "academics/classes",
        "academics.classes:create",
    ),
    Operation::update(
        "academics.classes.update",
        "academics/classes/{id}",
        "academics.classes:update",
    ),
    Operation::list(
        "academics.classes.teachers.list",
        "academics/classes/{class_id}/teachers",
        "academics.classes:read",
    ),
    Operation::list(
        "academics.classes.meeting_times.list",
        "academics/classes/{class_id}/meeting_times",
        "academics.classes:read",
    ),
    Operation::list(
        "academics.courses.list",
        "academics/courses",
        "academics.courses:list",
    ),
    Operation::read(
        "academics.courses.read",
        "academics/courses/{id}",
        "academics.courses:read",
    ),
    Operation::create(
        "academics.courses.create",
        "academics/courses",
        "academics.courses:create",
    ),
    Operation::update(
        "academics.courses.update",
        "academics/courses/{id}",
        "academics.courses:update",
    ),
    Operation::list(
        "academics.departments.list",
        "academics/departments",
        "academics.departments:list",
    ),
    Operation::list(
        "academics.enrollments.list",
        "academics/enrollments",
        "academics.enrollments:list",
    ),
    Operation::read(
        "academics.enrollments.read",
        "academics/enrollments/{id}",
        "academics.enrollments:read",
    ),
    Operation::create(
        "academics.enrollments.create",
        "academics/enrollments",
        "academics.enrollments:create",
    ),
    Operation::update(
        "academics.enrollments.update",
        "academics/enrollments/{id}",
        "academics.enrollments:update",
    ),
    Operation::delete(
        "academics.enrollments.delete",
        "academics/enrollments/{id}",
        "academics.enrollments:delete",
    ),
    Operation::list(
        "academics.grading_periods.list",
        "academics/grading_periods",
        "academics.grading_periods:list",
    ),
    Operation::list(
        "academics.numeric_grades.list",
        "academics/numeric_grades",
        "academics.numeric_grades:list",
    ),
    Operation::list(
        "academics.qualitative_grades.list",
        "academics/qualitative_grades",
        "academics.qualitative_grades:list",
    ),
    Operation::list(
        "academics.report_cards.list",
        "academics/report_cards",
        "academics.report_cards:list",
    ),
    Operation::list(
        "academics.rooms.list",
        "academics/rooms",
        "academics.rooms:list",
    ),
    Operation::read(
        "academics.rooms.read",
        "academics/rooms/{id}",
        "academics.rooms:read",
    ),
    Operation::list(
        "academics.student_schedules.list",
        "academics/student_schedules",
        "academics.student_schedules:list",
    ),
    Operation::list(
        "academics.subjects.list",
        "academics/subjects",
        "academics.subjects:list",
    ),
    // Admission
    Operation::list(
        "admission.applications.list",
        "admission/applications",
        "admission.applications:list",
    ),
    Operation::read(
        "admission.applications.read",
        "admission/applications/{id}",
        "admission.applications:read",
    ),
    Operation::create(
        "admission.applications.create",
        "admission/applications",
        "admission.applications:create",
    ),
    Operation::update(
        "admission.applications.update",
        "admission/applications/{id}",
        "admission.applications:update",
    ),
    Operation::list(
        "admission.candidates.list",
        "admission/candidates",
        "admission.candidates:list",
    ),
    Operation::read(
        "admission.candidates.read",
        "admission/candidates/{id}",
        "admission.candidates:read",
    ),
    Operation::update(
        "admission.candidates.update",
        "admission/candidates/{id}",
        "admission.candidates:update",
    ),
    Operation::list(
        "admission.checklist_items.list",
        "admission/checklist_items",
        "admission.checklist_items:list",
    ),
    Operation::update(
        "admission.checklist_items.update",
        "admission/checklist_items/{id}",
        "admission.checklist_items:update",
    ),
    Operation::list(
        "admission.decisions.list",
        "admission/decisions",
        "admission.decisions:list",
    ),
    Operation::list(
        "admission.inquiries.list",
        "admission/inquiries",
        "admission.inquiries:list",
    ),
    Operation::read(
        "admission.inquiries.read",
        "admission/inquiries/{id}",
        "admission.inquiries:read",
    ),
    Operation::create(
        "admission.inquiries.create",
        "admission/inquiries",
        "admission.inquiries:create",
    ),
    Operation::list(
        "admission.interviews.list",
        "admission/interviews",
        "admission.interviews:list",
    ),
    Operation::list(
        "admission.visits.list",
        "admission/visits",
        "admission.visits:list",
    ),
    Operation::read(
        "admission.visits.read",
        "admission/visits/{id}",
        "admission.visits:read",
    ),
    Operation::create(
        "admission.visits.create",
        "admission/visits",
        "admission.visits:create",
    ),
    // Alumni
    Operation::list("alumni.list", "alumni", "alumni:list"),
    Operation::read("alumni.read", "alumni/{id}", "alumni:read"),
    Operation::update("alumni.update", "alumni/{id}", "alumni:update"),
    // Athletics
    Operation::list(
        "athletics.games.list",
        "athletics/games",
        "athletics.games:list",
    ),
    Operation::read(
        "athletics.games.read",
        "athletics/games/{id}",
        "athletics.games:read",
    ),
    Operation::create(
        "athletics.games.create",
        "athletics/games",
        "athletics.games:create",
    ),
    Operation::update(
        "athletics.games.update",
        "athletics/games/{id}",
        "athletics.games:update",
    ),
    Operation::delete(
        "athletics.games.delete",
        "athletics/games/{id}",
        "athletics.games:delete",
    ),
    Operation::list(
        "athletics.opponents.list",
        "athletics/opponents",
        "athletics.opponents:list",
    ),
    Operation::list(
        "athletics.practices.list",
        "athletics/practices",
        "athletics.practices:list",
    ),
    Operation::list(
        "athletics.rosters.list",
        "athletics/rosters",
        "athletics.rosters:list",
    ),
    Operation::list(
        "athletics.seasons.list",
        "athletics/seasons",
        "athletics.seasons:list",
    ),
    Operation::list(
        "athletics.sports.list",
        "athletics/sports",
        "athletics.sports:list",
    ),
    Operation::list(
        "athletics.teams.list",
        "athletics/teams",
        "athletics.teams:list",
    ),
    Operation::read(
        "athletics.teams.read",
        "athletics/teams/{id}",
        "athletics.teams:read",
    ),
    Operation::list(
        "athletics.teams.roster.list",
        "athletics/teams/{team_id}/roster",
        "athletics.teams:read",
    ),
    Operation::list(
        "athletics.venues.list",
        "athletics/venues",
        "athletics.venues:list",
    ),
    // Attendance
    Operation::list(
        "attendance.class_attendance.list",
        "attendance/class_attendance",
        "attendance.class_attendance:list",
    ),
    Operation::read(
        "attendance.class_attendance.read",
        "attendance/class_attendance/{id}",
        "attendance.class_attendance:read",
    ),
    Operation::update(
        "attendance.class_attendance.update",
        "attendance/class_attendance/{id}",
        "attendance.class_attendance:update",
    ),
    Operation::list(
        "attendance.daily_attendance.list",
        "attendance/daily_attendance",
        "attendance.daily_attendance:list",
    ),
    Operation::list(
        "attendance.master_attendance.list",
        "attendance/master_attendance",
        "attendance.master_attendance:list",
    ),
    Operation::list(
        "attendance.status_codes.list",
        "attendance/status_codes",
        "attendance.status_codes:list",
    ),
    // Behavior
    Operation::list(
        "behavior.actions.list",
        "behavior/actions",
        "behavior.actions:list",
    ),
    Operation::list(
        "behavior.categories.list",
        "behavior/categories",
        "behavior.categories:list",
    ),
    Operation::list(
        "behavior.incidents.list",
        "behavior/incidents",
        "behavior.incidents:list",
    ),
    Operation::read(
        "behavior.incidents.read",
        "behavior/incidents/{id}",
        "behavior.incidents:read",
    ),
    Operation::create(
        "behavior.incidents.create",
        "behavior/incidents",
        "behavior.incidents:create",
    ),
    Operation::update(
        "behavior.incidents.update",
        "behavior/incidents/{id}",
        "behavior.incidents:update",
    ),
    // Calendars
    Operation::list(
        "calendars.events.list",
        "calendars/events",
        "calendars.events:list",
    ),
    Operation::read(
        "calendars.events.read",
        "calendars/events/{id}",
        "calendars.events:read",
    ),
    Operation::create(
        "calendars.events.create",
        "calendars/events",
        "calendars.events:create",
    ),
    Operation::update(
        "calendars.events.update",
        "calendars/events/{id}",
        "calendars.events:update",
    ),
    Operation::delete(
        "calendars.events.delete",
        "calendars/events/{id}",
        "calendars.events:delete",
    ),
    // Contacts
    Operation::list("contacts.list", "contacts", "contacts:list"),
    Operation::read("contacts.read", "contacts/{id}", "contacts:read"),
    // Enrollment
    Operation::list(
        "enrollment.history.list",
        "enrollment/history",
        "enrollment.history:list",
    ),
    Operation::list(
        "enrollment.re_enrollments.list",
        "enrollment/re_enrollments",
        "enrollment.re_enrollments:list",
    ),
    Operation::read(
        "enrollment.re_enrollments.read",
        "enrollment/re_enrollments/{id}",
        "enrollment.re_enrollments:read",
    ),
    Operation::update(
        "enrollment.re_enrollments.update",
        "enrollment/re_enrollments/{id}",
        "enrollment.re_enrollments:update",
    ),
    // Facilities
    Operation::list(
        "facilities.room_reservations.list",
        "facilities/room_reservations",
        "facilities.room_reservations:list",
    ),
    Operation::create(
        "facilities.room_reservations.create",
        "facilities/room_reservations",
        "facilities.room_reservations:create",
    ),
    Operation::delete(
        "facilities.room_reservations.delete",
        "facilities/room_reservations/{id}",
        "facilities.room_reservations:delete",
    ),
    // Health
    Operation::list(
        "health.allergies.list",
        "health/allergies",
        "health.allergies:list",
    ),
    Operation::list(
        "health.conditions.list",
        "health/conditions",
        "health.conditions:list",
    ),
    Operation::read(
        "health.conditions.read",
        "health/conditions/{id}",
        "health.conditions:read",
    ),
    Operation::create(
        "health.conditions.create",
        "health/conditions",
        "health.conditions:create",
    ),
    Operation::update(
        "health.conditions.update",
        "health/conditions/{id}",
        "health.conditions:update",
    ),
    Operation::list(
        "health.immunizations.list",
        "health/immunizations",
        "health.immunizations:list",
    ),
    Operation::read(
        "health.immunizations.read",
        "health/immunizations/{id}",
        "health.immunizations:read",
    ),
    Operation::create(
        "health.immunizations.create",
        "health/immunizations",
        "health.immunizations:create",
    ),
    Operation::list(
        "health.medications.list",
        "health/medications",
        "health.medications:list",
    ),
    Operation::list(
        "health.office_visits.list",
        "health/office_visits",
        "health.office_visits:list",
    ),
    Operation::read(
        "health.office_visits.read",
        "health/office_visits/{id}",
        "health.office_visits:read",
    ),
    Operation::create(
        "health.office_visits.create",
        "health/office_visits",
        "health.office_visits:create",
    ),
    Operation::list(
        "health.screenings.list",
        "health/screenings",
        "health.screenings:list",
    ),
    // Households
    Operation::list("households.list", "households", "households:list"),
    Operation::read("households.read", "households/{id}", "households:read"),
    Operation::create("households.create", "households", "households:create"),
    Operation::update("households.update", "households/{id}", "households:update"),
    Operation::list(
        "households.members.list",
        "households/{household_id}/members",
        "households:read",
    ),
    // Parents
    Operation::list("parents.list", "parents", "parents:list"),
    Operation::read("parents.read", "parents/{id}", "parents:read"),
    Operation::update("parents.update", "parents/{id}", "parents:update"),
    // Persons
    Operation::list("persons.list", "persons", "persons:list"),
    Operation::read("persons.read", "persons/{id}", "persons:read"),
    // Relationships
    Operation::list("relationships.list", "relationships", "relationships:list"),
    Operation::create(
        "relationships.create",
        "relationships",
        "relationships:create",
    ),
    Operation::delete(
        "relationships.delete",
        "relationships/{id}",
        "relationships:delete",
    ),
    // Residential life
    Operation::list(
        "residential_life.dormitories.list",
        "residential_life/dormitories",
        "residential_life.dormitories:list",
    ),
    Operation::list(
        "residential_life.room_assignments.list",
        "residential_life/room_assignments",
        "residential_life.room_assignments:list",
    ),
    Operation::create(
        "residential_life.room_assignments.create",
        "residential_life/room_assignments",
        "residential_life.room_assignments:create",
    ),
    Operation::delete(
        "residential_life.room_assignments.delete",
        "residential_life/room_assignments/{id}",
        "residential_life.room_assignments:delete",
    ),
    Operation::list(
        "residential_life.rooms.list",
        "residential_life/rooms",
        "residential_life.rooms:list",
    ),
    // School configuration
    Operation::list("grade_levels.list", "grade_levels", "grade_levels:list"),
    Operation::list("school_years.list", "school_years", "school_years:list"),
    // Staff and faculty
    Operation::list("staff_faculty.list", "staff_faculty", "staff_faculty:list"),
    Operation::read(
        "staff_faculty.read",
        "staff_faculty/{id}",
        "staff_faculty:read",
    ),
    Operation::update(
        "staff_faculty.update",
        "staff_faculty/{id}",
        "staff_faculty:update",
    ),
    // Students
    Operation::list("students.list", "students", "students:list"),
    Operation::read("students.read", "students/{id}", "students:read"),
    Operation::create("students.create", "students", "students:create"),
    Operation::update("students.update", "students/{id}", "students:update"),
    Operation::list(
        "student_groups.list",
        "student_groups",
        "student_groups:list",
    ),
    Operation::list(
        "student_groups.members.list",
        "student_groups/{group_id}/members",
        "student_groups:read",
    ),
    // Metadata
    Operation::list(
        "user_defined_fields.list",
        "user_defined_fields",
        "user_defined_fields:list",
    ),
    Operation::list("value_lists.list", "value_lists", "value_lists:list"),
    Operation::read("value_lists.read", "value_lists/{id}", "value_lists:read"),
];

/// Every built-in operation.
pub fn all() -> &'static [Operation] {
    OPERATIONS
}

/// Look up an operation by name.
pub fn find(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Operations whose name starts with `prefix` followed by a dot, e.g.
/// `"academics"` or `"health.conditions"`.
pub fn by_prefix<'a>(prefix: &'a str) -> impl Iterator<Item = &'static Operation> + 'a {
    OPERATIONS.iter().filter(move |op| {
        op.name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// The scopes needed to run the named operations.
///
/// # Errors
///
/// Returns [`VeracrossError::UnknownOperation`] for a name not in the
/// catalog.
pub fn required_scopes<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Scopes> {
    names
        .into_iter()
        .map(|name| {
            find(name)
                .map(|op| op.scope)
                .ok_or_else(|| VeracrossError::UnknownOperation(name.to_string()))
        })
        .collect()
}

/// A problem found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("operation name '{0}' is defined more than once")]
    DuplicateName(&'static str),

    #[error("operation '{operation}' has malformed scope '{scope}'")]
    MalformedScope {
        operation: &'static str,
        scope: &'static str,
    },

    #[error("operation '{operation}' uses {verb} but its scope is '{scope}'")]
    VerbMismatch {
        operation: &'static str,
        verb: Verb,
        scope: &'static str,
    },

    #[error("operation '{operation}' is paginated but uses {verb}")]
    PaginatedWrite {
        operation: &'static str,
        verb: Verb,
    },

    #[error("operation '{operation}' has an unbalanced path '{path}'")]
    UnbalancedPath {
        operation: &'static str,
        path: &'static str,
    },
}

/// Check a set of operations for copy-paste drift.
pub fn validate(operations: &[Operation]) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for op in operations {
        if !seen.insert(op.name) {
            issues.push(CatalogIssue::DuplicateName(op.name));
        }

        match scope_action(op.scope) {
            None => issues.push(CatalogIssue::MalformedScope {
                operation: op.name,
                scope: op.scope,
            }),
            Some(action) if !verb_fits(op.verb, action) => {
                issues.push(CatalogIssue::VerbMismatch {
                    operation: op.name,
                    verb: op.verb,
                    scope: op.scope,
                })
            }
            Some(_) => {}
        }

        if op.paginated && op.verb != Verb::Get {
            issues.push(CatalogIssue::PaginatedWrite {
                operation: op.name,
                verb: op.verb,
            });
        }

        if op.path.matches('{').count() != op.path.matches('}').count()
            || op.placeholders().iter().any(|p| p.is_empty())
        {
            issues.push(CatalogIssue::UnbalancedPath {
                operation: op.name,
                path: op.path,
            });
        }
    }

    issues
}

fn scope_action(scope: &str) -> Option<&str> {
    let (resource, action) = scope.split_once(':')?;
    let resource_ok = !resource.is_empty()
        && !resource.starts_with('.')
        && !resource.ends_with('.')
        && resource
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    (resource_ok && ACTIONS.contains(&action)).then_some(action)
}

fn verb_fits(verb: Verb, action: &str) -> bool {
    match action {
        "list" | "read" => verb == Verb::Get,
        "create" => verb == Verb::Post,
        "update" => matches!(verb, Verb::Patch | Verb::Put),
        "delete" => verb == Verb::Delete,
        _ => false,
    }
}
