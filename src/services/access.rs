//! Authorization predicates.
//!
//! Pure functions over already-loaded rows so every rule can be unit tested
//! without a database. Services load the rows, ask here, then act.

use crate::database::models::{Comment, Issue, Project, ProjectMember};
use crate::types::{GlobalRole, ProjectRole};

/// The authenticated user performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: GlobalRole,
}

impl Actor {
    pub fn new(id: i64, role: GlobalRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == GlobalRole::Admin
    }
}

/// An actor's standing inside one project
#[derive(Debug, Clone, Copy)]
pub struct ProjectAccess<'a> {
    pub project: &'a Project,
    pub membership: Option<&'a ProjectMember>,
    pub actor: Actor,
}

impl<'a> ProjectAccess<'a> {
    pub fn new(project: &'a Project, membership: Option<&'a ProjectMember>, actor: Actor) -> Self {
        Self {
            project,
            membership,
            actor,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.project.owner_id == self.actor.id
    }

    /// The owner counts as an owner member even without a membership row
    pub fn project_role(&self) -> Option<ProjectRole> {
        if self.is_owner() {
            return Some(ProjectRole::Owner);
        }
        self.membership
            .filter(|m| m.user_id == self.actor.id && m.project_id == self.project.id)
            .map(|m| m.role)
    }

    pub fn is_member(&self) -> bool {
        self.project_role().is_some()
    }

    /// Read access to the project, its issues and comments
    pub fn can_view(&self) -> bool {
        self.is_member() || self.actor.is_admin()
    }

    /// Owner or admin member, or a global admin
    pub fn is_manager(&self) -> bool {
        self.project_role().is_some_and(|r| r.is_manager()) || self.actor.is_admin()
    }

    pub fn can_modify_project(&self) -> bool {
        self.is_manager()
    }

    pub fn can_delete_project(&self) -> bool {
        self.is_owner() || self.actor.is_admin()
    }

    /// Members other than project viewers may file issues and comment
    pub fn can_contribute(&self) -> bool {
        match self.project_role() {
            Some(ProjectRole::Viewer) => false,
            Some(_) => true,
            None => self.actor.is_admin(),
        }
    }

    /// Reporter, assignee or manager, and still able to see the project.
    /// Someone removed from the project keeps no rights over issues they filed.
    pub fn can_modify_issue(&self, issue: &Issue, actor_is_assignee: bool) -> bool {
        if !self.can_view() {
            return false;
        }
        self.is_reporter(issue) || actor_is_assignee || self.is_manager()
    }

    pub fn can_delete_issue(&self, issue: &Issue) -> bool {
        self.can_view() && (self.is_reporter(issue) || self.is_manager())
    }

    pub fn can_modify_comment(&self, comment: &Comment) -> bool {
        let is_author = comment.author_id == Some(self.actor.id);
        self.can_view() && (is_author || self.is_manager())
    }

    fn is_reporter(&self, issue: &Issue) -> bool {
        issue.reporter_id == Some(self.actor.id)
    }
}

/// Labels are a global vocabulary managed by platform admins
pub fn can_manage_labels(actor: &Actor) -> bool {
    actor.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssuePriority, IssueStatus};
    use chrono::Utc;

    const OWNER: i64 = 1;
    const PROJECT: i64 = 10;

    fn project() -> Project {
        Project {
            id: PROJECT,
            name: "Apollo".to_string(),
            description: None,
            owner_id: OWNER,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn member(user_id: i64, role: ProjectRole) -> ProjectMember {
        ProjectMember {
            id: user_id * 100,
            project_id: PROJECT,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    fn issue(reporter_id: Option<i64>) -> Issue {
        Issue {
            id: 5,
            project_id: PROJECT,
            title: "Broken build".to_string(),
            description: None,
            status: IssueStatus::Open,
            priority: IssuePriority::High,
            reporter_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment(author_id: Option<i64>) -> Comment {
        Comment {
            id: 7,
            issue_id: 5,
            author_id,
            content: "Seen on main too".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn developer(id: i64) -> Actor {
        Actor::new(id, GlobalRole::Developer)
    }

    #[test]
    fn owner_is_implicit_member() {
        let project = project();
        let access = ProjectAccess::new(&project, None, developer(OWNER));
        assert_eq!(access.project_role(), Some(ProjectRole::Owner));
        assert!(access.can_view());
        assert!(access.can_modify_project());
        assert!(access.can_delete_project());
        assert!(access.can_contribute());
    }

    #[test]
    fn project_admin_can_modify_but_not_delete() {
        let project = project();
        let m = member(2, ProjectRole::Admin);
        let access = ProjectAccess::new(&project, Some(&m), developer(2));
        assert!(access.can_modify_project());
        assert!(!access.can_delete_project());
    }

    #[test]
    fn plain_member_cannot_manage() {
        let project = project();
        let m = member(3, ProjectRole::Member);
        let access = ProjectAccess::new(&project, Some(&m), developer(3));
        assert!(access.can_view());
        assert!(access.can_contribute());
        assert!(!access.can_modify_project());
        assert!(!access.can_delete_project());
    }

    #[test]
    fn project_viewer_is_read_only() {
        let project = project();
        let m = member(4, ProjectRole::Viewer);
        let access = ProjectAccess::new(&project, Some(&m), developer(4));
        assert!(access.can_view());
        assert!(!access.can_contribute());
        assert!(!access.can_modify_issue(&issue(Some(OWNER)), false));
    }

    #[test]
    fn outsider_sees_nothing() {
        let project = project();
        let access = ProjectAccess::new(&project, None, developer(99));
        assert!(!access.can_view());
        assert!(!access.can_contribute());
        assert!(!access.can_modify_issue(&issue(Some(99)), true));
        assert!(!access.can_delete_issue(&issue(Some(99))));
        assert!(!access.can_modify_comment(&comment(Some(99))));
    }

    #[test]
    fn membership_row_for_another_project_is_ignored() {
        let project = project();
        let mut m = member(6, ProjectRole::Admin);
        m.project_id = PROJECT + 1;
        let access = ProjectAccess::new(&project, Some(&m), developer(6));
        assert!(!access.is_member());
    }

    #[test]
    fn global_admin_overrides() {
        let project = project();
        let access = ProjectAccess::new(&project, None, Actor::new(50, GlobalRole::Admin));
        assert!(access.can_view());
        assert!(access.can_modify_project());
        assert!(access.can_delete_project());
        assert!(access.can_delete_issue(&issue(Some(OWNER))));
        assert!(can_manage_labels(&access.actor));
        assert!(!can_manage_labels(&developer(OWNER)));
    }

    #[test]
    fn issue_rules() {
        let project = project();
        let m = member(3, ProjectRole::Member);
        let access = ProjectAccess::new(&project, Some(&m), developer(3));

        // reporter may modify and delete
        assert!(access.can_modify_issue(&issue(Some(3)), false));
        assert!(access.can_delete_issue(&issue(Some(3))));
        // assignee may modify but not delete
        assert!(access.can_modify_issue(&issue(Some(OWNER)), true));
        assert!(!access.can_delete_issue(&issue(Some(OWNER))));
        // neither
        assert!(!access.can_modify_issue(&issue(None), false));
    }

    #[test]
    fn comment_rules() {
        let project = project();
        let m = member(3, ProjectRole::Member);
        let author = ProjectAccess::new(&project, Some(&m), developer(3));
        assert!(author.can_modify_comment(&comment(Some(3))));
        assert!(!author.can_modify_comment(&comment(Some(OWNER))));
        assert!(!author.can_modify_comment(&comment(None)));

        let owner = ProjectAccess::new(&project, None, developer(OWNER));
        assert!(owner.can_modify_comment(&comment(Some(3))));
    }

    #[test]
    fn departed_reporter_and_assignee_lose_issue_rights() {
        let project = project();
        // user 8 filed the issue and is still assigned, but no longer a member
        let access = ProjectAccess::new(&project, None, developer(8));
        assert!(!access.can_modify_issue(&issue(Some(8)), true));
        assert!(!access.can_delete_issue(&issue(Some(8))));
        assert!(!access.can_modify_comment(&comment(Some(8))));

        // a global admin in the same position keeps them
        let admin = ProjectAccess::new(&project, None, Actor::new(8, GlobalRole::Admin));
        assert!(admin.can_modify_issue(&issue(Some(8)), true));
    }
}
