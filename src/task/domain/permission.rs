//! Permission predicates for task mutation.
//!
//! Editing and deleting follow different rules: collaborators may edit a
//! task but may not delete it.

use super::{Task, User};

/// Returns whether `user` may edit `task`.
///
/// True for the assignee, any collaborator, the creator, and administrators.
#[must_use]
pub fn can_edit(task: &Task, user: &User) -> bool {
    user.is_admin()
        || task.assignee_id() == Some(user.id())
        || task.collaborator_ids().contains(user.id())
        || task.creator_id() == user.id()
}

/// Returns whether `user` may delete `task`.
///
/// True for the creator, the assignee, and administrators.
#[must_use]
pub fn can_delete(task: &Task, user: &User) -> bool {
    user.is_admin() || task.assignee_id() == Some(user.id()) || task.creator_id() == user.id()
}
