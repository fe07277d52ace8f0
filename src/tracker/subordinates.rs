//! Which users a given account may see and manage.

use std::collections::{BTreeSet, HashMap};

use crate::model::authorization::{AuthLink, Member};
use crate::model::role::Role;

/// Authorization links together with the role and process of every user.
#[derive(Debug, Clone, Default)]
pub struct Org {
    links: Vec<AuthLink>,
    members: HashMap<u64, Member>,
}

impl Org {
    pub fn new(links: Vec<AuthLink>, members: impl IntoIterator<Item = Member>) -> Self {
        Self {
            links,
            members: members.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    fn role_of(&self, id: u64) -> Option<Role> {
        self.members.get(&id).map(|m| m.role)
    }

    /// Users linked directly under `admin_id`.
    fn linked_under(&self, admin_id: u64) -> impl Iterator<Item = u64> + '_ {
        self.links
            .iter()
            .filter(move |l| l.admin_id == admin_id)
            .map(|l| l.user_id)
    }

    /// ADMIN accounts that link `user_id`. Super users linking someone do not
    /// make that user part of their team.
    fn managing_admins(&self, user_id: u64) -> impl Iterator<Item = u64> + '_ {
        self.links
            .iter()
            .filter(move |l| l.user_id == user_id)
            .map(|l| l.admin_id)
            .filter(move |&admin| self.role_of(admin) == Some(Role::Admin))
    }

    /// Ids visible to `viewer_id`, the viewer included.
    ///
    /// Super users and admins see everyone linked under them. Team leads see
    /// the teams of the admins that link them, admins included. Regular users
    /// see the teammates of their process under the same admins.
    pub fn visible_user_ids(&self, viewer_id: u64) -> BTreeSet<u64> {
        let mut visible = BTreeSet::from([viewer_id]);
        let Some(viewer) = self.members.get(&viewer_id) else {
            return visible;
        };

        match viewer.role {
            Role::Super | Role::Admin => visible.extend(self.linked_under(viewer_id)),
            Role::TeamLead => {
                for admin in self.managing_admins(viewer_id) {
                    visible.insert(admin);
                    visible.extend(self.linked_under(admin));
                }
            }
            Role::User => {
                for admin in self.managing_admins(viewer_id) {
                    visible.extend(self.linked_under(admin).filter(|id| {
                        self.members
                            .get(id)
                            .is_some_and(|m| m.process == viewer.process)
                    }));
                }
            }
        }
        visible
    }

    /// Managers act on visible users that do not outrank them.
    pub fn can_manage(&self, viewer_id: u64, target_id: u64) -> bool {
        if viewer_id == target_id {
            return true;
        }
        let (Some(viewer), Some(target)) = (self.role_of(viewer_id), self.role_of(target_id)) else {
            return false;
        };
        viewer.sup_tl_or_admin()
            && target.id() >= viewer.id()
            && self.visible_user_ids(viewer_id).contains(&target_id)
    }
}
