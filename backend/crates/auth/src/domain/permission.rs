//! Permission Evaluator
//!
//! Pure decisions over (method, caller, resource owner). Nothing here touches
//! storage; handlers fetch what they need and ask.
//!
//! | Gate | Safe method | Write |
//! |---|---|---|
//! | [`admin_or_read_only`] | anyone | admin |
//! | [`authenticated_or_read_only`] | anyone | any signed-in caller |
//! | [`author_or_moderation`] | anyone | author, moderator, admin |
//! | [`admin_only`] | admin | admin |
//!
//! Gates that apply together are composed with `?` (logical AND). All four
//! share the [`Gate`] signature so routers can run them ahead of extraction.

use http::Method;

use crate::domain::value_object::{user_id::UserId, user_name::UserName, user_role::UserRole};

/// Effective privilege, totally ordered: `User < Moderator < Admin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermissionLevel {
    User,
    Moderator,
    Admin,
}

/// Map a role and the superuser flag to a privilege level.
///
/// Superusers are admins whatever their stored role.
pub fn permission_level(role: UserRole, is_superuser: bool) -> PermissionLevel {
    if is_superuser {
        return PermissionLevel::Admin;
    }
    match role {
        UserRole::User => PermissionLevel::User,
        UserRole::Moderator => PermissionLevel::Moderator,
        UserRole::Admin => PermissionLevel::Admin,
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub user_name: UserName,
    pub role: UserRole,
    pub is_superuser: bool,
}

impl Principal {
    pub fn level(&self) -> PermissionLevel {
        permission_level(self.role, self.is_superuser)
    }

    pub fn is_admin(&self) -> bool {
        self.level() == PermissionLevel::Admin
    }
}

/// Why a gate refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    /// No credentials were presented
    Unauthenticated,
    /// Credentials were presented but do not grant the operation
    Forbidden,
}

pub type Decision = Result<(), Denied>;

/// A collection-level gate over (method, caller)
pub type Gate = fn(&Method, Option<&Principal>) -> Decision;

/// GET, HEAD and OPTIONS never mutate
pub fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn require_level(caller: Option<&Principal>, level: PermissionLevel) -> Decision {
    match caller {
        None => Err(Denied::Unauthenticated),
        Some(p) if p.level() >= level => Ok(()),
        Some(_) => Err(Denied::Forbidden),
    }
}

/// Categories, genres, titles: reads are public, writes need an admin.
pub fn admin_or_read_only(method: &Method, caller: Option<&Principal>) -> Decision {
    if is_safe(method) {
        return Ok(());
    }
    require_level(caller, PermissionLevel::Admin)
}

/// Reviews and comments (collection level): writes need any signed-in caller.
pub fn authenticated_or_read_only(method: &Method, caller: Option<&Principal>) -> Decision {
    if is_safe(method) {
        return Ok(());
    }
    require_level(caller, PermissionLevel::User)
}

/// Reviews and comments (object level): the author or a moderator/admin may
/// change or delete.
pub fn author_or_moderation(
    method: &Method,
    caller: Option<&Principal>,
    author: &UserId,
) -> Decision {
    if is_safe(method) {
        return Ok(());
    }
    let caller = caller.ok_or(Denied::Unauthenticated)?;
    if &caller.user_id == author || caller.level() >= PermissionLevel::Moderator {
        Ok(())
    } else {
        Err(Denied::Forbidden)
    }
}

/// User management: admins only, for every method.
pub fn admin_only(_method: &Method, caller: Option<&Principal>) -> Decision {
    require_level(caller, PermissionLevel::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: UserRole, is_superuser: bool) -> Principal {
        Principal {
            user_id: UserId::new(),
            user_name: UserName::new("caller").unwrap(),
            role,
            is_superuser,
        }
    }

    #[test]
    fn test_permission_level_mapping() {
        assert_eq!(permission_level(UserRole::User, false), PermissionLevel::User);
        assert_eq!(
            permission_level(UserRole::Moderator, false),
            PermissionLevel::Moderator
        );
        assert_eq!(permission_level(UserRole::Admin, false), PermissionLevel::Admin);
        assert_eq!(permission_level(UserRole::User, true), PermissionLevel::Admin);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(PermissionLevel::User < PermissionLevel::Moderator);
        assert!(PermissionLevel::Moderator < PermissionLevel::Admin);
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe(&Method::GET));
        assert!(is_safe(&Method::HEAD));
        assert!(is_safe(&Method::OPTIONS));
        assert!(!is_safe(&Method::POST));
        assert!(!is_safe(&Method::PATCH));
        assert!(!is_safe(&Method::DELETE));
    }

    #[test]
    fn test_admin_or_read_only() {
        let user = principal(UserRole::User, false);
        let moderator = principal(UserRole::Moderator, false);
        let admin = principal(UserRole::Admin, false);
        let superuser = principal(UserRole::User, true);

        assert_eq!(admin_or_read_only(&Method::GET, None), Ok(()));
        assert_eq!(
            admin_or_read_only(&Method::POST, None),
            Err(Denied::Unauthenticated)
        );
        assert_eq!(
            admin_or_read_only(&Method::POST, Some(&user)),
            Err(Denied::Forbidden)
        );
        assert_eq!(
            admin_or_read_only(&Method::DELETE, Some(&moderator)),
            Err(Denied::Forbidden)
        );
        assert_eq!(admin_or_read_only(&Method::PATCH, Some(&admin)), Ok(()));
        assert_eq!(admin_or_read_only(&Method::POST, Some(&superuser)), Ok(()));
    }

    #[test]
    fn test_authenticated_or_read_only() {
        let user = principal(UserRole::User, false);
        assert_eq!(authenticated_or_read_only(&Method::GET, None), Ok(()));
        assert_eq!(
            authenticated_or_read_only(&Method::POST, None),
            Err(Denied::Unauthenticated)
        );
        assert_eq!(authenticated_or_read_only(&Method::POST, Some(&user)), Ok(()));
    }

    #[test]
    fn test_author_or_moderation() {
        let author = principal(UserRole::User, false);
        let stranger = principal(UserRole::User, false);
        let moderator = principal(UserRole::Moderator, false);
        let admin = principal(UserRole::Admin, false);
        let owner = author.user_id;

        assert_eq!(author_or_moderation(&Method::GET, None, &owner), Ok(()));
        assert_eq!(
            author_or_moderation(&Method::PATCH, None, &owner),
            Err(Denied::Unauthenticated)
        );
        assert_eq!(
            author_or_moderation(&Method::PATCH, Some(&author), &owner),
            Ok(())
        );
        assert_eq!(
            author_or_moderation(&Method::DELETE, Some(&stranger), &owner),
            Err(Denied::Forbidden)
        );
        assert_eq!(
            author_or_moderation(&Method::DELETE, Some(&moderator), &owner),
            Ok(())
        );
        assert_eq!(
            author_or_moderation(&Method::PATCH, Some(&admin), &owner),
            Ok(())
        );
    }

    #[test]
    fn test_admin_only_has_no_read_exception() {
        let user = principal(UserRole::User, false);
        let moderator = principal(UserRole::Moderator, false);
        let superuser = principal(UserRole::User, true);

        assert_eq!(admin_only(&Method::GET, None), Err(Denied::Unauthenticated));
        assert_eq!(admin_only(&Method::GET, Some(&user)), Err(Denied::Forbidden));
        assert_eq!(admin_only(&Method::DELETE, Some(&moderator)), Err(Denied::Forbidden));
        assert_eq!(admin_only(&Method::GET, Some(&superuser)), Ok(()));
    }
}
