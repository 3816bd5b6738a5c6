/// Ownership-based authorization
///
/// Every category and task belongs to exactly one user, and only that
/// user may read or mutate it. The check here is a pure function over
/// data (caller identity plus the looked-up resource), not an ambient
/// request property, so it is unit-testable without a simulated request.
///
/// Policy, applied uniformly across all endpoints:
///
/// - resource does not exist at all -> `NotFound` (404)
/// - resource exists but belongs to someone else -> `NotOwner` (403)
use uuid::Uuid;

/// Error type for ownership checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// No such resource
    #[error("Resource not found")]
    NotFound,

    /// Resource exists but the caller does not own it
    #[error("You do not have permission to access this resource")]
    NotOwner,
}

/// A resource with a recorded owner
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Authorizes `user_id` against an optional looked-up resource
///
/// Returns the resource on success so call sites read as
/// `let task = authorize_owned(auth.user_id, Task::find_by_id(..).await?)?;`.
pub fn authorize_owned<R: Owned>(user_id: Uuid, resource: Option<R>) -> Result<R, AuthzError> {
    let resource = resource.ok_or(AuthzError::NotFound)?;

    if resource.owner_id() != user_id {
        return Err(AuthzError::NotOwner);
    }

    Ok(resource)
}

/// Authorizes against a bare owner field when the resource itself is not
/// needed afterwards
pub fn authorize_ownership(user_id: Uuid, resource_owner: Option<Uuid>) -> Result<(), AuthzError> {
    struct Bare(Uuid);
    impl Owned for Bare {
        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    authorize_owned(user_id, resource_owner.map(Bare)).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Resource {
        owner: Uuid,
    }

    impl Owned for Resource {
        fn owner_id(&self) -> Uuid {
            self.owner
        }
    }

    #[test]
    fn test_owner_is_allowed() {
        let user = Uuid::new_v4();
        let resource = Resource { owner: user };
        assert!(authorize_owned(user, Some(resource)).is_ok());
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        let result = authorize_owned::<Resource>(Uuid::new_v4(), None);
        assert_eq!(result.err(), Some(AuthzError::NotFound));
    }

    #[test]
    fn test_foreign_resource_is_forbidden() {
        let resource = Resource {
            owner: Uuid::new_v4(),
        };
        let result = authorize_owned(Uuid::new_v4(), Some(resource));
        assert!(matches!(result, Err(AuthzError::NotOwner)));
    }

    #[test]
    fn test_bare_ownership_check() {
        let user = Uuid::new_v4();
        assert!(authorize_ownership(user, Some(user)).is_ok());
        assert_eq!(
            authorize_ownership(user, None),
            Err(AuthzError::NotFound)
        );
        assert_eq!(
            authorize_ownership(user, Some(Uuid::new_v4())),
            Err(AuthzError::NotOwner)
        );
    }
}
