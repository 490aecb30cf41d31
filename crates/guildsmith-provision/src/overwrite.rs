//! Permission overwrite calculator
//!
//! Default-deny plus allow-list: the workspace's default principal is denied
//! access and every granted role is explicitly allowed in.

use crate::resolver::RoleHandle;
use guildsmith_core::{ChannelKind, Permission, PermissionOverwrite, Principal};
use indexmap::IndexMap;

/// Permissions denied to the default principal for a channel kind
#[must_use]
pub fn default_denied(kind: ChannelKind) -> &'static [Permission] {
    match kind {
        ChannelKind::Category | ChannelKind::Text => &[Permission::ViewChannel],
        ChannelKind::Voice => &[Permission::Connect],
    }
}

/// Permissions allowed to a granted role for a channel kind
#[must_use]
pub fn grantee_allowed(kind: ChannelKind) -> &'static [Permission] {
    match kind {
        ChannelKind::Category | ChannelKind::Text => {
            &[Permission::ViewChannel, Permission::SendMessages]
        }
        ChannelKind::Voice => &[Permission::Connect, Permission::Speak],
    }
}

/// Compute the overwrite set for a resource
///
/// Exactly one entry for the default principal, then one per distinct
/// grantee. Grantees that share a role collapse into a single entry.
#[must_use]
pub fn compute_overwrites<'a, I>(kind: ChannelKind, grantees: I) -> Vec<PermissionOverwrite>
where
    I: IntoIterator<Item = &'a RoleHandle>,
{
    let mut entries: IndexMap<Principal, PermissionOverwrite> = IndexMap::new();
    entries.insert(
        Principal::Everyone,
        PermissionOverwrite::deny(Principal::Everyone, default_denied(kind)),
    );

    let allowed = grantee_allowed(kind);
    for handle in grantees {
        let principal = Principal::Role(handle.id);
        entries
            .entry(principal)
            .or_insert_with(|| PermissionOverwrite::allow(principal, allowed));
    }

    entries.into_values().collect()
}

/// Overwrites for a category: hidden from the default principal only
#[inline]
#[must_use]
pub fn category_overwrites() -> Vec<PermissionOverwrite> {
    compute_overwrites(ChannelKind::Category, std::iter::empty())
}

/// Overwrites for a channel open to the default principal
#[inline]
#[must_use]
pub fn public_overwrites() -> Vec<PermissionOverwrite> {
    vec![PermissionOverwrite::allow(
        Principal::Everyone,
        &[Permission::ViewChannel, Permission::SendMessages],
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildsmith_core::RoleId;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn handle(id: u64) -> RoleHandle {
        RoleHandle {
            id: RoleId(id),
            name: format!("role-{id}"),
        }
    }

    #[test]
    fn text_channel_overwrites() {
        let roles = vec![handle(1), handle(2)];
        let overwrites = compute_overwrites(ChannelKind::Text, &roles);

        assert_eq!(overwrites.len(), 3);
        assert_eq!(overwrites[0].principal, Principal::Everyone);
        assert!(overwrites[0].deny.contains(&Permission::ViewChannel));
        assert!(overwrites[0].allow.is_empty());

        for ow in &overwrites[1..] {
            assert!(ow.allow.contains(&Permission::ViewChannel));
            assert!(ow.allow.contains(&Permission::SendMessages));
            assert!(ow.deny.is_empty());
        }
    }

    #[test]
    fn voice_channel_overwrites() {
        let roles = vec![handle(1)];
        let overwrites = compute_overwrites(ChannelKind::Voice, &roles);

        assert_eq!(overwrites.len(), 2);
        assert!(overwrites[0].deny.contains(&Permission::Connect));
        assert!(!overwrites[0].deny.contains(&Permission::ViewChannel));
        assert_eq!(
            overwrites[1].allow.iter().copied().collect::<Vec<_>>(),
            vec![Permission::Connect, Permission::Speak]
        );
    }

    #[test]
    fn duplicate_grantees_collapse() {
        let roles = vec![handle(1), handle(1), handle(2)];
        let overwrites = compute_overwrites(ChannelKind::Text, &roles);
        assert_eq!(overwrites.len(), 3);
    }

    #[test]
    fn category_hides_from_everyone_only() {
        let overwrites = category_overwrites();
        assert_eq!(overwrites.len(), 1);
        assert_eq!(overwrites[0].principal, Principal::Everyone);
        assert!(overwrites[0].deny.contains(&Permission::ViewChannel));
    }

    #[test]
    fn public_channel_is_open() {
        let overwrites = public_overwrites();
        assert_eq!(overwrites.len(), 1);
        assert!(overwrites[0].allow.contains(&Permission::ViewChannel));
        assert!(overwrites[0].deny.is_empty());
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_principal(
            ids in proptest::collection::vec(1u64..50, 0..40),
            voice in any::<bool>(),
        ) {
            let kind = if voice { ChannelKind::Voice } else { ChannelKind::Text };
            let roles: Vec<RoleHandle> = ids.iter().copied().map(handle).collect();
            let overwrites = compute_overwrites(kind, &roles);

            let distinct: HashSet<u64> = ids.iter().copied().collect();
            prop_assert_eq!(overwrites.len(), distinct.len() + 1);

            let principals: HashSet<Principal> = overwrites.iter().map(|o| o.principal).collect();
            prop_assert_eq!(principals.len(), overwrites.len());
            prop_assert_eq!(
                overwrites.iter().filter(|o| o.principal == Principal::Everyone).count(),
                1
            );
            for id in distinct {
                prop_assert!(principals.contains(&Principal::Role(RoleId(id))));
            }
        }
    }
}
