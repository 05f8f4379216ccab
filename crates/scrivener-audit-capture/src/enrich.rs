//! Relational enrichment: the "effective state" a raw mutation lacks.

use scrivener_audit_host::{EntityKind, EntityRecord, EntityStore, Relation};

/// Resolve the relational summary for a watched entity.
///
/// Lookups observe current committed state at call time, uniformly for
/// every entity type. Returned pairs are display label to comma-joined
/// values, in the order they appear in the rendered record.
pub fn enrich(
    store: &dyn EntityStore,
    kind: EntityKind,
    record: &EntityRecord,
) -> Vec<(String, String)> {
    let titles = |relation| join(store.relation_titles(relation, record.id));

    match kind {
        EntityKind::Group => vec![(
            "Effective permissions".to_string(),
            titles(Relation::GroupPermissionCodes),
        )],
        EntityKind::PermissionRole => vec![
            ("Effective groups".to_string(), titles(Relation::RoleGroups)),
            (
                "Effective permissions".to_string(),
                titles(Relation::RoleCodes),
            ),
        ],
        EntityKind::PermissionRoleCode => vec![(
            "Code".to_string(),
            record.code.clone().unwrap_or_default(),
        )],
        EntityKind::Member => vec![(
            "Effective groups".to_string(),
            titles(Relation::MemberGroups),
        )],
    }
}

/// Render enrichment pairs as they appear inside the message parentheses.
pub(crate) fn render_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join(values: Vec<String>) -> String {
    values.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_audit_host::EntityId;
    use scrivener_test_utils::MemoryStore;

    #[test]
    fn group_resolves_permission_codes() {
        let store = MemoryStore::new();
        store.add_group(5, "My group");
        store.set_relation(
            Relation::GroupPermissionCodes,
            EntityId(5),
            ["ADMIN", "CMS_ACCESS_CMSMain"],
        );

        let record = store.load(EntityKind::Group, EntityId(5)).unwrap();
        let pairs = enrich(&store, EntityKind::Group, &record);
        assert_eq!(
            render_pairs(&pairs),
            "Effective permissions: ADMIN, CMS_ACCESS_CMSMain"
        );
    }

    #[test]
    fn role_resolves_groups_and_codes() {
        let store = MemoryStore::new();
        store.add_role(9, "Editors role");
        store.set_relation(Relation::RoleGroups, EntityId(9), ["Editors", "Authors"]);
        store.set_relation(Relation::RoleCodes, EntityId(9), ["CMS_ACCESS"]);

        let record = store.load(EntityKind::PermissionRole, EntityId(9)).unwrap();
        let pairs = enrich(&store, EntityKind::PermissionRole, &record);
        assert_eq!(
            render_pairs(&pairs),
            "Effective groups: Editors, Authors, Effective permissions: CMS_ACCESS"
        );
    }

    #[test]
    fn role_code_carries_its_single_code() {
        let store = MemoryStore::new();
        store.add_role_code(3, "SITETREE_REORGANISE");

        let record = store
            .load(EntityKind::PermissionRoleCode, EntityId(3))
            .unwrap();
        let pairs = enrich(&store, EntityKind::PermissionRoleCode, &record);
        assert_eq!(render_pairs(&pairs), "Code: SITETREE_REORGANISE");
    }

    #[test]
    fn member_resolves_group_titles() {
        let store = MemoryStore::new();
        store.add_member(2, "joe@example.org", "Joe");
        store.set_relation(Relation::MemberGroups, EntityId(2), ["My group"]);

        let record = store.load(EntityKind::Member, EntityId(2)).unwrap();
        let pairs = enrich(&store, EntityKind::Member, &record);
        assert_eq!(render_pairs(&pairs), "Effective groups: My group");
    }

    #[test]
    fn unrelated_entity_renders_empty_list() {
        let store = MemoryStore::new();
        store.add_group(5, "Lonely group");

        let record = store.load(EntityKind::Group, EntityId(5)).unwrap();
        let pairs = enrich(&store, EntityKind::Group, &record);
        assert_eq!(render_pairs(&pairs), "Effective permissions: ");
    }
}
