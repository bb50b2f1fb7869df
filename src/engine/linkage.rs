use std::collections::HashMap;

use ulid::Ulid;

use crate::model::Property;

/// Precomputed partition of properties into linkage groups.
///
/// Property records may carry one-sided or partial `linked` lists; the
/// partition closes the relation symmetrically and transitively, so every
/// property lands in exactly one group and group lookup is O(1) per request
/// instead of a per-request graph walk.
#[derive(Debug, Default)]
pub struct LinkageGroups {
    group_of: HashMap<Ulid, usize>,
    members: Vec<Vec<Ulid>>,
}

impl LinkageGroups {
    pub fn build(properties: &[Property]) -> Self {
        let index: HashMap<Ulid, usize> = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();

        let mut parent: Vec<usize> = (0..properties.len()).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                // Path halving.
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for (i, property) in properties.iter().enumerate() {
            for linked_id in &property.linked {
                // Links to unknown properties are ignored rather than
                // rejected; the catalog is the authority on what exists.
                let Some(&j) = index.get(linked_id) else {
                    continue;
                };
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }

        let mut group_of = HashMap::with_capacity(properties.len());
        let mut members: Vec<Vec<Ulid>> = Vec::new();
        let mut root_to_group: HashMap<usize, usize> = HashMap::new();

        for (i, property) in properties.iter().enumerate() {
            let root = find(&mut parent, i);
            let group = *root_to_group.entry(root).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            group_of.insert(property.id, group);
            members[group].push(property.id);
        }

        Self { group_of, members }
    }

    pub fn group_of(&self, property_id: &Ulid) -> Option<usize> {
        self.group_of.get(property_id).copied()
    }

    pub fn members(&self, group: usize) -> &[Ulid] {
        &self.members[group]
    }

    pub fn group_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id: Ulid, linked: Vec<Ulid>) -> Property {
        Property {
            id,
            name: None,
            nightly_rate: 200,
            max_guests: 4,
            linked,
        }
    }

    #[test]
    fn unlinked_properties_are_singletons() {
        let a = Ulid::new();
        let b = Ulid::new();
        let groups = LinkageGroups::build(&[property(a, vec![]), property(b, vec![])]);
        assert_eq!(groups.group_count(), 2);
        assert_ne!(groups.group_of(&a), groups.group_of(&b));
    }

    #[test]
    fn one_sided_link_is_closed_symmetrically() {
        let a = Ulid::new();
        let b = Ulid::new();
        // Only a records the link; b's record is silent.
        let groups = LinkageGroups::build(&[property(a, vec![b]), property(b, vec![])]);
        assert_eq!(groups.group_count(), 1);
        assert_eq!(groups.group_of(&a), groups.group_of(&b));
    }

    #[test]
    fn chains_close_transitively() {
        let a = Ulid::new();
        let b = Ulid::new();
        let c = Ulid::new();
        let groups = LinkageGroups::build(&[
            property(a, vec![b]),
            property(b, vec![c]),
            property(c, vec![]),
        ]);
        assert_eq!(groups.group_count(), 1);
        let g = groups.group_of(&a).unwrap();
        assert_eq!(groups.members(g).len(), 3);
    }

    #[test]
    fn venue_linked_to_all_units_forms_one_group() {
        let venue = Ulid::new();
        let units: Vec<Ulid> = (0..4).map(|_| Ulid::new()).collect();
        let mut props = vec![property(venue, units.clone())];
        props.extend(units.iter().map(|&u| property(u, vec![])));
        let outsider = Ulid::new();
        props.push(property(outsider, vec![]));

        let groups = LinkageGroups::build(&props);
        assert_eq!(groups.group_count(), 2);
        let g = groups.group_of(&venue).unwrap();
        assert_eq!(groups.members(g).len(), 5);
        assert_ne!(groups.group_of(&outsider), Some(g));
    }

    #[test]
    fn dangling_links_are_ignored() {
        let a = Ulid::new();
        let groups = LinkageGroups::build(&[property(a, vec![Ulid::new()])]);
        assert_eq!(groups.group_count(), 1);
        assert_eq!(groups.members(groups.group_of(&a).unwrap()), &[a]);
    }
}
