use crate::checksum::Checksum;
use std::{collections::BTreeMap, path::PathBuf};

/// Paths sharing a checksum, in the order they were hashed. Keys iterate in ascending checksum
/// order, which keeps rendered output stable between runs.
pub type GroupingTable = BTreeMap<Checksum, Vec<PathBuf>>;

/// Partition `pairs` so that two paths land in the same group if and only if their checksums are
/// equal. Paths keep the relative order in which `pairs` yields them.
pub fn group_by_checksum<I>(pairs: I) -> GroupingTable
where
    I: IntoIterator<Item = (Checksum, PathBuf)>,
{
    pairs
        .into_iter()
        .fold(GroupingTable::new(), |mut acc, (checksum, path)| {
            match acc.get_mut(&checksum) {
                Some(paths_with_same_checksum) => paths_with_same_checksum.push(path),
                None => {
                    acc.insert(checksum, vec![path]);
                }
            };
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(hex: &str) -> Checksum {
        Checksum(hex.to_string())
    }

    #[test]
    fn groups_keep_hashing_order() {
        let table = group_by_checksum(vec![
            (sum("bb"), PathBuf::from("/d/z")),
            (sum("aa"), PathBuf::from("/d/a")),
            (sum("bb"), PathBuf::from("/d/b")),
            (sum("bb"), PathBuf::from("/d/c")),
        ]);

        assert_eq!(2, table.len());
        assert_eq!(vec![PathBuf::from("/d/a")], table[&sum("aa")]);
        assert_eq!(
            vec![
                PathBuf::from("/d/z"),
                PathBuf::from("/d/b"),
                PathBuf::from("/d/c")
            ],
            table[&sum("bb")]
        );
        let keys: Vec<&str> = table.keys().map(Checksum::as_str).collect();
        assert_eq!(vec!["aa", "bb"], keys);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(group_by_checksum(Vec::new()).is_empty());
    }

    #[test]
    fn repeated_path_is_not_deduplicated() {
        let table = group_by_checksum(vec![
            (sum("aa"), PathBuf::from("/d/a")),
            (sum("aa"), PathBuf::from("/d/a")),
        ]);
        assert_eq!(2, table[&sum("aa")].len());
    }
}
