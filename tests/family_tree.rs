//! End-to-end tests over a small three-generation family file.

use std::path::Path;

use gedcom::{Config, ElementId, FamilyRole, ParentFilter, Parser, Tree, parse_file};

const FIXTURE: &str = "tests/fixtures/hardy.ged";

fn load() -> Tree {
    parse_file(Path::new(FIXTURE)).unwrap()
}

fn id(tree: &Tree, pointer: &str) -> ElementId {
    tree.resolve(pointer)
        .unwrap_or_else(|| panic!("{pointer} is not declared"))
}

fn pointers(tree: &Tree, ids: &[ElementId]) -> Vec<String> {
    ids.iter()
        .map(|&id| tree[id].pointer().unwrap().to_string())
        .collect()
}

#[test]
fn parses_every_line() {
    let tree = load();

    assert!(tree.has_byte_order_mark());
    assert_eq!(tree.element_list().len(), 91);
    assert_eq!(tree.records().len(), 12);
    assert_eq!(tree.individuals().count(), 7);
    assert_eq!(tree.families().count(), 2);
    assert_eq!(tree.element_map().len(), 10);
}

#[test]
fn writes_back_unchanged() {
    let original = std::fs::read(FIXTURE).unwrap();
    let tree = load();

    let mut written = Vec::new();
    tree.write_to(&mut written).unwrap();

    assert_eq!(written, original);
}

#[test]
fn saved_copy_parses_identically() {
    let tmp = tempfile::tempdir().unwrap();
    let copy = tmp.path().join("copy.ged");

    let tree = load();
    tree.save(&copy).unwrap();
    let reread = parse_file(&copy).unwrap();

    assert_eq!(
        reread.to_gedcom_string(reread.root(), true),
        tree.to_gedcom_string(tree.root(), true)
    );
}

#[test]
fn continuation_lines_are_joined() {
    let tree = load();
    let novelist = id(&tree, "@I3@");
    let note = tree
        .children(novelist)
        .iter()
        .copied()
        .find(|&child| tree[child].tag() == "NOTE")
        .unwrap();

    assert_eq!(
        tree.multi_line_value(note),
        "Wrote of Wessex.\r\nTrained as an architect before turning to fiction."
    );
}

#[test]
fn ancestors_by_filter() {
    let tree = load();
    let walter = tree.individual(id(&tree, "@I7@")).unwrap();
    let thomas = tree.individual(id(&tree, "@I3@")).unwrap();

    assert_eq!(
        pointers(&tree, &walter.ancestors(ParentFilter::All)),
        ["@I3@", "@I5@", "@I1@", "@I2@"]
    );
    assert!(walter.ancestors(ParentFilter::Natural).is_empty());
    assert_eq!(
        pointers(&tree, &thomas.ancestors(ParentFilter::Natural)),
        ["@I1@", "@I2@"]
    );
}

#[test]
fn natural_paths() {
    let tree = load();
    let mary = tree.individual(id(&tree, "@I4@")).unwrap();
    let walter = tree.individual(id(&tree, "@I7@")).unwrap();
    let father = id(&tree, "@I1@");

    let path = mary.path_to_ancestor(father).unwrap().unwrap();
    assert_eq!(pointers(&tree, &path.into_iter().collect::<Vec<_>>()), ["@I4@", "@I1@"]);

    assert!(walter.path_to_ancestor(father).unwrap().is_none());
}

#[test]
fn descendants_skip_dangling_children() {
    let tree = load();
    let founder = tree.individual(id(&tree, "@I1@")).unwrap();

    assert_eq!(
        pointers(&tree, &founder.descendants()),
        ["@I3@", "@I4@", "@I6@", "@I7@"]
    );
    assert_eq!(
        tree.dangling_references()
            .iter()
            .map(|reference| reference.target.as_str())
            .collect::<Vec<_>>(),
        ["@I8@"]
    );
    assert!(tree.pedigree_cycles().is_empty());
}

#[test]
fn marriages_and_families() {
    let tree = load();
    let thomas = tree.individual(id(&tree, "@I3@")).unwrap();

    assert_eq!(thomas.families(FamilyRole::Spouse).len(), 1);
    assert_eq!(thomas.families(FamilyRole::Child).len(), 1);

    let marriages = thomas.marriages();
    assert_eq!(marriages.len(), 1);
    assert_eq!(marriages[0].place, Some("Paddington"));
    assert_eq!(thomas.marriage_years(), [1874]);
}

#[test]
fn criteria_select_individuals() {
    let tree = load();

    let found: Vec<_> = tree
        .individuals()
        .filter(|individual| individual.criteria_match("surname=hardy:birth_range=1800-1845"))
        .map(|individual| individual.id())
        .collect();
    assert_eq!(pointers(&tree, &found), ["@I1@", "@I3@", "@I4@"]);

    let jemima = tree.individual(id(&tree, "@I2@")).unwrap();
    assert!(jemima.criteria_match("name=jem:surname=HAND:birth=1813"));
    assert!(!jemima.criteria_match("birth=1813:death"));
}

#[test]
fn lenient_parse_recovers_damaged_copy() {
    let text = std::fs::read_to_string(FIXTURE).unwrap();
    let damaged = text.replace("2 CONT Trained", "Trained").replace("2 DATE 1851", "4 DATE 1851");

    let strict = Parser::default().parse_str(&damaged);
    assert!(strict.is_err());

    let tree = Parser::new(Config::lenient()).parse_str(&damaged).unwrap();
    let henry = tree.individual(id(&tree, "@I6@")).unwrap();
    assert_eq!(henry.birth_year(), Some(1851));

    let thomas = id(&tree, "@I3@");
    let note = tree
        .children(thomas)
        .iter()
        .copied()
        .find(|&child| tree[child].tag() == "NOTE")
        .unwrap();
    assert_eq!(
        tree.multi_line_value(note),
        "Wrote of Wessex.Trained as an architect before turning to fiction."
    );
}
