//! End-to-end pipelines over the public API.

mod test_data_gen;

use std::collections::HashMap;

use lazyseq::{Error, KeyValue, SeqConfig, Sequence};
use serde::Serialize;
use test_data_gen::{counted, init_tracing, people, Person};

#[test]
fn test_order_by_numbers() {
    let out = Sequence::from_vec(vec![3, 1, 2]).order_by(|x| *x).to_vec().unwrap();
    assert_eq!(out, vec![1, 2, 3]);
}

#[test]
fn test_distinct_keeps_first_occurrence() {
    let out = Sequence::from_vec(vec![1, 2, 2, 3]).distinct().to_vec().unwrap();
    assert_eq!(out, vec![1, 2, 3]);
}

#[test]
fn test_group_by_key_first_seen_order() {
    let groups: Vec<(i32, Vec<i32>)> = Sequence::from_vec(vec![1, 2, 3])
        .group_by(|x| x % 2)
        .to_vec()
        .unwrap()
        .into_iter()
        .map(|g| {
            let (key, elements) = g.into_parts();
            (key, elements.to_vec().unwrap())
        })
        .collect();
    assert_eq!(groups, vec![(1, vec![1, 3]), (0, vec![2])]);
}

#[derive(Clone)]
struct Customer {
    id: u32,
    name: &'static str,
}

#[derive(Clone)]
struct Order {
    id: u32,
    val: i32,
}

#[test]
fn test_join_drops_unmatched_outer_rows() {
    let customers = Sequence::from_vec(vec![
        Customer { id: 1, name: "a" },
        Customer { id: 2, name: "b" },
    ]);
    let orders = Sequence::from_vec(vec![Order { id: 1, val: 10 }]);
    let out = customers
        .join(orders, |c| c.id, |o| o.id, |c, o| (c.name, o.val))
        .to_vec()
        .unwrap();
    assert_eq!(out, vec![("a", 10)]);
}

#[test]
fn test_take_releases_source_once() {
    let (seq, releases) = counted(vec![1, 2, 3, 4, 5]);
    assert_eq!(seq.take(3).to_vec().unwrap(), vec![1, 2, 3]);
    assert_eq!(releases.get(), 1);
}

#[test]
fn test_fresh_traversals_agree() {
    let pipeline = Sequence::range(1, 50)
        .filter(|x| x % 3 != 0)
        .select(|x| x * x)
        .order_by_descending(|x| x % 7)
        .then_by(|x| *x)
        .into_sequence()
        .skip(5)
        .take(20);
    assert_eq!(pipeline.to_vec().unwrap(), pipeline.to_vec().unwrap());
}

#[test]
fn test_multi_key_ordering_is_stable() {
    let by_age: Vec<&str> = Sequence::from_vec(people())
        .order_by(|p| p.age)
        .select(|p| p.name)
        .to_vec()
        .unwrap();
    assert_eq!(by_age, vec!["omar", "ada", "ines", "yuki", "bo", "li"]);

    let by_city_then_age_desc: Vec<&str> = Sequence::from_vec(people())
        .order_by(|p| p.city)
        .then_by_descending(|p| p.age)
        .select(|p| p.name)
        .to_vec()
        .unwrap();
    assert_eq!(
        by_city_then_age_desc,
        vec!["ines", "bo", "ada", "li", "yuki", "omar"]
    );
}

#[test]
fn test_lookup_round_trip_keeps_in_group_order() {
    let source = people();
    let lookup = Sequence::from_vec(source.clone())
        .to_lookup_with(|p| p.city, |p| p.name, |c| c.to_string())
        .unwrap();
    assert_eq!(lookup.len(), 2);
    assert!(lookup.contains(&"oslo"));
    assert!(lookup.get(&"paris").to_vec().unwrap().is_empty());

    let flattened = lookup
        .to_sequence()
        .select_many(|g| g.elements().clone())
        .to_vec()
        .unwrap();
    assert_eq!(flattened, vec!["ines", "ada", "bo", "omar", "yuki", "li"]);
}

#[test]
fn test_group_join_one_row_per_outer() {
    let totals = Sequence::from_vec(vec!["lyon", "oslo", "rome"])
        .group_join(
            people(),
            |city| *city,
            |p: &Person| p.city,
            |city, residents| (city, residents.count().unwrap_or(0)),
        )
        .to_vec()
        .unwrap();
    assert_eq!(totals, vec![("lyon", 3), ("oslo", 3), ("rome", 0)]);
}

#[test]
fn test_partition_by_runs() {
    let runs: Vec<(bool, usize)> = Sequence::from_vec(vec![1, 3, 2, 4, 6, 5])
        .partition_by(|x| x % 2 == 0)
        .select(|g| (*g.key(), g.elements().count().unwrap_or(0)))
        .to_vec()
        .unwrap();
    assert_eq!(runs, vec![(false, 2), (true, 3), (false, 1)]);
}

#[test]
fn test_dictionary_and_map() {
    let dict = Sequence::from_vec(people())
        .to_dictionary(|p| p.age, |p| p.name)
        .unwrap();
    let entries: Vec<(u32, &str)> = dict.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(entries, vec![(31, "bo"), (25, "ada"), (40, "li")]);

    let map: HashMap<u32, &str> = Sequence::from_vec(people())
        .to_map(|p| p.age, |p| p.name)
        .unwrap();
    assert_eq!(map[&31], "bo");
}

#[test]
fn test_set_operations_with_projection() {
    let left = Sequence::from_vec(vec!["Apple", "bean", "apple", "Corn"]);
    let right = vec!["CORN", "date"];
    let lower = |s: &&str| s.to_lowercase();

    assert_eq!(left.distinct_by(lower).to_vec().unwrap(), vec!["Apple", "bean", "Corn"]);
    assert_eq!(
        left.except_by(right.clone(), lower).to_vec().unwrap(),
        vec!["Apple", "bean"]
    );
    assert_eq!(left.intersect_by(right.clone(), lower).to_vec().unwrap(), vec!["Corn"]);
    assert_eq!(
        left.union_by(right, lower).to_vec().unwrap(),
        vec!["Apple", "bean", "Corn", "date"]
    );
}

#[test]
fn test_share_and_memoize_across_consumers() {
    let shared = Sequence::range(1, 6).share();
    let head = shared.take(2).to_vec().unwrap();
    let rest = shared.to_vec().unwrap();
    assert_eq!(head, vec![1, 2]);
    assert_eq!(rest, vec![3, 4, 5, 6]);

    let memo = Sequence::range(1, 6).select(|x| x * 10).memoize();
    assert_eq!(memo.take(2).to_vec().unwrap(), vec![10, 20]);
    assert_eq!(memo.to_vec().unwrap(), vec![10, 20, 30, 40, 50, 60]);
}

#[test]
fn test_cascade_over_a_directory_tree() {
    let tree: HashMap<&str, Vec<&str>> = HashMap::from([
        ("/", vec!["/etc", "/usr"]),
        ("/usr", vec!["/usr/bin", "/usr/lib"]),
        ("/etc", vec!["/etc/ssh"]),
    ]);
    let children = move |dir: &&'static str| tree.get(dir).cloned().unwrap_or_default();

    let depth_first = Sequence::once("/")
        .cascade_depth_first(children.clone())
        .to_vec()
        .unwrap();
    assert_eq!(
        depth_first,
        vec!["/", "/etc", "/etc/ssh", "/usr", "/usr/bin", "/usr/lib"]
    );

    let breadth_first = Sequence::once("/")
        .cascade_breadth_first_with(children, |dir, depth| format!("{depth}:{dir}"))
        .to_vec()
        .unwrap();
    assert_eq!(
        breadth_first,
        vec!["0:/", "1:/etc", "1:/usr", "2:/etc/ssh", "2:/usr/bin", "2:/usr/lib"]
    );
}

#[test]
fn test_generators_and_adapters() {
    assert_eq!(
        Sequence::range_to(10, 1, 3).to_vec().unwrap(),
        vec![10, 7, 4, 1]
    );
    assert_eq!(
        Sequence::to_infinity(0, 5).take(3).to_vec().unwrap(),
        vec![0, 5, 10]
    );
    assert_eq!(
        Sequence::from_chars("héllo").filter(|c| c.is_alphabetic()).count().unwrap(),
        5
    );

    let words: Vec<String> = Sequence::matches("one two  three", r"\w+")
        .unwrap()
        .select(|m| m.text)
        .to_vec()
        .unwrap();
    assert_eq!(words, vec!["one", "two", "three"]);
    assert!(matches!(
        Sequence::matches("x", "("),
        Err(Error::Pattern(_))
    ));

    let entries = Sequence::from_map(vec![("a", 1), ("b", 2)]).to_vec().unwrap();
    assert_eq!(entries[1], KeyValue { key: "b", value: 2 });
}

#[derive(Debug, Clone, Serialize)]
struct Row {
    name: &'static str,
    adult: bool,
}

#[test]
fn test_json_and_text_output() {
    init_tracing();
    let rows = Sequence::from_vec(people())
        .filter(|p| p.city == "oslo")
        .select(|p| Row {
            name: p.name,
            adult: p.age >= 30,
        })
        .trace_with(&SeqConfig {
            trace_label: "oslo".into(),
            ..Default::default()
        });
    let json = rows.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[1]["name"], "yuki");
    assert_eq!(parsed[2]["adult"], true);

    let text = Sequence::range(1, 3)
        .alternate(0)
        .to_joined_string("")
        .unwrap();
    assert_eq!(text, "10203");
}
