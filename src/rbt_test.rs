use arbitrary::{self, unstructured::Unstructured, Arbitrary};
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use super::*;
use crate::node::Color;

use std::collections::BTreeMap;

fn check_height_bound<V>(index: &RbTree<V>) {
    let limit = 2.0 * ((index.len() + 1) as f64).log2();
    let height = index.height();
    assert!(
        (height as f64) <= limit,
        "height {} limit {} len {}",
        height,
        limit,
        index.len()
    );
}

fn root_node<V>(index: &RbTree<V>) -> &Node<V> {
    &index.nodes[index.root.unwrap()]
}

#[test]
fn test_insert_sequence() {
    let mut index: RbTree<()> = RbTree::new();
    for key in ["aaa", "bbb", "ccc", "ddd"].iter() {
        index.insert(*key, ()).unwrap();
    }

    let root = root_node(&index);
    let left = &index.nodes[root.left.unwrap()];
    let right = &index.nodes[root.right.unwrap()];
    let rr = &index.nodes[right.right.unwrap()];

    assert_eq!((root.as_key(), root.color), (&b"bbb"[..], Color::Black));
    assert_eq!((left.as_key(), left.color), (&b"aaa"[..], Color::Black));
    assert_eq!((right.as_key(), right.color), (&b"ccc"[..], Color::Black));
    assert_eq!((rr.as_key(), rr.color), (&b"ddd"[..], Color::Red));
    assert_eq!(root.parent, None);
    assert!(right.left.is_none());

    index.validate().unwrap();
}

#[test]
fn test_insert_inner_grandchild() {
    // "a", "c", "b" forces the inner-grandchild double rotation.
    let mut index: RbTree<u32> = RbTree::new();
    index.insert("a", 1).unwrap();
    index.insert("c", 3).unwrap();
    index.insert("b", 2).unwrap();

    let root = root_node(&index);
    assert_eq!(root.as_key(), b"b");
    assert_eq!(root.color, Color::Black);
    assert_eq!(index.nodes[root.left.unwrap()].as_key(), b"a");
    assert_eq!(index.nodes[root.right.unwrap()].as_key(), b"c");
    assert_eq!(index.nodes[root.left.unwrap()].color, Color::Red);
    assert_eq!(index.nodes[root.right.unwrap()].color, Color::Red);
    assert_eq!(index.height(), 2);

    index.validate().unwrap();
}

#[test]
fn test_insert_ordered() {
    let n = 10_000_u32;

    let mut asc: RbTree<u32> = RbTree::with_capacity(n as usize);
    let mut desc: RbTree<u32> = RbTree::new();
    for i in 0..n {
        asc.insert(i.to_be_bytes().to_vec(), i).unwrap();
        desc.insert((n - i - 1).to_be_bytes().to_vec(), n - i - 1).unwrap();
    }

    for index in [asc, desc].iter() {
        assert_eq!(index.len(), n as usize);
        index.validate().unwrap();
        check_height_bound(index);

        let values: Vec<u32> = index.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, (0..n).collect::<Vec<u32>>());
    }
}

#[test]
fn test_duplicate_key() {
    let mut index: RbTree<&str> = RbTree::new();
    for key in ["x", "c", "a", "y", "b", "z"].iter() {
        index.insert(*key, "value").unwrap();
    }
    let (len, height) = (index.len(), index.height());
    let before: Vec<Vec<u8>> = index.iter().map(|(k, _)| k.to_vec()).collect();

    match index.insert("c", "other") {
        Err(Error::DuplicateKey(_, _)) => (),
        Err(err) => panic!("unexpected {}", err),
        Ok(_) => panic!("duplicate key accepted"),
    }

    let after: Vec<Vec<u8>> = index.iter().map(|(k, _)| k.to_vec()).collect();
    assert_eq!(index.len(), len);
    assert_eq!(index.height(), height);
    assert_eq!(before, after);
    assert_eq!(index.find(b"c"), Some(&"value"));
    assert_eq!(index.nodes.len(), len);
}

#[test]
fn test_update_isolation() {
    let mut index: RbTree<u64> = RbTree::new();
    for i in 0..100_u64 {
        index.insert(format!("key{:03}", i), i).unwrap();
    }

    let shape = |index: &RbTree<u64>| -> Vec<_> {
        let nodes = index.nodes.iter();
        nodes
            .map(|n| (n.key.clone(), n.color, n.parent, n.left, n.right))
            .collect()
    };
    let (before, root) = (shape(&index), index.root);

    index.update(b"key042", 4200).unwrap();

    assert_eq!(shape(&index), before);
    assert_eq!(index.root, root);
    assert_eq!(index.find(b"key042"), Some(&4200));
    assert_eq!(index.find(b"key041"), Some(&41));
    assert_eq!(index.find(b"key043"), Some(&43));

    match index.update(b"key100", 0) {
        Err(Error::KeyNotFound(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(shape(&index), before);
}

#[test]
fn test_empty() {
    let mut index: RbTree<u64> = RbTree::default();
    assert_eq!(index.find(b"any"), None);
    assert_eq!(index.height(), 0);
    assert_eq!(index.iter().count(), 0);
    assert!(index.update(b"any", 10).is_err());
    assert!(index.is_empty());
    index.validate().unwrap();
}

#[test]
fn test_delete() {
    let mut index: RbTree<u64> = RbTree::new();
    index.insert("key", 10).unwrap();

    match index.delete(b"key") {
        Err(Error::NotImplemented(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
    assert_eq!(index.len(), 1);
    assert_eq!(index.find(b"key"), Some(&10));
}

#[test]
fn test_validate_detects_corruption() {
    let mut index: RbTree<u64> = RbTree::new();
    for i in 0..16_u64 {
        index.insert(i.to_be_bytes().to_vec(), i).unwrap();
    }
    index.validate().unwrap();

    let root = index.root.unwrap();
    index.nodes[root].set_red();
    match index.validate() {
        Err(Error::Fatal(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_rbtree() {
    let seed: u64 = random();
    // let seed: u64 = 4646217778371046932;
    println!("test_rbtree {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index: RbTree<u64> = RbTree::new();
    let mut btmap: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

    let mut counts = [0_usize; 9];

    for _i in 0..50_000 {
        let bytes = rng.gen::<[u8; 32]>();
        let mut uns = Unstructured::new(&bytes);

        let op: Op<u16, u64> = uns.arbitrary().unwrap();
        // println!("op -- {:?}", op);
        match op {
            Op::Len => {
                counts[0] += 1;
                assert_eq!(index.len(), btmap.len());
            }
            Op::IsEmpty => {
                counts[1] += 1;
                assert_eq!(index.is_empty(), btmap.is_empty());
            }
            Op::Insert(key, val) => {
                counts[2] += 1;
                let key = key.to_be_bytes().to_vec();
                match (index.insert(key.clone(), val), btmap.contains_key(&key)) {
                    (Ok(_), false) => {
                        btmap.insert(key, val);
                    }
                    (Err(Error::DuplicateKey(_, _)), true) => (),
                    (res, _) => panic!("insert key {:?} {:?}", key, res),
                }
            }
            Op::Update(key, val) => {
                counts[3] += 1;
                let key = key.to_be_bytes().to_vec();
                match (index.update(&key, val), btmap.get_mut(&key)) {
                    (Ok(_), Some(r)) => *r = val,
                    (Err(Error::KeyNotFound(_, _)), None) => (),
                    (res, _) => panic!("update key {:?} {:?}", key, res),
                }
            }
            Op::Delete(key) => {
                counts[4] += 1;
                let key = key.to_be_bytes();
                assert!(index.delete(&key).is_err());
            }
            Op::Validate => {
                counts[5] += 1;
                index.validate().unwrap();
                check_height_bound(&index);
            }
            Op::Find(key) => {
                counts[6] += 1;
                let key = key.to_be_bytes();
                assert_eq!(index.find(&key), btmap.get(&key[..]), "for key {:?}", key);
            }
            Op::Iter => {
                counts[7] += 1;
                let a: Vec<(Vec<u8>, u64)> = index.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
                let b: Vec<(Vec<u8>, u64)> = btmap.iter().map(|(k, v)| (k.clone(), *v)).collect();
                assert_eq!(a, b);
            }
            Op::Inorder => {
                counts[8] += 1;
                let mut a = vec![];
                index.inorder(|k, v| a.push((k.to_vec(), *v)));
                let b: Vec<(Vec<u8>, u64)> = btmap.iter().map(|(k, v)| (k.clone(), *v)).collect();
                assert_eq!(a, b);
            }
        }
    }

    index.validate().unwrap();
    check_height_bound(&index);

    println!("counts {:?} len:{}/{}", counts, index.len(), btmap.len());
}

#[derive(Debug, Arbitrary)]
enum Op<K, V> {
    Len,
    IsEmpty,
    Insert(K, V),
    Update(K, V),
    Delete(K),
    Validate,
    Find(K),
    Iter,
    Inorder,
}
