//! Property tests: growth law, inverse operations, truncation, and a
//! model check of arbitrary operation sequences against `Vec<u32>`.

use fatarray::{FatArray, GROWTH_FACTOR};
use fatarray_test_utils::{decode_u32s, pop_u32, push_u32, read_u32s, u32_array, u32_bytes, WORD};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Push(u32),
    Pop,
    Insert(usize, u32),
    Remove(usize),
    Resize(usize),
    BulkCopy(Vec<u32>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        2 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => (1usize..40).prop_map(Op::Resize),
        1 => proptest::collection::vec(any::<u32>(), 0..20).prop_map(Op::BulkCopy),
    ]
}

proptest! {
    #[test]
    fn create_yields_empty_array_with_requested_capacity(
        element_size in 1usize..64,
        capacity in 1usize..256,
    ) {
        let arr = FatArray::with_capacity(element_size, capacity).unwrap();
        prop_assert_eq!(arr.len(), 0);
        prop_assert_eq!(arr.capacity(), capacity);
        prop_assert_eq!(arr.element_size(), element_size);
    }

    #[test]
    fn pushes_read_back_in_order(values in proptest::collection::vec(any::<u32>(), 0..200)) {
        let mut arr = FatArray::new(WORD).unwrap();
        for &v in &values {
            push_u32(&mut arr, v);
        }
        prop_assert_eq!(arr.len(), values.len());
        for (i, &v) in values.iter().enumerate() {
            let expected = v.to_ne_bytes();
            prop_assert_eq!(arr.get(i), Some(&expected[..]));
        }
    }

    #[test]
    fn full_array_doubles_on_next_push(
        capacity in 1usize..64,
        seed in any::<u32>(),
    ) {
        let mut arr = FatArray::with_capacity(WORD, capacity).unwrap();
        let values: Vec<u32> = (0..capacity as u32).map(|i| i.wrapping_mul(seed)).collect();
        for &v in &values {
            push_u32(&mut arr, v);
        }
        prop_assert_eq!(arr.capacity(), capacity);

        push_u32(&mut arr, seed);
        prop_assert_eq!(arr.capacity(), capacity * GROWTH_FACTOR);
        let stored = read_u32s(&arr);
        prop_assert_eq!(&stored[..capacity], &values[..]);
    }

    #[test]
    fn insert_then_remove_restores_sequence(
        values in proptest::collection::vec(any::<u32>(), 0..50),
        index_seed in any::<usize>(),
        value in any::<u32>(),
    ) {
        let mut arr = u32_array(&values, values.len());
        let k = index_seed % (values.len() + 1);
        let encoded = value.to_ne_bytes();
        arr.insert(k, &encoded).unwrap();
        prop_assert_eq!(arr.get(k), Some(&encoded[..]));
        arr.remove(k).unwrap();
        prop_assert_eq!(read_u32s(&arr), values);
    }

    #[test]
    fn push_then_pop_is_identity(
        values in proptest::collection::vec(any::<u32>(), 0..50),
        value in any::<u32>(),
    ) {
        let mut arr = u32_array(&values, 1);
        let before = arr.len();
        push_u32(&mut arr, value);
        prop_assert_eq!(pop_u32(&mut arr), value);
        prop_assert_eq!(arr.len(), before);
        prop_assert_eq!(read_u32s(&arr), values);
    }

    #[test]
    fn shrinking_resize_truncates_and_preserves_prefix(
        values in proptest::collection::vec(any::<u32>(), 2..60),
        cut_seed in any::<usize>(),
    ) {
        let mut arr = u32_array(&values, values.len());
        let new_capacity = 1 + cut_seed % (values.len() - 1);
        arr.resize(new_capacity).unwrap();
        prop_assert_eq!(arr.capacity(), new_capacity);
        prop_assert_eq!(arr.len(), new_capacity);
        prop_assert_eq!(read_u32s(&arr), &values[..new_capacity]);
    }

    #[test]
    fn bulk_copy_floors_length(
        element_size in 1usize..16,
        bytes in proptest::collection::vec(any::<u8>(), 0..300),
    ) {
        let mut arr = FatArray::new(element_size).unwrap();
        arr.bulk_copy(&bytes).unwrap();
        prop_assert_eq!(arr.len(), bytes.len() / element_size);
        prop_assert!(arr.capacity() * element_size >= bytes.len());
        let live = arr.len() * element_size;
        prop_assert_eq!(arr.as_bytes(), &bytes[..live]);
        let remainder = bytes.len() - live;
        prop_assert_eq!(&arr.spare_bytes_mut()[..remainder], &bytes[live..]);
    }

    #[test]
    fn matches_vec_model(ops in proptest::collection::vec(op_strategy(), 0..120)) {
        let mut arr = FatArray::new(WORD).unwrap();
        let mut model: Vec<u32> = Vec::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    push_u32(&mut arr, v);
                    model.push(v);
                }
                Op::Pop => {
                    let mut out = [0u8; WORD];
                    let result = arr.pop(&mut out);
                    match model.pop() {
                        Some(expected) => {
                            prop_assert!(result.is_ok());
                            prop_assert_eq!(u32::from_ne_bytes(out), expected);
                        }
                        None => prop_assert!(result.is_err()),
                    }
                }
                Op::Insert(seed, v) => {
                    let index = seed % (model.len() + 2);
                    let result = arr.insert(index, &v.to_ne_bytes());
                    if index <= model.len() {
                        prop_assert!(result.is_ok());
                        model.insert(index, v);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Remove(seed) => {
                    let index = seed % (model.len() + 1);
                    let result = arr.remove(index);
                    if index < model.len() {
                        prop_assert!(result.is_ok());
                        model.remove(index);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Resize(capacity) => {
                    arr.resize(capacity).unwrap();
                    model.truncate(capacity);
                    prop_assert_eq!(arr.capacity(), capacity);
                }
                Op::BulkCopy(values) => {
                    arr.bulk_copy(&u32_bytes(&values)).unwrap();
                    model = values;
                }
            }
            prop_assert!(arr.len() <= arr.capacity());
            prop_assert!(arr.capacity() >= 1);
            prop_assert_eq!(decode_u32s(arr.as_bytes()), model.clone());
        }
    }
}
