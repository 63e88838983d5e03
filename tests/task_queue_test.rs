//! Randomized tests for TaskQueue positioning against a `Vec` model.

use rand::Rng;
use workpool::{Task, TaskQueue};

/// Apply the documented insert rule to the model.
fn model_insert(model: &mut Vec<u64>, id: u64, position: isize) {
    match usize::try_from(position) {
        Err(_) => model.insert(0, id),
        Ok(index) if index >= model.len() => model.push(id),
        Ok(index) => model.insert(index, id),
    }
}

fn model_remove(model: &mut Vec<u64>, index: isize) -> bool {
    match usize::try_from(index) {
        Ok(i) if i < model.len() => {
            model.remove(i);
            true
        }
        _ => false,
    }
}

fn ids(queue: &TaskQueue) -> Vec<u64> {
    queue.snapshot().iter().map(Task::id).collect()
}

#[test]
fn test_random_operations_match_model() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        let queue = TaskQueue::new();
        let mut model = Vec::new();
        let mut next_id = 0u64;

        for _ in 0..200 {
            let len = i64::try_from(model.len()).unwrap();
            match rng.random_range(0..4) {
                0 => {
                    queue.push_back(Task::new(next_id, || {}));
                    model.push(next_id);
                    next_id += 1;
                }
                1 | 2 => {
                    let position = isize::try_from(rng.random_range(-3..=len + 3)).unwrap();
                    queue.insert_at(Task::new(next_id, || {}), position);
                    model_insert(&mut model, next_id, position);
                    next_id += 1;
                }
                _ => {
                    let index = isize::try_from(rng.random_range(-2..=len + 1)).unwrap();
                    assert_eq!(queue.remove(index), model_remove(&mut model, index));
                }
            }
            assert_eq!(queue.len(), model.len());
        }

        assert_eq!(ids(&queue), model);
    }
}

#[test]
fn test_extreme_positions_clamp() {
    let queue = TaskQueue::new();
    queue.insert_at(Task::new(1, || {}), isize::MAX);
    queue.insert_at(Task::new(2, || {}), isize::MIN);
    queue.insert_at(Task::new(3, || {}), 1);
    assert_eq!(ids(&queue), vec![2, 3, 1]);

    assert!(!queue.remove(isize::MAX));
    assert!(!queue.remove(isize::MIN));
    assert_eq!(ids(&queue), vec![2, 3, 1]);
}

#[test]
fn test_empty_queue_reports() {
    let queue = TaskQueue::new();
    assert!(queue.is_empty());
    assert!(queue.snapshot().is_empty());
    assert!(!queue.remove(0));
}
