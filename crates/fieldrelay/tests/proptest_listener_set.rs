//! Property-based tests for listener registration algebra.
//!
//! For any sequence of add/remove operations, the active listener set must
//! equal the distinct listeners added minus those subsequently removed, and
//! one delivery pass must reach exactly the members of that set, once each.

use std::cell::Cell;
use std::rc::Rc;

use fieldrelay::{ChangeListener, Container, ContainerChanged, ObservableCell, Record, Relay};
use proptest::prelude::*;

const POOL: usize = 5;

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(usize),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POOL).prop_map(Op::Add),
        (0..POOL).prop_map(Op::Remove),
    ]
}

#[derive(Default)]
struct Counter {
    hits: Cell<u32>,
}

impl ChangeListener for Counter {
    fn container_changed(&self, _: &ContainerChanged) {
        self.hits.set(self.hits.get() + 1);
    }
}

proptest! {
    #[test]
    fn listener_set_matches_model(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let relay = Relay::new();
        let pool: Vec<Rc<Counter>> = (0..POOL).map(|_| Rc::new(Counter::default())).collect();
        let erased: Vec<Rc<dyn ChangeListener>> = pool
            .iter()
            .map(|c| Rc::clone(c) as Rc<dyn ChangeListener>)
            .collect();

        // Model: ordered set of pool indices.
        let mut model: Vec<usize> = Vec::new();
        for op in ops {
            match op {
                Op::Add(i) => {
                    relay.add_listener(&erased[i]);
                    if !model.contains(&i) {
                        model.push(i);
                    }
                }
                Op::Remove(i) => {
                    relay.remove_listener(&erased[i]);
                    model.retain(|m| *m != i);
                }
            }
        }

        prop_assert_eq!(relay.listener_count(), model.len());

        // One watched-field change delivers exactly once to each member of
        // the model set and never to a removed listener.
        let cell = ObservableCell::new(0u32);
        let record = Record::new();
        record.insert("n", Rc::new(cell.clone()));
        let container: Rc<dyn Container> = Rc::new(record);
        relay.watch(&container);
        cell.set(1);

        for (i, counter) in pool.iter().enumerate() {
            let expected = u32::from(model.contains(&i));
            prop_assert_eq!(counter.hits.get(), expected);
        }
    }

    #[test]
    fn readd_after_remove_reactivates(i in 0..POOL) {
        let relay = Relay::new();
        let counter = Rc::new(Counter::default());
        let erased = Rc::clone(&counter) as Rc<dyn ChangeListener>;

        for _ in 0..=i {
            relay.add_listener(&erased);
            relay.remove_listener(&erased);
        }
        relay.add_listener(&erased);
        prop_assert_eq!(relay.listener_count(), 1);

        let cell = ObservableCell::new(0u32);
        let record = Record::new();
        record.insert("n", Rc::new(cell.clone()));
        let container: Rc<dyn Container> = Rc::new(record);
        relay.watch(&container);
        cell.set(1);
        prop_assert_eq!(counter.hits.get(), 1);
    }
}
