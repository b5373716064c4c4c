//! Watch two records with one listener and "save" whichever one changed.
//!
//! Run with: `cargo run --example record_saver`

use std::rc::Rc;

use fieldrelay::{ChangeListener, Container, ContainerChanged, ObservableCell, Record, Relay};

struct RecordSaver;

impl ChangeListener for RecordSaver {
    fn container_changed(&self, event: &ContainerChanged) {
        let ids = event.container().field_ids();
        let values: Vec<String> = ids
            .iter()
            .filter_map(|id| event.container().field(id))
            .filter_map(|field| field.current_value().downcast_ref::<String>().cloned())
            .collect();
        println!("save record {:p}: {}", Rc::as_ptr(event.source()), values.join(" "));
    }
}

fn person(first: &str, last: &str) -> (Rc<dyn Container>, ObservableCell<String>, ObservableCell<String>) {
    let first = ObservableCell::new(first.to_string());
    let last = ObservableCell::new(last.to_string());
    let record = Record::new();
    record.insert("first_name", Rc::new(first.clone()));
    record.insert("last_name", Rc::new(last.clone()));
    (Rc::new(record), first, last)
}

fn main() {
    let (alpha, alpha_first, alpha_last) = person("", "");
    let (beta, beta_first, beta_last) = person("", "");

    let relay = Relay::new();
    let saver: Rc<dyn ChangeListener> = Rc::new(RecordSaver);
    relay.add_listener(&saver);
    relay.watch(&alpha);
    relay.watch(&beta);

    // Each assignment triggers one save of the owning record.
    alpha_first.set(String::from("Charles"));
    alpha_last.set(String::from("Anthony"));

    beta_first.set(String::from("David"));
    beta_last.set(String::from("Cameron"));
}
